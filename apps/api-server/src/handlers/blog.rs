//! Blog handlers.

use actix_web::{HttpResponse, web};
use uuid::Uuid;

use forno_core::domain::{NewPost, Post, PostFilter, PostPatch, PostSort, PostStatus};
use forno_core::error::RepoError;
use forno_shared::dto::{
    BlogDetail, BlogSummary, CreateBlogRequest, LikeData, ListBlogsQuery, Pagination, StatsDto,
    UpdateBlogRequest,
};
use forno_shared::response::{ApiResponse, ListResponse};

use crate::middleware::auth::{AdminIdentity, Identity};
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

fn not_found(err: RepoError) -> AppError {
    match err {
        RepoError::NotFound => AppError::NotFound("Blog not found".to_string()),
        other => other.into(),
    }
}

/// GET /api/blogs - public listing of published posts.
pub async fn list_blogs(
    state: web::Data<AppState>,
    query: web::Query<ListBlogsQuery>,
) -> AppResult<HttpResponse> {
    let query = query.into_inner();
    let page = query.page.max(1);
    let limit = query.limit.clamp(1, 100);

    // Anonymous callers only ever see published posts.
    let filter = PostFilter {
        status: Some(PostStatus::Published),
        category: query
            .category
            .filter(|c| !c.is_empty() && c != "all"),
        search: query.search.filter(|s| !s.trim().is_empty()),
    };
    let sort = PostSort::parse(query.sort.as_deref().unwrap_or("-createdAt"));

    let (items, total) = state.posts.list(&filter, sort, page, limit).await?;

    let data: Vec<BlogSummary> = items.into_iter().map(Into::into).collect();
    Ok(HttpResponse::Ok().json(ListResponse::new(data, Pagination::new(page, limit, total))))
}

/// GET /api/blogs/{id} - public; every read counts a view.
pub async fn get_blog(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let detail = state
        .posts
        .find_detail(path.into_inner())
        .await?
        .ok_or_else(|| AppError::NotFound("Blog not found".to_string()))?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(BlogDetail::from(detail))))
}

/// POST /api/blogs - Admin only
pub async fn create_blog(
    state: web::Data<AppState>,
    admin: AdminIdentity,
    body: web::Json<CreateBlogRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();

    let fields = NewPost {
        title: req.title,
        description: req.description,
        image: req.image.filter(|i| !i.is_empty()),
        category: req.category,
        tags: req.tags,
        status: req.status,
    };
    fields.validate()?;

    let created = state.posts.insert(Post::new(admin.user.id, fields)).await?;

    Ok(HttpResponse::Created().json(ApiResponse::ok_with_message(
        BlogSummary::from(created),
        "Blog created successfully",
    )))
}

/// PUT /api/blogs/{id} - Admin only
pub async fn update_blog(
    state: web::Data<AppState>,
    _admin: AdminIdentity,
    path: web::Path<Uuid>,
    body: web::Json<UpdateBlogRequest>,
) -> AppResult<HttpResponse> {
    let patch = PostPatch::from(body.into_inner());
    patch.validate()?;

    let updated = state
        .posts
        .update(path.into_inner(), patch)
        .await
        .map_err(not_found)?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok_with_message(
        BlogSummary::from(updated),
        "Blog updated successfully",
    )))
}

/// DELETE /api/blogs/{id} - Admin only
pub async fn delete_blog(
    state: web::Data<AppState>,
    _admin: AdminIdentity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    state
        .posts
        .delete(path.into_inner())
        .await
        .map_err(not_found)?;

    Ok(HttpResponse::Ok().json(ApiResponse::message_only("Blog deleted successfully")))
}

/// POST /api/blogs/{id}/like - any authenticated user.
pub async fn toggle_like(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let outcome = state
        .posts
        .toggle_like(path.into_inner(), identity.user.id)
        .await
        .map_err(not_found)?;

    let message = if outcome.liked {
        "Blog liked"
    } else {
        "Blog unliked"
    };
    Ok(HttpResponse::Ok().json(ApiResponse::ok_with_message(
        LikeData {
            liked: outcome.liked,
            likes: outcome.likes,
        },
        message,
    )))
}

/// GET /api/blogs/stats/overview - Admin only
pub async fn stats(state: web::Data<AppState>, _admin: AdminIdentity) -> AppResult<HttpResponse> {
    let stats = state.posts.stats().await?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(StatsDto::from(stats))))
}
