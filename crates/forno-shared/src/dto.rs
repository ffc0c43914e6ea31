//! Data Transfer Objects - request/response types for the API.
//!
//! Field names follow the wire convention of the original storefront
//! clients (camelCase), while domain types stay idiomatic Rust.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use forno_core::domain::{
    AuthorRef, BlogStats, CategoryCount, PostDetail, PostPatch, PostStatus, PostWithAuthor, Role,
    User,
};

// ---------------------------------------------------------------------------
// Auth requests

/// Request to register a new user (also the bootstrap-admin body).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Request to login.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Partial profile update; absent fields are left untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateProfileRequest {
    pub username: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

// ---------------------------------------------------------------------------
// Blog requests

fn default_category() -> String {
    "general".to_string()
}

fn default_status() -> PostStatus {
    PostStatus::Published
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateBlogRequest {
    pub title: String,
    pub description: String,
    pub image: Option<String>,
    #[serde(default = "default_category")]
    pub category: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default = "default_status")]
    pub status: PostStatus,
}

/// Partial blog update. An absent `image` leaves the image alone; a
/// present-but-empty `image` clears it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateBlogRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
    pub category: Option<String>,
    pub tags: Option<Vec<String>>,
    pub status: Option<PostStatus>,
}

impl From<UpdateBlogRequest> for PostPatch {
    fn from(req: UpdateBlogRequest) -> Self {
        Self {
            title: req.title,
            description: req.description,
            image: req.image,
            category: req.category,
            tags: req.tags,
            status: req.status,
        }
    }
}

fn default_page() -> u64 {
    1
}

fn default_limit() -> u64 {
    10
}

/// Query string of the public listing endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListBlogsQuery {
    #[serde(default = "default_page")]
    pub page: u64,
    #[serde(default = "default_limit")]
    pub limit: u64,
    pub category: Option<String>,
    pub search: Option<String>,
    pub sort: Option<String>,
}

// ---------------------------------------------------------------------------
// Responses

/// Public projection of a user. Built from the domain entity, which never
/// serializes its password hash in the first place.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDto {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub role: Role,
    pub is_active: bool,
    pub last_login: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserDto {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            role: user.role,
            is_active: user.is_active,
            last_login: user.last_login,
            created_at: user.created_at,
        }
    }
}

/// `{user, token}` payload returned by register, login and setup-admin.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthData {
    pub user: UserDto,
    pub token: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthorDto {
    pub id: Uuid,
    pub username: String,
}

impl From<AuthorRef> for AuthorDto {
    fn from(author: AuthorRef) -> Self {
        Self {
            id: author.id,
            username: author.username,
        }
    }
}

/// List-item shape: author joined, likes reduced to a count.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlogSummary {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub image: Option<String>,
    pub category: String,
    pub tags: Vec<String>,
    pub author: AuthorDto,
    pub status: PostStatus,
    pub views: i64,
    pub likes: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<PostWithAuthor> for BlogSummary {
    fn from(item: PostWithAuthor) -> Self {
        let PostWithAuthor { post, author } = item;
        Self {
            id: post.id,
            title: post.title,
            description: post.description,
            image: post.image,
            category: post.category,
            tags: post.tags,
            author: author.into(),
            status: post.status,
            views: post.views,
            likes: post.likes.len() as u64,
            created_at: post.created_at,
            updated_at: post.updated_at,
        }
    }
}

/// Detail shape: likers expanded to username projections.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlogDetail {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub image: Option<String>,
    pub category: String,
    pub tags: Vec<String>,
    pub author: AuthorDto,
    pub status: PostStatus,
    pub views: i64,
    pub likes: Vec<AuthorDto>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<PostDetail> for BlogDetail {
    fn from(detail: PostDetail) -> Self {
        let PostDetail {
            post,
            author,
            liked_by,
        } = detail;
        Self {
            id: post.id,
            title: post.title,
            description: post.description,
            image: post.image,
            category: post.category,
            tags: post.tags,
            author: author.into(),
            status: post.status,
            views: post.views,
            likes: liked_by.into_iter().map(Into::into).collect(),
            created_at: post.created_at,
            updated_at: post.updated_at,
        }
    }
}

/// Payload of the like-toggle endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LikeData {
    pub liked: bool,
    pub likes: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsDto {
    pub total_blogs: u64,
    pub published_blogs: u64,
    pub draft_blogs: u64,
    pub total_views: i64,
    pub category_stats: Vec<CategoryCount>,
}

impl From<BlogStats> for StatsDto {
    fn from(stats: BlogStats) -> Self {
        Self {
            total_blogs: stats.total_blogs,
            published_blogs: stats.published_blogs,
            draft_blogs: stats.draft_blogs,
            total_views: stats.total_views,
            category_stats: stats.categories,
        }
    }
}

/// Pagination block of listing responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub current_page: u64,
    pub total_pages: u64,
    pub total_blogs: u64,
    pub has_next: bool,
    pub has_prev: bool,
}

impl Pagination {
    pub fn new(page: u64, limit: u64, total: u64) -> Self {
        let limit = limit.max(1);
        Self {
            current_page: page,
            total_pages: total.div_ceil(limit),
            total_blogs: total,
            // Saturating: an absurd page number means "past the end",
            // never an overflow.
            has_next: page.saturating_mul(limit) < total,
            has_prev: page > 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pagination_middle_page() {
        let p = Pagination::new(2, 10, 25);
        assert_eq!(p.total_pages, 3);
        assert!(p.has_next);
        assert!(p.has_prev);
    }

    #[test]
    fn pagination_first_and_last_page() {
        let first = Pagination::new(1, 10, 25);
        assert!(first.has_next);
        assert!(!first.has_prev);

        let last = Pagination::new(3, 10, 25);
        assert!(!last.has_next);
        assert!(last.has_prev);
    }

    #[test]
    fn pagination_exact_multiple() {
        let p = Pagination::new(2, 10, 20);
        assert_eq!(p.total_pages, 2);
        assert!(!p.has_next);
    }

    #[test]
    fn pagination_huge_page_does_not_overflow() {
        let p = Pagination::new(u64::MAX, 10, 25);
        assert!(!p.has_next);
        assert!(p.has_prev);
        assert_eq!(p.total_pages, 3);
    }

    #[test]
    fn list_query_defaults() {
        let q: ListBlogsQuery = serde_json::from_str("{}").unwrap();
        assert_eq!(q.page, 1);
        assert_eq!(q.limit, 10);
        assert!(q.sort.is_none());
    }
}
