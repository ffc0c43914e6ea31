//! PostgreSQL repository implementations.
//!
//! Counters stay atomic at the database: the view bump is a single
//! `UPDATE posts SET views = views + 1` and a like is one row in
//! `post_likes` keyed by `(post_id, user_id)`.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DbConn, DbErr, EntityTrait, Order, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Select, Set,
};
use uuid::Uuid;

use forno_core::domain::{
    AuthorRef, BlogStats, CategoryCount, Post, PostDetail, PostFilter, PostPatch, PostSort,
    PostStatus, PostWithAuthor, User,
};
use forno_core::error::RepoError;
use forno_core::ports::{LikeOutcome, PostRepository, UserRepository};

use super::entity::post::{self, Entity as PostEntity};
use super::entity::post_like::{self, Entity as PostLikeEntity};
use super::entity::user::{self, Entity as UserEntity};

fn map_db_err(e: DbErr) -> RepoError {
    let err_str = e.to_string();
    if err_str.contains("duplicate") || err_str.contains("unique") {
        RepoError::Constraint("Entity already exists".to_string())
    } else {
        RepoError::Query(err_str)
    }
}

/// Mask an email for logging to avoid PII in logs.
fn mask_email(email: &str) -> String {
    if let Some(at_pos) = email.find('@') {
        let (local, domain) = email.split_at(at_pos);
        // Split on char boundaries; the first char may be multi-byte.
        let mut chars = local.chars();
        let masked_local = match chars.next() {
            Some(first) if chars.next().is_some() => format!("{first}***"),
            _ => "***".to_string(),
        };
        format!("{masked_local}{domain}")
    } else {
        "***".to_string()
    }
}

/// PostgreSQL user repository.
pub struct PostgresUserStore {
    db: DbConn,
}

impl PostgresUserStore {
    pub fn new(db: DbConn) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserRepository for PostgresUserStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, RepoError> {
        let result = UserEntity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(result.map(Into::into))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        tracing::debug!(user_email = %mask_email(email), "Finding user by email");

        let result = UserEntity::find()
            .filter(user::Column::Email.eq(email))
            .one(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(result.map(Into::into))
    }

    async fn find_by_email_or_username(
        &self,
        email: &str,
        username: &str,
    ) -> Result<Option<User>, RepoError> {
        let result = UserEntity::find()
            .filter(
                Condition::any()
                    .add(user::Column::Email.eq(email))
                    .add(user::Column::Username.eq(username)),
            )
            .one(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(result.map(Into::into))
    }

    async fn insert(&self, new_user: User) -> Result<User, RepoError> {
        // Unique columns and the partial admin index turn races into
        // constraint violations instead of duplicates.
        let model = user::ActiveModel::from(new_user)
            .insert(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(model.into())
    }

    async fn update(&self, updated: User) -> Result<User, RepoError> {
        let model = user::ActiveModel::from(updated)
            .update(&self.db)
            .await
            .map_err(|e| match e {
                DbErr::RecordNotUpdated => RepoError::NotFound,
                other => map_db_err(other),
            })?;

        Ok(model.into())
    }

    async fn set_password(&self, id: Uuid, password_hash: String) -> Result<(), RepoError> {
        let result = UserEntity::update_many()
            .col_expr(user::Column::PasswordHash, Expr::value(password_hash))
            .col_expr(user::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(user::Column::Id.eq(id))
            .exec(&self.db)
            .await
            .map_err(map_db_err)?;

        if result.rows_affected == 0 {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }

    async fn touch_last_login(&self, id: Uuid) -> Result<(), RepoError> {
        let result = UserEntity::update_many()
            .col_expr(user::Column::LastLogin, Expr::value(Some(Utc::now())))
            .filter(user::Column::Id.eq(id))
            .exec(&self.db)
            .await
            .map_err(map_db_err)?;

        if result.rows_affected == 0 {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }

    async fn list(&self) -> Result<Vec<User>, RepoError> {
        let result = UserEntity::find()
            .order_by_asc(user::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(result.into_iter().map(Into::into).collect())
    }

    async fn admin_exists(&self) -> Result<bool, RepoError> {
        let count = UserEntity::find()
            .filter(user::Column::Role.eq("admin"))
            .count(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(count > 0)
    }
}

/// PostgreSQL post repository.
pub struct PostgresPostStore {
    db: DbConn,
}

impl PostgresPostStore {
    pub fn new(db: DbConn) -> Self {
        Self { db }
    }

    /// Like sets for a page of posts, keyed by post id.
    async fn load_likes(&self, ids: &[Uuid]) -> Result<HashMap<Uuid, Vec<Uuid>>, RepoError> {
        let mut likes: HashMap<Uuid, Vec<Uuid>> = HashMap::new();
        if ids.is_empty() {
            return Ok(likes);
        }

        let rows = PostLikeEntity::find()
            .filter(post_like::Column::PostId.is_in(ids.iter().copied()))
            .all(&self.db)
            .await
            .map_err(map_db_err)?;

        for row in rows {
            likes.entry(row.post_id).or_default().push(row.user_id);
        }
        Ok(likes)
    }

    async fn author_ref(&self, id: Uuid) -> Result<AuthorRef, RepoError> {
        let username = UserEntity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(map_db_err)?
            .map(|u| u.username)
            .unwrap_or_else(|| "unknown".to_string());

        Ok(AuthorRef { id, username })
    }
}

fn apply_filter(mut query: Select<PostEntity>, filter: &PostFilter) -> Select<PostEntity> {
    if let Some(status) = filter.status {
        query = query.filter(post::Column::Status.eq(status.as_str()));
    }
    if let Some(category) = &filter.category {
        query = query.filter(post::Column::Category.eq(category.clone()));
    }
    if let Some(search) = &filter.search {
        // Matches the GIN full-text index created by the migration.
        query = query.filter(Expr::cust_with_values(
            "to_tsvector('english', title || ' ' || description) @@ plainto_tsquery('english', ?)",
            [search.clone()],
        ));
    }
    query
}

fn order(sort: PostSort) -> (post::Column, Order) {
    use forno_core::domain::SortField;

    let column = match sort.field {
        SortField::CreatedAt => post::Column::CreatedAt,
        SortField::Views => post::Column::Views,
        SortField::Title => post::Column::Title,
    };
    let direction = if sort.descending {
        Order::Desc
    } else {
        Order::Asc
    };
    (column, direction)
}

fn author_from(post_id: Uuid, author: Option<user::Model>) -> AuthorRef {
    match author {
        Some(user) => AuthorRef {
            id: user.id,
            username: user.username,
        },
        None => {
            tracing::warn!(%post_id, "Post has no resolvable author");
            AuthorRef {
                id: Uuid::nil(),
                username: "unknown".to_string(),
            }
        }
    }
}

#[async_trait]
impl PostRepository for PostgresPostStore {
    async fn list(
        &self,
        filter: &PostFilter,
        sort: PostSort,
        page: u64,
        limit: u64,
    ) -> Result<(Vec<PostWithAuthor>, u64), RepoError> {
        let total = apply_filter(PostEntity::find(), filter)
            .count(&self.db)
            .await
            .map_err(map_db_err)?;

        let (column, direction) = order(sort);
        let rows = apply_filter(PostEntity::find(), filter)
            .find_also_related(UserEntity)
            .order_by(column, direction)
            .offset(page.saturating_sub(1).saturating_mul(limit))
            .limit(limit)
            .all(&self.db)
            .await
            .map_err(map_db_err)?;

        let ids: Vec<Uuid> = rows.iter().map(|(p, _)| p.id).collect();
        let mut likes = self.load_likes(&ids).await?;

        let items = rows
            .into_iter()
            .map(|(model, author)| {
                let author = author_from(model.id, author);
                let mut domain_post = Post::from(model);
                domain_post.likes = likes.remove(&domain_post.id).unwrap_or_default();
                PostWithAuthor {
                    post: domain_post,
                    author,
                }
            })
            .collect();

        Ok((items, total))
    }

    async fn find_detail(&self, id: Uuid) -> Result<Option<PostDetail>, RepoError> {
        // Atomic increment; also tells us whether the post exists at all.
        let bumped = PostEntity::update_many()
            .col_expr(post::Column::Views, Expr::col(post::Column::Views).add(1))
            .filter(post::Column::Id.eq(id))
            .exec(&self.db)
            .await
            .map_err(map_db_err)?;

        if bumped.rows_affected == 0 {
            return Ok(None);
        }

        let Some((model, author)) = PostEntity::find_by_id(id)
            .find_also_related(UserEntity)
            .one(&self.db)
            .await
            .map_err(map_db_err)?
        else {
            // Deleted between the bump and the read.
            return Ok(None);
        };

        let likers = PostLikeEntity::find()
            .filter(post_like::Column::PostId.eq(id))
            .find_also_related(UserEntity)
            .all(&self.db)
            .await
            .map_err(map_db_err)?;

        let author = author_from(model.id, author);
        let mut domain_post = Post::from(model);
        domain_post.likes = likers.iter().map(|(row, _)| row.user_id).collect();

        let liked_by = likers
            .into_iter()
            .map(|(row, liker)| match liker {
                Some(user) => AuthorRef {
                    id: user.id,
                    username: user.username,
                },
                None => AuthorRef {
                    id: row.user_id,
                    username: "unknown".to_string(),
                },
            })
            .collect();

        Ok(Some(PostDetail {
            post: domain_post,
            author,
            liked_by,
        }))
    }

    async fn insert(&self, new_post: Post) -> Result<PostWithAuthor, RepoError> {
        let author_id = new_post.author;
        let model = post::ActiveModel::from(new_post)
            .insert(&self.db)
            .await
            .map_err(map_db_err)?;

        let author = self.author_ref(author_id).await?;
        Ok(PostWithAuthor {
            post: model.into(),
            author,
        })
    }

    async fn update(&self, id: Uuid, patch: PostPatch) -> Result<PostWithAuthor, RepoError> {
        let model = PostEntity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(map_db_err)?
            .ok_or(RepoError::NotFound)?;

        let mut domain_post = Post::from(model);
        patch.apply(&mut domain_post);
        let author_id = domain_post.author;

        let model = post::ActiveModel::from(domain_post)
            .update(&self.db)
            .await
            .map_err(|e| match e {
                DbErr::RecordNotUpdated => RepoError::NotFound,
                other => map_db_err(other),
            })?;

        let author = self.author_ref(author_id).await?;
        let mut likes = self.load_likes(&[id]).await?;
        let mut domain_post = Post::from(model);
        domain_post.likes = likes.remove(&id).unwrap_or_default();

        Ok(PostWithAuthor {
            post: domain_post,
            author,
        })
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let result = PostEntity::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(map_db_err)?;

        if result.rows_affected == 0 {
            return Err(RepoError::NotFound);
        }

        Ok(())
    }

    async fn toggle_like(&self, id: Uuid, user_id: Uuid) -> Result<LikeOutcome, RepoError> {
        let exists = PostEntity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(map_db_err)?
            .is_some();
        if !exists {
            return Err(RepoError::NotFound);
        }

        // Remove-then-insert: the composite primary key keeps the set
        // duplicate-free even under concurrent toggles.
        let removed = PostLikeEntity::delete_many()
            .filter(post_like::Column::PostId.eq(id))
            .filter(post_like::Column::UserId.eq(user_id))
            .exec(&self.db)
            .await
            .map_err(map_db_err)?;

        let liked = if removed.rows_affected == 0 {
            post_like::ActiveModel {
                post_id: Set(id),
                user_id: Set(user_id),
                created_at: Set(Utc::now().into()),
            }
            .insert(&self.db)
            .await
            .map_err(map_db_err)?;
            true
        } else {
            false
        };

        let likes = PostLikeEntity::find()
            .filter(post_like::Column::PostId.eq(id))
            .count(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(LikeOutcome { liked, likes })
    }

    async fn stats(&self) -> Result<BlogStats, RepoError> {
        let total_blogs = PostEntity::find().count(&self.db).await.map_err(map_db_err)?;
        let published_blogs = PostEntity::find()
            .filter(post::Column::Status.eq(PostStatus::Published.as_str()))
            .count(&self.db)
            .await
            .map_err(map_db_err)?;
        let draft_blogs = PostEntity::find()
            .filter(post::Column::Status.eq(PostStatus::Draft.as_str()))
            .count(&self.db)
            .await
            .map_err(map_db_err)?;

        let total_views: Option<i64> = PostEntity::find()
            .select_only()
            .column_as(Expr::cust("COALESCE(SUM(views), 0)::BIGINT"), "total_views")
            .into_tuple()
            .one(&self.db)
            .await
            .map_err(map_db_err)?;

        let category_rows: Vec<(String, i64)> = PostEntity::find()
            .select_only()
            .column(post::Column::Category)
            .column_as(Expr::cust("COUNT(*)::BIGINT"), "count")
            .group_by(post::Column::Category)
            .order_by_asc(post::Column::Category)
            .into_tuple()
            .all(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(BlogStats {
            total_blogs,
            published_blogs,
            draft_blogs,
            total_views: total_views.unwrap_or(0),
            categories: category_rows
                .into_iter()
                .map(|(category, count)| CategoryCount {
                    category,
                    count: count as u64,
                })
                .collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::mask_email;

    #[test]
    fn mask_email_keeps_first_char_and_domain() {
        assert_eq!(mask_email("chef@forno.dev"), "c***@forno.dev");
        assert_eq!(mask_email("a@forno.dev"), "***@forno.dev");
        assert_eq!(mask_email("not-an-email"), "***");
    }

    #[test]
    fn mask_email_handles_multibyte_first_char() {
        assert_eq!(mask_email("émile@example.com"), "é***@example.com");
        assert_eq!(mask_email("é@example.com"), "***@example.com");
    }
}
