use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{BlogStats, Post, PostDetail, PostFilter, PostPatch, PostSort, PostWithAuthor, User};
use crate::error::RepoError;

/// Credential store: user records and their lifecycle.
///
/// Every mutating call is durably persisted before it returns `Ok`.
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, RepoError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError>;

    /// Duplicate-registration check: matches if either field equals the input.
    async fn find_by_email_or_username(
        &self,
        email: &str,
        username: &str,
    ) -> Result<Option<User>, RepoError>;

    /// Insert a new user. Duplicate email or username yields
    /// `RepoError::Constraint`.
    async fn insert(&self, user: User) -> Result<User, RepoError>;

    /// Persist updated profile fields of an existing user.
    async fn update(&self, user: User) -> Result<User, RepoError>;

    /// Replace the stored password hash.
    async fn set_password(&self, id: Uuid, password_hash: String) -> Result<(), RepoError>;

    /// Set `last_login` to the current time.
    async fn touch_last_login(&self, id: Uuid) -> Result<(), RepoError>;

    /// All users, for the admin view. Hash exclusion happens at the
    /// serialization boundary.
    async fn list(&self) -> Result<Vec<User>, RepoError>;

    /// Whether an admin-role record already exists (bootstrap guard).
    async fn admin_exists(&self) -> Result<bool, RepoError>;
}

/// Result of a like toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LikeOutcome {
    /// True if the call added the like, false if it removed one.
    pub liked: bool,
    pub likes: u64,
}

/// Post store: persistence and retrieval of blog posts.
#[async_trait]
pub trait PostRepository: Send + Sync {
    /// Filtered, sorted, offset-paginated listing joined with a minimal
    /// author projection. Returns the page plus the total match count.
    async fn list(
        &self,
        filter: &PostFilter,
        sort: PostSort,
        page: u64,
        limit: u64,
    ) -> Result<(Vec<PostWithAuthor>, u64), RepoError>;

    /// Fetch one post with author and likers expanded, atomically
    /// incrementing its view counter as a side effect of the read.
    async fn find_detail(&self, id: Uuid) -> Result<Option<PostDetail>, RepoError>;

    /// Persist a new post.
    async fn insert(&self, post: Post) -> Result<PostWithAuthor, RepoError>;

    /// Apply a partial update. `RepoError::NotFound` if the id is absent.
    async fn update(&self, id: Uuid, patch: PostPatch) -> Result<PostWithAuthor, RepoError>;

    /// Hard delete. `RepoError::NotFound` if the id is absent.
    async fn delete(&self, id: Uuid) -> Result<(), RepoError>;

    /// Add the user to the like set if absent, remove it otherwise.
    /// Calling twice with the same arguments restores the original state.
    async fn toggle_like(&self, id: Uuid, user_id: Uuid) -> Result<LikeOutcome, RepoError>;

    /// Aggregate counters across all posts.
    async fn stats(&self) -> Result<BlogStats, RepoError>;
}
