use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::DomainError;

/// Publication state of a post. Drafts are invisible to anonymous readers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostStatus {
    Draft,
    Published,
}

impl PostStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PostStatus::Draft => "draft",
            PostStatus::Published => "published",
        }
    }
}

/// Blog post entity.
///
/// `author` is fixed at creation and never reassigned. `views` only ever
/// increments, `likes` behaves as a set of user ids.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub image: Option<String>,
    pub category: String,
    pub tags: Vec<String>,
    pub author: Uuid,
    pub status: PostStatus,
    pub views: i64,
    pub likes: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Longest accepted post title.
pub const MAX_TITLE_LEN: usize = 200;

/// Fields accepted when creating a post.
#[derive(Debug, Clone)]
pub struct NewPost {
    pub title: String,
    pub description: String,
    pub image: Option<String>,
    pub category: String,
    pub tags: Vec<String>,
    pub status: PostStatus,
}

impl NewPost {
    /// Check required fields and length limits before anything is persisted.
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.title.trim().is_empty() {
            return Err(DomainError::Validation("Title is required".to_string()));
        }
        if self.title.chars().count() > MAX_TITLE_LEN {
            return Err(DomainError::Validation(format!(
                "Title must be at most {MAX_TITLE_LEN} characters"
            )));
        }
        if self.description.trim().is_empty() {
            return Err(DomainError::Validation(
                "Description is required".to_string(),
            ));
        }
        Ok(())
    }
}

impl Post {
    /// Create a new post owned by `author` with generated ID and timestamps.
    pub fn new(author: Uuid, fields: NewPost) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            title: fields.title,
            description: fields.description,
            image: fields.image,
            category: fields.category,
            tags: fields.tags,
            author,
            status: fields.status,
            views: 0,
            likes: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }
}

/// Partial update. `None` leaves a field untouched; for `image`,
/// `Some(String::new())` clears it (present-but-empty in the request body).
#[derive(Debug, Clone, Default)]
pub struct PostPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
    pub category: Option<String>,
    pub tags: Option<Vec<String>>,
    pub status: Option<PostStatus>,
}

impl PostPatch {
    pub fn validate(&self) -> Result<(), DomainError> {
        if let Some(title) = &self.title {
            if title.trim().is_empty() {
                return Err(DomainError::Validation("Title is required".to_string()));
            }
            if title.chars().count() > MAX_TITLE_LEN {
                return Err(DomainError::Validation(format!(
                    "Title must be at most {MAX_TITLE_LEN} characters"
                )));
            }
        }
        if let Some(description) = &self.description {
            if description.trim().is_empty() {
                return Err(DomainError::Validation(
                    "Description is required".to_string(),
                ));
            }
        }
        Ok(())
    }

    /// Apply the present fields to `post` and bump `updated_at`.
    pub fn apply(self, post: &mut Post) {
        if let Some(title) = self.title {
            post.title = title;
        }
        if let Some(description) = self.description {
            post.description = description;
        }
        if let Some(image) = self.image {
            post.image = if image.is_empty() { None } else { Some(image) };
        }
        if let Some(category) = self.category {
            post.category = category;
        }
        if let Some(tags) = self.tags {
            post.tags = tags;
        }
        if let Some(status) = self.status {
            post.status = status;
        }
        post.updated_at = Utc::now();
    }
}

/// Listing filter. `status: None` means any status (admin views);
/// public listings pass `Some(Published)`.
#[derive(Debug, Clone, Default)]
pub struct PostFilter {
    pub status: Option<PostStatus>,
    pub category: Option<String>,
    pub search: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    CreatedAt,
    Views,
    Title,
}

/// Sort order for listings, parsed from the query string form the
/// original API used: `-createdAt`, `views`, `-title`, ...
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PostSort {
    pub field: SortField,
    pub descending: bool,
}

impl Default for PostSort {
    fn default() -> Self {
        Self {
            field: SortField::CreatedAt,
            descending: true,
        }
    }
}

impl PostSort {
    /// Parse a `[-]fieldName` sort key; unknown fields fall back to the
    /// default newest-first order.
    pub fn parse(raw: &str) -> Self {
        let (descending, name) = match raw.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, raw),
        };
        let field = match name {
            "createdAt" => SortField::CreatedAt,
            "views" => SortField::Views,
            "title" => SortField::Title,
            _ => return Self::default(),
        };
        Self { field, descending }
    }
}

/// Minimal author projection joined into listings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthorRef {
    pub id: Uuid,
    pub username: String,
}

/// A post together with its author projection (list item shape).
#[derive(Debug, Clone)]
pub struct PostWithAuthor {
    pub post: Post,
    pub author: AuthorRef,
}

/// A post with author and likers expanded to usernames (detail shape).
#[derive(Debug, Clone)]
pub struct PostDetail {
    pub post: Post,
    pub author: AuthorRef,
    pub liked_by: Vec<AuthorRef>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryCount {
    pub category: String,
    pub count: u64,
}

/// Aggregate counters for the admin dashboard.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlogStats {
    pub total_blogs: u64,
    pub published_blogs: u64,
    pub draft_blogs: u64,
    pub total_views: i64,
    pub categories: Vec<CategoryCount>,
}
