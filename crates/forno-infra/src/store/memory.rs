//! In-memory store - used when no database is configured.
//!
//! Both repositories share one set of tables behind a single async
//! `RwLock`, so every mutation (the view bump and like toggle included) is
//! serialized through the write guard and cannot lose updates.
//! Note: Data is lost on process restart.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use forno_core::domain::{
    AuthorRef, BlogStats, CategoryCount, Post, PostDetail, PostFilter, PostPatch, PostSort,
    PostStatus, PostWithAuthor, Role, SortField, User,
};
use forno_core::error::RepoError;
use forno_core::ports::{LikeOutcome, PostRepository, UserRepository};

#[derive(Default)]
struct Tables {
    users: HashMap<Uuid, User>,
    posts: HashMap<Uuid, Post>,
}

impl Tables {
    fn author_ref(&self, id: Uuid) -> AuthorRef {
        AuthorRef {
            id,
            username: self
                .users
                .get(&id)
                .map(|u| u.username.clone())
                .unwrap_or_else(|| "unknown".to_string()),
        }
    }

    fn with_author(&self, post: Post) -> PostWithAuthor {
        let author = self.author_ref(post.author);
        PostWithAuthor { post, author }
    }
}

/// In-memory user repository.
pub struct InMemoryUserStore {
    tables: Arc<RwLock<Tables>>,
}

/// In-memory post repository.
pub struct InMemoryPostStore {
    tables: Arc<RwLock<Tables>>,
}

/// Build a linked pair of stores over one shared table set, so post
/// listings can join author usernames.
pub fn in_memory_stores() -> (InMemoryUserStore, InMemoryPostStore) {
    let tables = Arc::new(RwLock::new(Tables::default()));
    (
        InMemoryUserStore {
            tables: tables.clone(),
        },
        InMemoryPostStore { tables },
    )
}

#[async_trait]
impl UserRepository for InMemoryUserStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, RepoError> {
        Ok(self.tables.read().await.users.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables.users.values().find(|u| u.email == email).cloned())
    }

    async fn find_by_email_or_username(
        &self,
        email: &str,
        username: &str,
    ) -> Result<Option<User>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .values()
            .find(|u| u.email == email || u.username == username)
            .cloned())
    }

    async fn insert(&self, user: User) -> Result<User, RepoError> {
        let mut tables = self.tables.write().await;

        if tables
            .users
            .values()
            .any(|u| u.email == user.email || u.username == user.username)
        {
            return Err(RepoError::Constraint(
                "User with this email or username already exists".to_string(),
            ));
        }
        // Single-admin invariant, enforced at the store layer.
        if user.role == Role::Admin && tables.users.values().any(|u| u.role == Role::Admin) {
            return Err(RepoError::Constraint(
                "Admin user already exists".to_string(),
            ));
        }

        tables.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn update(&self, user: User) -> Result<User, RepoError> {
        let mut tables = self.tables.write().await;

        if !tables.users.contains_key(&user.id) {
            return Err(RepoError::NotFound);
        }
        if tables
            .users
            .values()
            .any(|u| u.id != user.id && (u.email == user.email || u.username == user.username))
        {
            return Err(RepoError::Constraint(
                "User with this email or username already exists".to_string(),
            ));
        }

        tables.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn set_password(&self, id: Uuid, password_hash: String) -> Result<(), RepoError> {
        let mut tables = self.tables.write().await;
        let user = tables.users.get_mut(&id).ok_or(RepoError::NotFound)?;
        user.password_hash = password_hash;
        user.updated_at = Utc::now();
        Ok(())
    }

    async fn touch_last_login(&self, id: Uuid) -> Result<(), RepoError> {
        let mut tables = self.tables.write().await;
        let user = tables.users.get_mut(&id).ok_or(RepoError::NotFound)?;
        user.last_login = Some(Utc::now());
        Ok(())
    }

    async fn list(&self) -> Result<Vec<User>, RepoError> {
        let tables = self.tables.read().await;
        let mut users: Vec<User> = tables.users.values().cloned().collect();
        users.sort_by_key(|u| u.created_at);
        Ok(users)
    }

    async fn admin_exists(&self) -> Result<bool, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables.users.values().any(|u| u.role == Role::Admin))
    }
}

/// Tokenized term match over title and description, the in-memory stand-in
/// for the Postgres full-text index: every search term must appear as a
/// word in one of the indexed fields.
fn matches_search(post: &Post, search: &str) -> bool {
    let haystack: Vec<String> = post
        .title
        .split_whitespace()
        .chain(post.description.split_whitespace())
        .map(|w| {
            w.trim_matches(|c: char| !c.is_alphanumeric())
                .to_lowercase()
        })
        .collect();

    search
        .split_whitespace()
        .map(str::to_lowercase)
        .all(|term| haystack.iter().any(|w| *w == term))
}

fn matches_filter(post: &Post, filter: &PostFilter) -> bool {
    if let Some(status) = filter.status {
        if post.status != status {
            return false;
        }
    }
    if let Some(category) = &filter.category {
        if post.category != *category {
            return false;
        }
    }
    if let Some(search) = &filter.search {
        if !matches_search(post, search) {
            return false;
        }
    }
    true
}

fn sort_posts(posts: &mut [Post], sort: PostSort) {
    match sort.field {
        SortField::CreatedAt => posts.sort_by_key(|p| p.created_at),
        SortField::Views => posts.sort_by_key(|p| p.views),
        SortField::Title => posts.sort_by(|a, b| a.title.cmp(&b.title)),
    }
    if sort.descending {
        posts.reverse();
    }
}

#[async_trait]
impl PostRepository for InMemoryPostStore {
    async fn list(
        &self,
        filter: &PostFilter,
        sort: PostSort,
        page: u64,
        limit: u64,
    ) -> Result<(Vec<PostWithAuthor>, u64), RepoError> {
        let tables = self.tables.read().await;

        let mut matches: Vec<Post> = tables
            .posts
            .values()
            .filter(|p| matches_filter(p, filter))
            .cloned()
            .collect();
        let total = matches.len() as u64;

        sort_posts(&mut matches, sort);

        let skip = page.saturating_sub(1).saturating_mul(limit) as usize;
        let items = matches
            .into_iter()
            .skip(skip)
            .take(limit as usize)
            .map(|p| tables.with_author(p))
            .collect();

        Ok((items, total))
    }

    async fn find_detail(&self, id: Uuid) -> Result<Option<PostDetail>, RepoError> {
        let mut tables = self.tables.write().await;

        let post = match tables.posts.get_mut(&id) {
            Some(post) => {
                post.views += 1;
                post.clone()
            }
            None => return Ok(None),
        };

        let author = tables.author_ref(post.author);
        let liked_by = post.likes.iter().map(|&id| tables.author_ref(id)).collect();

        Ok(Some(PostDetail {
            post,
            author,
            liked_by,
        }))
    }

    async fn insert(&self, post: Post) -> Result<PostWithAuthor, RepoError> {
        let mut tables = self.tables.write().await;
        tables.posts.insert(post.id, post.clone());
        Ok(tables.with_author(post))
    }

    async fn update(&self, id: Uuid, patch: PostPatch) -> Result<PostWithAuthor, RepoError> {
        let mut tables = self.tables.write().await;

        let post = tables.posts.get_mut(&id).ok_or(RepoError::NotFound)?;
        patch.apply(post);
        let post = post.clone();

        Ok(tables.with_author(post))
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let mut tables = self.tables.write().await;
        tables.posts.remove(&id).ok_or(RepoError::NotFound)?;
        Ok(())
    }

    async fn toggle_like(&self, id: Uuid, user_id: Uuid) -> Result<LikeOutcome, RepoError> {
        let mut tables = self.tables.write().await;
        let post = tables.posts.get_mut(&id).ok_or(RepoError::NotFound)?;

        let liked = match post.likes.iter().position(|&u| u == user_id) {
            Some(index) => {
                post.likes.remove(index);
                false
            }
            None => {
                post.likes.push(user_id);
                true
            }
        };

        Ok(LikeOutcome {
            liked,
            likes: post.likes.len() as u64,
        })
    }

    async fn stats(&self) -> Result<BlogStats, RepoError> {
        let tables = self.tables.read().await;

        let mut published = 0u64;
        let mut drafts = 0u64;
        let mut total_views = 0i64;
        let mut categories: BTreeMap<String, u64> = BTreeMap::new();

        for post in tables.posts.values() {
            match post.status {
                PostStatus::Published => published += 1,
                PostStatus::Draft => drafts += 1,
            }
            total_views += post.views;
            *categories.entry(post.category.clone()).or_default() += 1;
        }

        Ok(BlogStats {
            total_blogs: tables.posts.len() as u64,
            published_blogs: published,
            draft_blogs: drafts,
            total_views,
            categories: categories
                .into_iter()
                .map(|(category, count)| CategoryCount { category, count })
                .collect(),
        })
    }
}
