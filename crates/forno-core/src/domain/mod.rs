//! Domain entities - the core business objects.

mod post;
mod user;

pub use post::{
    AuthorRef, BlogStats, CategoryCount, NewPost, Post, PostDetail, PostFilter, PostPatch,
    PostSort, PostStatus, PostWithAuthor, SortField,
};
pub use user::{Role, User};
