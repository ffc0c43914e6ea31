//! SeaORM entities backing the Postgres store.

pub mod post;
pub mod post_like;
pub mod user;
