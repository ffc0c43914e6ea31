//! Database schema migrations.

pub use sea_orm_migration::prelude::*;

mod m20250601_000001_create_users;
mod m20250601_000002_create_posts;
mod m20250601_000003_create_post_likes;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250601_000001_create_users::Migration),
            Box::new(m20250601_000002_create_posts::Migration),
            Box::new(m20250601_000003_create_post_likes::Migration),
        ]
    }
}
