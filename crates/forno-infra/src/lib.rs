//! # Forno Infrastructure
//!
//! Concrete implementations of the ports defined in `forno-core`.
//!
//! ## Feature Flags
//!
//! - `postgres` (default) - PostgreSQL store via SeaORM
//! - `minimal` - in-memory store only, no external services

pub mod auth;
pub mod store;

pub use auth::{Argon2PasswordService, JwtTokenService};
pub use store::{InMemoryPostStore, InMemoryUserStore};

#[cfg(feature = "postgres")]
pub use store::{DatabaseConfig, PostgresPostStore, PostgresUserStore, connect};
