//! Store implementations for the user and post repositories.
//!
//! Two backends sit behind the same ports: the in-memory store (no external
//! services, data lost on restart) and the PostgreSQL store.

mod memory;

#[cfg(feature = "postgres")]
mod connections;
#[cfg(feature = "postgres")]
pub mod entity;
#[cfg(feature = "postgres")]
mod postgres;

pub use memory::{InMemoryPostStore, InMemoryUserStore, in_memory_stores};

#[cfg(feature = "postgres")]
pub use connections::{DatabaseConfig, connect};
#[cfg(feature = "postgres")]
pub use postgres::{PostgresPostStore, PostgresUserStore};

#[cfg(feature = "postgres")]
#[cfg(test)]
mod tests;
