//! # Forno API
//!
//! HTTP surface of the Forno blog backend. Exposed as a library so the
//! integration tests can assemble the same app the binary runs.

pub mod config;
pub mod handlers;
pub mod middleware;
pub mod state;
