//! Application state - shared across all handlers.

use std::sync::Arc;

use forno_core::ports::{PasswordService, PostRepository, TokenService, UserRepository};
use forno_infra::auth::{Argon2PasswordService, JwtTokenService};
use forno_infra::store::in_memory_stores;

use crate::config::AppConfig;

/// Shared application state. Both store backends hide behind the same
/// repository traits, so handlers never know which one is live.
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserRepository>,
    pub posts: Arc<dyn PostRepository>,
    pub tokens: Arc<dyn TokenService>,
    pub passwords: Arc<dyn PasswordService>,
    /// Which backend is live, reported by the health endpoint.
    pub backend: &'static str,
}

impl AppState {
    /// Build the application state with appropriate implementations:
    /// Postgres when `DATABASE_URL` is configured, in-memory otherwise.
    pub async fn new(config: &AppConfig) -> Self {
        let tokens: Arc<dyn TokenService> = Arc::new(JwtTokenService::from_env());
        let passwords: Arc<dyn PasswordService> = Arc::new(Argon2PasswordService::new());

        #[cfg(feature = "postgres")]
        if let Some(db) = &config.database {
            use forno_infra::store::{DatabaseConfig, PostgresPostStore, PostgresUserStore, connect};

            let db_config = DatabaseConfig {
                url: db.url.clone(),
                max_connections: db.max_connections,
                min_connections: db.min_connections,
            };
            match connect(&db_config).await {
                Ok(conn) => {
                    tracing::info!("Application state initialized (postgres store)");
                    return Self {
                        users: Arc::new(PostgresUserStore::new(conn.clone())),
                        posts: Arc::new(PostgresPostStore::new(conn)),
                        tokens,
                        passwords,
                        backend: "postgres",
                    };
                }
                Err(e) => {
                    tracing::error!(
                        "Failed to connect to database: {}. Using in-memory fallback.",
                        e
                    );
                }
            }
        } else {
            tracing::warn!("DATABASE_URL not set. Running without database (in-memory mode).");
        }

        #[cfg(not(feature = "postgres"))]
        {
            let _ = config;
            tracing::info!("Running without postgres feature - using in-memory store");
        }

        let state = Self::in_memory();
        tracing::info!("Application state initialized (in-memory store)");
        state
    }

    /// State over the in-memory store. Also what the integration tests run
    /// against.
    pub fn in_memory() -> Self {
        let (users, posts) = in_memory_stores();
        Self {
            users: Arc::new(users),
            posts: Arc::new(posts),
            tokens: Arc::new(JwtTokenService::from_env()),
            passwords: Arc::new(Argon2PasswordService::new()),
            backend: "memory",
        }
    }
}
