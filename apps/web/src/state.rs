//! Application state - shared across all handlers.

use std::sync::Arc;

use quill_core::ports::{
    CommentRepository, GroupRepository, PasswordService, PostRepository, TokenService,
    UserRepository,
};
use quill_infra::{Argon2PasswordService, InMemoryBlogStore, JwtTokenService};

use crate::config::AppConfig;

#[cfg(feature = "postgres")]
use quill_infra::database::{
    self, DbConn, PostgresCommentRepository, PostgresGroupRepository, PostgresPostRepository,
    PostgresUserRepository,
};

/// Repository handles for one storage backend.
#[derive(Clone)]
pub struct Repositories {
    pub users: Arc<dyn UserRepository>,
    pub groups: Arc<dyn GroupRepository>,
    pub posts: Arc<dyn PostRepository>,
    pub comments: Arc<dyn CommentRepository>,
    /// "postgres" or "memory", reported by the health check.
    pub storage: &'static str,
}

impl Repositories {
    pub fn in_memory() -> Self {
        Self::from_store(Arc::new(InMemoryBlogStore::new()))
    }

    pub fn from_store(store: Arc<InMemoryBlogStore>) -> Self {
        Self {
            users: store.clone(),
            groups: store.clone(),
            posts: store.clone(),
            comments: store,
            storage: "memory",
        }
    }

    #[cfg(feature = "postgres")]
    pub fn postgres(conn: DbConn) -> Self {
        Self {
            users: Arc::new(PostgresUserRepository::new(conn.clone())),
            groups: Arc::new(PostgresGroupRepository::new(conn.clone())),
            posts: Arc::new(PostgresPostRepository::new(conn.clone())),
            comments: Arc::new(PostgresCommentRepository::new(conn)),
            storage: "postgres",
        }
    }
}

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub repos: Repositories,
    pub tokens: Arc<dyn TokenService>,
    pub passwords: Arc<dyn PasswordService>,
    pub session_cookie_secure: bool,
}

impl AppState {
    /// Build the application state, falling back to in-memory storage when
    /// no database is configured or reachable.
    pub async fn new(config: &AppConfig) -> Self {
        let tokens: Arc<dyn TokenService> = Arc::new(JwtTokenService::new(config.jwt.clone()));
        let passwords: Arc<dyn PasswordService> = Arc::new(Argon2PasswordService::new());

        #[cfg(feature = "postgres")]
        let repos = match &config.database {
            Some(db_config) => match database::connect(db_config).await {
                Ok(conn) => Repositories::postgres(conn),
                Err(e) => {
                    tracing::error!(
                        "Failed to connect to database: {}. Using in-memory fallback.",
                        e
                    );
                    Repositories::in_memory()
                }
            },
            None => {
                tracing::warn!("DATABASE_URL not set. Running without database (in-memory mode).");
                Repositories::in_memory()
            }
        };

        #[cfg(not(feature = "postgres"))]
        let repos = {
            tracing::info!("Running without postgres feature - using in-memory store");
            Repositories::in_memory()
        };

        tracing::info!(storage = repos.storage, "Application state initialized");

        Self {
            repos,
            tokens,
            passwords,
            session_cookie_secure: config.session_cookie_secure,
        }
    }

    #[cfg(test)]
    pub fn with_repositories(
        repos: Repositories,
        tokens: Arc<dyn TokenService>,
        passwords: Arc<dyn PasswordService>,
    ) -> Self {
        Self {
            repos,
            tokens,
            passwords,
            session_cookie_secure: false,
        }
    }
}
