//! Application state - the composition root wiring repositories, services
//! and auth components together.

use std::sync::Arc;

use quill_core::ports::{
    CategoryRepository, PasswordService, PostRepository, TokenService, UserRepository,
};
use quill_core::services::{CategoryService, PostService, UserService};
use quill_core::validate::RequestValidator;
use quill_infra::database::{
    DbConn, InMemoryCategoryRepository, InMemoryPostRepository, InMemoryUserRepository,
    PostgresCategoryRepository, PostgresPostRepository, PostgresUserRepository, connect,
};
use quill_infra::{Argon2PasswordService, JwtTokenService};

use crate::config::AppConfig;

/// The repository set behind the services.
pub struct Repositories {
    pub users: Arc<dyn UserRepository>,
    pub posts: Arc<dyn PostRepository>,
    pub categories: Arc<dyn CategoryRepository>,
}

impl Repositories {
    pub fn postgres(conn: DbConn) -> Self {
        let conn = Arc::new(conn);
        Self {
            users: Arc::new(PostgresUserRepository::new(conn.clone())),
            posts: Arc::new(PostgresPostRepository::new(conn.clone())),
            categories: Arc::new(PostgresCategoryRepository::new(conn)),
        }
    }

    pub fn in_memory() -> Self {
        let users = Arc::new(InMemoryUserRepository::new());
        let categories = Arc::new(InMemoryCategoryRepository::new());
        let posts = Arc::new(InMemoryPostRepository::new(
            users.clone(),
            categories.clone(),
        ));
        Self {
            users,
            posts,
            categories,
        }
    }
}

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub users: UserService,
    pub posts: PostService,
    pub categories: CategoryService,
    pub tokens: Arc<dyn TokenService>,
    pub validator: Arc<RequestValidator>,
}

impl AppState {
    /// Build the application state with the appropriate store backend.
    pub async fn new(config: &AppConfig) -> Self {
        let tokens: Arc<dyn TokenService> = Arc::new(JwtTokenService::from_env());
        let passwords: Arc<dyn PasswordService> = Arc::new(Argon2PasswordService::new());

        let repos = match config.database.as_ref() {
            Some(db_config) => match connect(db_config).await {
                Ok(conn) => Repositories::postgres(conn),
                Err(e) => {
                    tracing::error!(
                        "Failed to connect to database: {}. Using in-memory stores.",
                        e
                    );
                    Repositories::in_memory()
                }
            },
            None => {
                tracing::warn!("DATABASE_URL not set. Running with in-memory stores.");
                Repositories::in_memory()
            }
        };

        Self::assemble(repos, tokens, passwords)
    }

    /// Wire services over an explicit repository set. Tests use this with
    /// in-memory repositories and their own token service.
    pub fn assemble(
        repos: Repositories,
        tokens: Arc<dyn TokenService>,
        passwords: Arc<dyn PasswordService>,
    ) -> Self {
        Self {
            users: UserService::new(repos.users, passwords, tokens.clone()),
            posts: PostService::new(repos.posts),
            categories: CategoryService::new(repos.categories),
            tokens,
            validator: Arc::new(RequestValidator::new()),
        }
    }
}
