//! # Quill Infrastructure
//!
//! Concrete implementations of the ports defined in `quill-core`:
//! SeaORM/Postgres repositories, in-memory fallbacks, the JWT token service
//! and Argon2 password hashing.

pub mod auth;
pub mod database;

pub use auth::{Argon2PasswordService, JwtConfig, JwtTokenService};
pub use database::{
    DatabaseConfig, InMemoryCategoryRepository, InMemoryPostRepository, InMemoryUserRepository,
    PostgresCategoryRepository, PostgresPostRepository, PostgresUserRepository, connect,
};
