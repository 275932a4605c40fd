//! Database adapters - connection management, SeaORM entities, and both
//! Postgres and in-memory repository implementations.

mod connections;
pub mod entity;
pub mod memory;
mod postgres_base;
pub mod postgres_repo;

pub use connections::{DatabaseConfig, connect};
pub use sea_orm::DbConn;
pub use memory::{InMemoryCategoryRepository, InMemoryPostRepository, InMemoryUserRepository};
pub use postgres_repo::{
    PostgresCategoryRepository, PostgresPostRepository, PostgresUserRepository,
};
