//! Domain-level error types.

use thiserror::Error;

/// Domain errors - business rule failures raised by the services.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("{entity} not found")]
    NotFound { entity: &'static str },

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Duplicate(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("invalid credentials")]
    Unauthorized,

    #[error("internal error: {0}")]
    Internal(String),
}

/// Repository-level errors.
///
/// A lookup that matches no row is `Ok(None)` at the port level, never an
/// error; `NotFound` here is reserved for mutations that affected zero rows.
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("database connection failed: {0}")]
    Connection(String),

    #[error("query execution failed: {0}")]
    Query(String),

    #[error("entity not found")]
    NotFound,

    #[error("constraint violation: {0}")]
    Constraint(String),
}

impl From<RepoError> for DomainError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound => DomainError::NotFound { entity: "Resource" },
            RepoError::Constraint(msg) => DomainError::Duplicate(msg),
            RepoError::Connection(msg) | RepoError::Query(msg) => DomainError::Internal(msg),
        }
    }
}
