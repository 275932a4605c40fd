//! # Quill Core
//!
//! The domain layer of the Quill blog backend.
//! This crate contains pure business logic with zero infrastructure dependencies:
//! entities, the error taxonomy, the ports implemented by `quill-infra`, and the
//! domain services that enforce duplicate detection and ownership policy.

pub mod authz;
pub mod domain;
pub mod error;
pub mod pagination;
pub mod ports;
pub mod services;
pub mod validate;

pub use error::DomainError;
