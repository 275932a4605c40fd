use async_trait::async_trait;

use crate::domain::{Category, Post, PostDetails, User};
use crate::error::RepoError;

/// Generic repository trait defining standard CRUD operations.
///
/// Lookups that match no row return `Ok(None)`; only store failures are
/// errors. The services rely on this split for the duplicate-check policy.
#[async_trait]
pub trait BaseRepository<T>: Send + Sync {
    /// Find an entity by its unique ID.
    async fn find_by_id(&self, id: i64) -> Result<Option<T>, RepoError>;

    /// Insert a new entity, returning it with its store-assigned ID.
    async fn insert(&self, entity: T) -> Result<T, RepoError>;

    /// Persist changes to an existing entity.
    async fn update(&self, entity: T) -> Result<T, RepoError>;

    /// Delete an entity by ID. `RepoError::NotFound` when no row was deleted.
    async fn delete(&self, id: i64) -> Result<(), RepoError>;
}

/// User repository with domain-specific lookups.
#[async_trait]
pub trait UserRepository: BaseRepository<User> {
    /// Find a user by their email address.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError>;

    /// All users, unpaginated (admin listing).
    async fn find_all(&self) -> Result<Vec<User>, RepoError>;
}

/// Conjunctive filter for post listings. Empty parts do not restrict
/// the result set.
#[derive(Debug, Clone, Default)]
pub struct PostFilter {
    /// Case-insensitive substring match over title OR description.
    pub search: Option<String>,
    pub category_id: Option<i64>,
    pub author_id: Option<i64>,
}

impl PostFilter {
    /// Filter pinned to a single author, everything else unrestricted.
    pub fn by_author(author_id: i64) -> Self {
        Self {
            author_id: Some(author_id),
            ..Self::default()
        }
    }
}

/// Post repository.
#[async_trait]
pub trait PostRepository: BaseRepository<Post> {
    /// Look up the natural key (title, author) used for duplicate detection.
    async fn find_duplicate(&self, title: &str, author_id: i64)
    -> Result<Option<Post>, RepoError>;

    /// A single post hydrated with author and category.
    async fn find_details(&self, id: i64) -> Result<Option<PostDetails>, RepoError>;

    /// Filtered page of hydrated posts, newest first, plus the total count
    /// of rows matching the filter regardless of pagination.
    async fn find_filtered(
        &self,
        filter: &PostFilter,
        offset: u64,
        limit: u64,
    ) -> Result<(Vec<PostDetails>, u64), RepoError>;
}

/// Category repository.
#[async_trait]
pub trait CategoryRepository: BaseRepository<Category> {
    /// Look up the natural key (name) used for duplicate detection.
    async fn find_by_name(&self, name: &str) -> Result<Option<Category>, RepoError>;

    /// A page of categories plus the total count.
    async fn list(&self, offset: u64, limit: u64) -> Result<(Vec<Category>, u64), RepoError>;
}
