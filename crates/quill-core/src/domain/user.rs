use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// User entity - an account that can authenticate and author posts.
///
/// Users are never deleted in this system; the id is assigned by the store
/// on insert (`id == 0` marks an unsaved entity).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Create a new, unsaved user with fresh timestamps.
    pub fn new(name: String, email: String, password_hash: String) -> Self {
        let now = Utc::now();
        Self {
            id: 0,
            name,
            email,
            password_hash,
            created_at: now,
            updated_at: now,
        }
    }
}
