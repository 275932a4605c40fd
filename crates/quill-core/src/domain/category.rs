use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Category entity - a named tag for posts, unique by name, no owner.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Category {
    /// Create a new, unsaved category with fresh timestamps.
    pub fn new(name: String) -> Self {
        let now = Utc::now();
        Self {
            id: 0,
            name,
            created_at: now,
            updated_at: now,
        }
    }
}
