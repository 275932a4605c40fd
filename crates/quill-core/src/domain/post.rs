use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::authz::Owned;

/// Post entity - owned content written by a user.
///
/// `author_id` is fixed at creation and never reassigned through the edit
/// path. `category_id` is an optional non-owning reference; deleting the
/// category nulls it rather than cascading.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub author_id: i64,
    pub category_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Post {
    /// Create a new, unsaved post with fresh timestamps.
    pub fn new(
        title: String,
        description: String,
        author_id: i64,
        category_id: Option<i64>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: 0,
            title,
            description,
            author_id,
            category_id,
            created_at: now,
            updated_at: now,
        }
    }
}

impl Owned for Post {
    fn owner_id(&self) -> i64 {
        self.author_id
    }
}

/// A post hydrated with its author and category for read paths.
///
/// Every detail and list endpoint returns posts in this shape; the category
/// part is absent when the post is uncategorized or its category was deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostDetails {
    pub post: Post,
    pub author_name: String,
    pub author_email: String,
    pub category_name: Option<String>,
}
