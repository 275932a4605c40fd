//! Data Transfer Objects - request/response types for the API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use quill_core::domain::{Category, PostDetails, User};

fn rfc3339(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339()
}

/// Request to register a new user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

impl RegisterRequest {
    pub fn sanitize(&mut self) {
        self.name = self.name.trim().to_string();
        self.email = self.email.trim().to_string();
    }
}

/// Request to login.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl LoginRequest {
    pub fn sanitize(&mut self) {
        self.email = self.email.trim().to_string();
    }
}

/// A user's public information. Never carries the password hash.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub created_at: String,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            created_at: rfc3339(user.created_at),
        }
    }
}

/// Login result: the authenticated user plus a bearer token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub user: UserResponse,
    pub token: String,
}

/// Request to create a post. The author is taken from the authenticated
/// identity, not the body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePostRequest {
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub category_id: Option<i64>,
}

impl CreatePostRequest {
    pub fn sanitize(&mut self) {
        self.title = self.title.trim().to_string();
        self.description = self.description.trim().to_string();
    }
}

/// Request to edit a post. Authorship is immutable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdatePostRequest {
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub category_id: Option<i64>,
}

impl UpdatePostRequest {
    pub fn sanitize(&mut self) {
        self.title = self.title.trim().to_string();
        self.description = self.description.trim().to_string();
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthorInfo {
    pub id: i64,
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryInfo {
    pub id: i64,
    pub name: String,
}

/// A post with its author and (optional) category resolved.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostResponse {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub author: AuthorInfo,
    pub category: Option<CategoryInfo>,
    pub created_at: String,
}

impl From<PostDetails> for PostResponse {
    fn from(details: PostDetails) -> Self {
        let category = match (details.post.category_id, details.category_name) {
            (Some(id), Some(name)) => Some(CategoryInfo { id, name }),
            _ => None,
        };
        Self {
            id: details.post.id,
            title: details.post.title,
            description: details.post.description,
            author: AuthorInfo {
                id: details.post.author_id,
                name: details.author_name,
                email: details.author_email,
            },
            category,
            created_at: rfc3339(details.post.created_at),
        }
    }
}

/// Request to create a category.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryRequest {
    pub name: String,
}

impl CategoryRequest {
    pub fn sanitize(&mut self) {
        self.name = self.name.trim().to_string();
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryResponse {
    pub id: i64,
    pub name: String,
}

impl From<Category> for CategoryResponse {
    fn from(category: Category) -> Self {
        Self {
            id: category.id,
            name: category.name,
        }
    }
}
