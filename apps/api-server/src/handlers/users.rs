//! User listing handler.

use actix_web::{HttpResponse, web};

use quill_shared::ApiResponse;
use quill_shared::dto::UserResponse;

use crate::middleware::auth::Identity;
use crate::middleware::error::AppResult;
use crate::state::AppState;

/// GET /users - protected admin listing, never exposes password hashes.
pub async fn list(_identity: Identity, state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let users = state.users.list().await?;

    let response: Vec<UserResponse> = users.into_iter().map(UserResponse::from).collect();

    Ok(HttpResponse::Ok().json(ApiResponse::new(
        "Successfully retrieved users",
        response,
    )))
}
