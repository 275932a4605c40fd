//! Registration and login handlers.

use actix_web::{HttpResponse, web};

use quill_core::services::NewUser;
use quill_shared::ApiResponse;
use quill_shared::dto::{LoginRequest, LoginResponse, RegisterRequest, UserResponse};

use crate::middleware::error::AppResult;
use crate::state::AppState;

/// POST /auth/register
pub async fn register(
    state: web::Data<AppState>,
    body: web::Json<RegisterRequest>,
) -> AppResult<HttpResponse> {
    let mut req = body.into_inner();
    req.sanitize();

    state
        .validator
        .registration(&req.name, &req.email, &req.password)?;

    let user = state
        .users
        .register(NewUser {
            name: req.name,
            email: req.email,
            password: req.password,
        })
        .await?;

    Ok(HttpResponse::Created().json(ApiResponse::new(
        "User created successfully",
        UserResponse::from(user),
    )))
}

/// POST /auth/login
pub async fn login(
    state: web::Data<AppState>,
    body: web::Json<LoginRequest>,
) -> AppResult<HttpResponse> {
    let mut req = body.into_inner();
    req.sanitize();

    state.validator.login(&req.email, &req.password)?;

    let (user, token) = state.users.authenticate(&req.email, &req.password).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::new(
        "Login successful",
        LoginResponse {
            user: UserResponse::from(user),
            token,
        },
    )))
}
