//! Post handlers - public reads, owner-only mutation.

use actix_web::{HttpResponse, web};
use serde::Deserialize;

use quill_core::pagination::{Page, PageRequest};
use quill_core::ports::PostFilter;
use quill_core::services::{NewPost, PostUpdate};
use quill_shared::ApiResponse;
use quill_shared::dto::{CreatePostRequest, PostResponse, UpdatePostRequest};

use crate::middleware::auth::Identity;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

/// Raw query parameters for the public listing. Everything is a string so
/// that junk values hit our own normalization instead of a deserializer 400.
#[derive(Debug, Deserialize)]
pub struct ListPostsQuery {
    pub search: Option<String>,
    pub category_id: Option<String>,
    pub author_id: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
}

fn parse_id_param(raw: Option<&str>, name: &str) -> AppResult<Option<i64>> {
    match raw.filter(|s| !s.is_empty()) {
        None => Ok(None),
        Some(s) => s
            .parse::<i64>()
            .map(Some)
            .map_err(|_| AppError::BadRequest(format!("Invalid {name}"))),
    }
}

/// GET /posts?search=&category_id=&author_id=&page=&limit=
pub async fn list(
    state: web::Data<AppState>,
    query: web::Query<ListPostsQuery>,
) -> AppResult<HttpResponse> {
    let q = query.into_inner();
    let page = PageRequest::from_params(q.page.as_deref(), q.limit.as_deref());

    let filter = PostFilter {
        search: q.search.filter(|s| !s.is_empty()),
        category_id: parse_id_param(q.category_id.as_deref(), "category_id")?,
        author_id: parse_id_param(q.author_id.as_deref(), "author_id")?,
    };

    let (posts, total) = state.posts.list(&filter, page.offset(), page.limit).await?;

    let response: Vec<PostResponse> = posts.into_iter().map(PostResponse::from).collect();

    Ok(HttpResponse::Ok().json(ApiResponse::new(
        "Posts retrieved successfully",
        Page::new(response, page, total),
    )))
}

/// GET /posts/{id}
pub async fn details(state: web::Data<AppState>, path: web::Path<i64>) -> AppResult<HttpResponse> {
    let post = state.posts.get(path.into_inner()).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::new(
        "Post retrieved successfully",
        PostResponse::from(post),
    )))
}

/// POST /posts - protected.
pub async fn create(
    identity: Identity,
    state: web::Data<AppState>,
    body: web::Json<CreatePostRequest>,
) -> AppResult<HttpResponse> {
    let mut req = body.into_inner();
    req.sanitize();

    state.validator.post_content(&req.title, &req.description)?;

    let post = state
        .posts
        .create(
            NewPost {
                title: req.title,
                description: req.description,
                category_id: req.category_id,
            },
            identity.user.id,
        )
        .await?;

    Ok(HttpResponse::Created().json(ApiResponse::new(
        "Successfully created post",
        PostResponse::from(post),
    )))
}

/// PATCH /posts/{id} - protected, author-only.
pub async fn update(
    identity: Identity,
    state: web::Data<AppState>,
    path: web::Path<i64>,
    body: web::Json<UpdatePostRequest>,
) -> AppResult<HttpResponse> {
    let mut req = body.into_inner();
    req.sanitize();

    state.validator.post_content(&req.title, &req.description)?;

    let post = state
        .posts
        .update(
            path.into_inner(),
            PostUpdate {
                title: req.title,
                description: req.description,
                category_id: req.category_id,
            },
            identity.user.id,
        )
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::new(
        "Post updated successfully",
        PostResponse::from(post),
    )))
}

/// DELETE /posts/{id} - protected, author-only.
pub async fn delete(
    identity: Identity,
    state: web::Data<AppState>,
    path: web::Path<i64>,
) -> AppResult<HttpResponse> {
    state
        .posts
        .delete(path.into_inner(), identity.user.id)
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::message_only("Post deleted successfully")))
}

/// GET /authors/{author_id}/posts - protected.
pub async fn by_author(
    _identity: Identity,
    state: web::Data<AppState>,
    path: web::Path<i64>,
    query: web::Query<PageQuery>,
) -> AppResult<HttpResponse> {
    let q = query.into_inner();
    let page = PageRequest::from_params(q.page.as_deref(), q.limit.as_deref());

    let (posts, total) = state
        .posts
        .list_by_author(path.into_inner(), page.offset(), page.limit)
        .await?;

    let response: Vec<PostResponse> = posts.into_iter().map(PostResponse::from).collect();

    Ok(HttpResponse::Ok().json(ApiResponse::new(
        "Posts retrieved successfully",
        Page::new(response, page, total),
    )))
}
