//! Category handlers. Categories have no owner: creation and deletion only
//! require an authenticated caller, listing is public.

use actix_web::{HttpResponse, web};

use quill_core::pagination::{Page, PageRequest};
use quill_shared::ApiResponse;
use quill_shared::dto::{CategoryRequest, CategoryResponse};

use crate::handlers::posts::PageQuery;
use crate::middleware::auth::Identity;
use crate::middleware::error::AppResult;
use crate::state::AppState;

/// POST /categories - protected.
pub async fn add(
    _identity: Identity,
    state: web::Data<AppState>,
    body: web::Json<CategoryRequest>,
) -> AppResult<HttpResponse> {
    let mut req = body.into_inner();
    req.sanitize();

    state.validator.category_name(&req.name)?;

    let category = state.categories.add(req.name).await?;

    Ok(HttpResponse::Created().json(ApiResponse::new(
        "Category created successfully",
        CategoryResponse::from(category),
    )))
}

/// GET /categories?page=&limit=
pub async fn list(
    state: web::Data<AppState>,
    query: web::Query<PageQuery>,
) -> AppResult<HttpResponse> {
    let q = query.into_inner();
    let page = PageRequest::from_params(q.page.as_deref(), q.limit.as_deref());

    let (categories, total) = state.categories.list(page.offset(), page.limit).await?;

    let response: Vec<CategoryResponse> = categories
        .into_iter()
        .map(CategoryResponse::from)
        .collect();

    Ok(HttpResponse::Ok().json(ApiResponse::new(
        "Categories retrieved successfully",
        Page::new(response, page, total),
    )))
}

/// DELETE /categories/{id} - protected. Posts referencing the category
/// survive with the reference nulled by the store.
pub async fn delete(
    _identity: Identity,
    state: web::Data<AppState>,
    path: web::Path<i64>,
) -> AppResult<HttpResponse> {
    state.categories.delete(path.into_inner()).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::message_only("Category deleted successfully")))
}
