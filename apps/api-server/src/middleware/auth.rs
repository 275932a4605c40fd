//! Authentication gate.
//!
//! The [`Identity`] extractor protects a route by its mere presence in the
//! handler signature: it parses the `Authorization: Bearer <token>` header,
//! verifies the token, resolves the subject against the user store, and
//! short-circuits with 401 before the handler body runs on any failure.

use actix_web::{FromRequest, HttpRequest, dev::Payload, http::header, web};
use futures::future::LocalBoxFuture;

use quill_core::DomainError;
use quill_core::domain::User;
use quill_core::ports::{AuthError, TokenService};
use quill_shared::ErrorResponse;

use crate::state::AppState;

/// The authenticated user attached to a request.
///
/// ```ignore
/// async fn protected_route(identity: Identity) -> impl Responder {
///     format!("Hello, {}!", identity.user.name)
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Identity {
    pub user: User,
}

/// Error type for authentication failures.
///
/// Every variant answers the same undifferentiated 401; which one fired is
/// only visible in the server log.
#[derive(Debug)]
pub struct AuthenticationError(pub AuthError);

impl std::fmt::Display for AuthenticationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl actix_web::ResponseError for AuthenticationError {
    fn status_code(&self) -> actix_web::http::StatusCode {
        actix_web::http::StatusCode::UNAUTHORIZED
    }

    fn error_response(&self) -> actix_web::HttpResponse {
        tracing::debug!(reason = %self.0, "request rejected by authentication gate");
        actix_web::HttpResponse::Unauthorized().json(ErrorResponse::unauthorized())
    }
}

impl FromRequest for Identity {
    type Error = AuthenticationError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let req = req.clone();

        Box::pin(async move {
            let state = req.app_data::<web::Data<AppState>>().ok_or_else(|| {
                tracing::error!("AppState not found in app data");
                AuthenticationError(AuthError::InvalidToken(
                    "server configuration error".to_string(),
                ))
            })?;

            let auth_header = req
                .headers()
                .get(header::AUTHORIZATION)
                .ok_or(AuthenticationError(AuthError::MissingAuth))?;

            let auth_str = auth_header
                .to_str()
                .map_err(|_| AuthenticationError(AuthError::MalformedHeader))?;

            let token = auth_str
                .strip_prefix("Bearer ")
                .ok_or(AuthenticationError(AuthError::MalformedHeader))?;

            let claims = state.tokens.verify(token).map_err(AuthenticationError)?;

            // The token is only as good as the account it points at.
            let user = state
                .users
                .get(claims.user_id)
                .await
                .map_err(|e| match e {
                    DomainError::NotFound { .. } => {
                        AuthenticationError(AuthError::UnknownSubject)
                    }
                    other => {
                        tracing::error!(error = %other, "user lookup failed during authentication");
                        AuthenticationError(AuthError::UnknownSubject)
                    }
                })?;

            Ok(Identity { user })
        })
    }
}
