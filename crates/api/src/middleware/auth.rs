//! Bearer token authentication extractor.
//!
//! Handlers that take [`RequireAuth`] only run for requests carrying
//! `Authorization: Bearer <token>` with a valid, unexpired token. Anything
//! else is answered with 401 before the handler body runs.

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use tracing::debug;

use teakspice_core::UserId;

use crate::error::{AppError, set_sentry_user};
use crate::state::AppState;

/// Extractor that requires a valid bearer token.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(RequireAuth(user_id): RequireAuth) -> impl IntoResponse {
///     format!("Hello, user {user_id}!")
/// }
/// ```
#[derive(Debug, Clone, Copy)]
pub struct RequireAuth(pub UserId);

/// Pull the token out of an `Authorization` header value.
fn bearer_token(value: &str) -> Option<&str> {
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

impl FromRequestParts<AppState> for RequireAuth {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(bearer_token)
            .ok_or_else(|| AppError::Unauthorized("missing token".to_string()))?;

        let user_id = state.tokens().verify(token).map_err(|e| {
            debug!(error = %e, "Rejected bearer token");
            AppError::Unauthorized("invalid token".to_string())
        })?;

        set_sentry_user(&user_id);
        Ok(Self(user_id))
    }
}
