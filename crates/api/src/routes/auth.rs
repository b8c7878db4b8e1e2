//! Registration and login handlers.

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::error::Result;
use crate::middleware::ApiJson;
use crate::models::User;
use crate::services::auth::{AuthService, Registration};
use crate::state::AppState;

// =============================================================================
// Request Types
// =============================================================================

/// Registration payload.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: String,
    pub password: String,
}

/// Login payload.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Successful login: the user and their bearer token.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub user: User,
    pub token: String,
}

// =============================================================================
// Handlers
// =============================================================================

/// Create an account.
///
/// POST /api/register
#[instrument(skip(state, req))]
pub async fn register(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<RegisterRequest>,
) -> Result<Json<User>> {
    let auth = AuthService::new(state.pool(), state.tokens());

    let user = auth
        .register(&Registration {
            name: &req.name,
            email: &req.email,
            phone: &req.phone,
            password: &req.password,
        })
        .await?;

    tracing::info!(user_id = %user.id, "User registered");
    Ok(Json(user))
}

/// Exchange email and password for a bearer token.
///
/// POST /api/login
#[instrument(skip(state, req))]
pub async fn login(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<LoginRequest>,
) -> Result<Json<LoginResponse>> {
    let auth = AuthService::new(state.pool(), state.tokens());

    let (user, token) = auth.login(&req.email, &req.password).await?;

    tracing::info!(user_id = %user.id, "User logged in");
    Ok(Json(LoginResponse { user, token }))
}
