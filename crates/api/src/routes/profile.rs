//! The caller's own profile.

use axum::{Json, extract::State};
use serde::Deserialize;
use tracing::instrument;

use teakspice_core::Email;

use crate::error::Result;
use crate::middleware::{ApiJson, RequireAuth};
use crate::models::{ProfileUpdate, User};
use crate::services::auth::{AuthError, AuthService};
use crate::state::AppState;

/// Profile changes. Missing or blank fields are left as they are.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
}

impl TryFrom<UpdateProfileRequest> for ProfileUpdate {
    type Error = AuthError;

    fn try_from(req: UpdateProfileRequest) -> std::result::Result<Self, Self::Error> {
        let email = non_blank(req.email)
            .map(|e| Email::parse(&e))
            .transpose()?;

        Ok(Self {
            name: non_blank(req.name),
            email,
            phone: non_blank(req.phone),
        })
    }
}

/// GET /api/user/profile
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    RequireAuth(user_id): RequireAuth,
) -> Result<Json<User>> {
    let auth = AuthService::new(state.pool(), state.tokens());
    Ok(Json(auth.get_user(user_id).await?))
}

/// PUT /api/user/profile
#[instrument(skip(state, req))]
pub async fn update(
    State(state): State<AppState>,
    RequireAuth(user_id): RequireAuth,
    ApiJson(req): ApiJson<UpdateProfileRequest>,
) -> Result<Json<User>> {
    let update = ProfileUpdate::try_from(req)?;
    let auth = AuthService::new(state.pool(), state.tokens());
    Ok(Json(auth.update_profile(user_id, &update).await?))
}
