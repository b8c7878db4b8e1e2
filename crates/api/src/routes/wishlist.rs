//! Wishlist handlers.

use axum::{
    Json,
    extract::{Path, State},
};
use serde::Deserialize;
use tracing::instrument;

use teakspice_core::{ProductId, Wishlist, WishlistOp};

use super::parse_id;
use crate::db::{RepositoryError, WishlistRepository};
use crate::error::{AppError, Result};
use crate::middleware::{ApiJson, RequireAuth};
use crate::state::AppState;

/// Add-to-wishlist payload.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddRequest {
    pub product_id: ProductId,
}

/// GET /api/wishlist
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    RequireAuth(user_id): RequireAuth,
) -> Result<Json<Wishlist>> {
    Ok(Json(WishlistRepository::new(state.pool()).get(user_id).await?))
}

/// POST /api/wishlist
///
/// Adding a product that is already listed returns the wishlist unchanged.
#[instrument(skip(state))]
pub async fn add(
    State(state): State<AppState>,
    RequireAuth(user_id): RequireAuth,
    ApiJson(req): ApiJson<AddRequest>,
) -> Result<Json<Wishlist>> {
    let wishlist = WishlistRepository::new(state.pool())
        .apply(user_id, WishlistOp::Add(req.product_id))
        .await
        .map_err(|e| match e {
            RepositoryError::NotFound => AppError::NotFound("Product not found".to_string()),
            other => other.into(),
        })?;

    Ok(Json(wishlist))
}

/// DELETE /api/wishlist/{productId}
#[instrument(skip(state))]
pub async fn remove(
    State(state): State<AppState>,
    RequireAuth(user_id): RequireAuth,
    Path(product_id): Path<String>,
) -> Result<Json<Wishlist>> {
    let product_id: ProductId = parse_id(&product_id, "product")?;

    Ok(Json(
        WishlistRepository::new(state.pool())
            .apply(user_id, WishlistOp::Remove(product_id))
            .await?,
    ))
}
