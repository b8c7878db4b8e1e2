//! Cart handlers.
//!
//! Every mutation returns the resulting cart except clear, which answers
//! `{"status": "cleared"}`.

use axum::{
    Json,
    extract::{Path, State},
};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use teakspice_core::{Cart, CartItem, CartOp, ProductId, QuantityUpdate};

use super::parse_id;
use crate::db::{CartRepository, RepositoryError};
use crate::error::{AppError, Result, add_breadcrumb};
use crate::middleware::{ApiJson, RequireAuth};
use crate::state::AppState;

/// Add-to-cart payload.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddItemRequest {
    pub product_id: ProductId,
    pub quantity: i32,
}

/// Quantity change payload. Zero or below removes the line.
#[derive(Debug, Deserialize)]
pub struct UpdateItemRequest {
    pub quantity: i32,
}

/// Response to clearing the cart.
#[derive(Debug, Serialize)]
pub struct ClearedResponse {
    pub status: &'static str,
}

fn add_error(e: RepositoryError) -> AppError {
    match e {
        RepositoryError::NotFound => AppError::NotFound("Product not found".to_string()),
        RepositoryError::OutOfRange(_) => {
            AppError::BadRequest("cart quantity is too large".to_string())
        }
        other => other.into(),
    }
}

/// GET /api/cart
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    RequireAuth(user_id): RequireAuth,
) -> Result<Json<Cart>> {
    Ok(Json(CartRepository::new(state.pool()).get(user_id).await?))
}

/// POST /api/cart
#[instrument(skip(state))]
pub async fn add(
    State(state): State<AppState>,
    RequireAuth(user_id): RequireAuth,
    ApiJson(req): ApiJson<AddItemRequest>,
) -> Result<Json<Cart>> {
    let item = CartItem::new(req.product_id, req.quantity)
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let cart = CartRepository::new(state.pool())
        .apply(user_id, CartOp::Add(item))
        .await
        .map_err(add_error)?;

    let product_id = item.product_id.to_string();
    add_breadcrumb("cart", "Added item", Some(&[("product_id", product_id.as_str())]));
    Ok(Json(cart))
}

/// PUT /api/cart/{productId}
#[instrument(skip(state))]
pub async fn update(
    State(state): State<AppState>,
    RequireAuth(user_id): RequireAuth,
    Path(product_id): Path<String>,
    ApiJson(req): ApiJson<UpdateItemRequest>,
) -> Result<Json<Cart>> {
    let product_id: ProductId = parse_id(&product_id, "product")?;
    let op = CartOp::Update {
        product_id,
        update: QuantityUpdate::from_requested(req.quantity),
    };

    Ok(Json(
        CartRepository::new(state.pool()).apply(user_id, op).await?,
    ))
}

/// DELETE /api/cart/{productId}
#[instrument(skip(state))]
pub async fn remove(
    State(state): State<AppState>,
    RequireAuth(user_id): RequireAuth,
    Path(product_id): Path<String>,
) -> Result<Json<Cart>> {
    let product_id: ProductId = parse_id(&product_id, "product")?;

    Ok(Json(
        CartRepository::new(state.pool())
            .apply(user_id, CartOp::Remove(product_id))
            .await?,
    ))
}

/// POST /api/cart/clear
#[instrument(skip(state))]
pub async fn clear(
    State(state): State<AppState>,
    RequireAuth(user_id): RequireAuth,
) -> Result<Json<ClearedResponse>> {
    CartRepository::new(state.pool())
        .apply(user_id, CartOp::Clear)
        .await?;

    Ok(Json(ClearedResponse { status: "cleared" }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_errors_name_the_problem() {
        let overflow = add_error(RepositoryError::OutOfRange("integer out of range".into()));
        assert!(
            matches!(overflow, AppError::BadRequest(ref msg) if msg == "cart quantity is too large")
        );

        let missing = add_error(RepositoryError::NotFound);
        assert!(matches!(missing, AppError::NotFound(ref msg) if msg == "Product not found"));
    }
}
