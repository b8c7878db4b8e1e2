//! Catalog handlers. Public; no token required.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
};
use tracing::instrument;

use teakspice_core::{Product, ProductId};

use super::parse_id;
use crate::error::{AppError, Result};
use crate::state::AppState;

/// List the whole catalog.
///
/// GET /api/products
#[instrument(skip(state))]
pub async fn index(State(state): State<AppState>) -> Result<Json<Arc<Vec<Product>>>> {
    let products = state.catalog().list(state.pool()).await?;
    Ok(Json(products))
}

/// Show one product.
///
/// GET /api/products/{productId}
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(product_id): Path<String>,
) -> Result<Json<Product>> {
    let product_id: ProductId = parse_id(&product_id, "product")?;

    state
        .catalog()
        .get(state.pool(), product_id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("Product not found".to_string()))
}
