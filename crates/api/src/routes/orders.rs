//! Order handlers.

use axum::{
    Json,
    extract::{Path, State},
};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use teakspice_core::{Order, OrderId, OrderLine};

use super::parse_id;
use crate::error::{Result, add_breadcrumb};
use crate::middleware::{ApiJson, RequireAuth};
use crate::services::OrderService;
use crate::state::AppState;

/// Order placement payload.
#[derive(Debug, Deserialize)]
pub struct PlaceOrderRequest {
    #[serde(default)]
    pub address: String,
    pub items: Vec<OrderLine>,
}

/// Response to a successful placement.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceOrderResponse {
    pub success: bool,
    pub message: &'static str,
    pub order: Order,
    pub stock_updated: bool,
}

/// GET /api/orders
#[instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
    RequireAuth(user_id): RequireAuth,
) -> Result<Json<Vec<Order>>> {
    let orders = OrderService::new(state.pool(), state.catalog());
    Ok(Json(orders.list(user_id).await?))
}

/// GET /api/orders/{orderId}
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    RequireAuth(user_id): RequireAuth,
    Path(order_id): Path<String>,
) -> Result<Json<Order>> {
    let order_id: OrderId = parse_id(&order_id, "order")?;
    let orders = OrderService::new(state.pool(), state.catalog());
    Ok(Json(orders.get(user_id, order_id).await?))
}

/// POST /api/orders
#[instrument(skip(state, req))]
pub async fn place(
    State(state): State<AppState>,
    RequireAuth(user_id): RequireAuth,
    ApiJson(req): ApiJson<PlaceOrderRequest>,
) -> Result<Json<PlaceOrderResponse>> {
    let orders = OrderService::new(state.pool(), state.catalog());
    let order = orders
        .place_order(user_id, req.address.trim(), &req.items)
        .await?;

    let order_id = order.id.to_string();
    add_breadcrumb("orders", "Placed order", Some(&[("order_id", order_id.as_str())]));

    Ok(Json(PlaceOrderResponse {
        success: true,
        message: "Order placed successfully",
        order,
        stock_updated: true,
    }))
}
