//! Order records and the validation that runs before an order is placed.
//!
//! Placing an order is decided here and persisted by the API:
//!
//! 1. [`coalesce_lines`] rejects empty requests and non-positive quantities and
//!    merges repeated products into one line.
//! 2. [`price_order`] checks every line against the catalog. A missing product
//!    fails the whole request immediately. Insufficient stock does not stop
//!    the scan; every shortfall is collected so the caller sees all of them.
//! 3. If validation passes, the result carries the item snapshot (with unit
//!    prices as of now) and the total.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::product::Product;
use crate::types::{OrderId, OrderStatus, Price, ProductId, UserId};

/// A requested order line: which product and how many.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLine {
    pub product_id: ProductId,
    pub quantity: i32,
}

/// A line of a placed order, with the unit price it was sold at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub product_id: ProductId,
    pub quantity: i32,
    pub unit_price: Price,
}

/// A placed order.
///
/// Only `status` may change after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    pub user_id: UserId,
    /// Free-text delivery address.
    pub address: String,
    pub items: Vec<OrderItem>,
    pub total: Price,
    /// Creation timestamp.
    pub date: DateTime<Utc>,
    pub status: OrderStatus,
}

/// A product that cannot cover the requested quantity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockShortfall {
    pub product_id: ProductId,
    pub name: String,
    pub requested: i32,
    pub available: i32,
}

impl std::fmt::Display for StockShortfall {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}: requested {}, only {} available",
            self.name, self.requested, self.available
        )
    }
}

/// Why an order request was refused before anything was written.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OrderValidationError {
    #[error("order must contain at least one item")]
    Empty,

    #[error("invalid quantity {quantity} for product {product_id}")]
    InvalidQuantity {
        product_id: ProductId,
        quantity: i32,
    },

    #[error("Product not found: {0}")]
    ProductNotFound(ProductId),

    #[error("Insufficient stock")]
    InsufficientStock(Vec<StockShortfall>),

    #[error("order total is too large")]
    TotalOverflow,
}

/// A validated order: snapshot lines and their total.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PricedOrder {
    pub items: Vec<OrderItem>,
    pub total: Price,
}

/// Validate quantities and merge repeated products.
///
/// Lines keep the position of the product's first appearance.
///
/// # Errors
///
/// [`OrderValidationError::Empty`] for no lines,
/// [`OrderValidationError::InvalidQuantity`] for any quantity `<= 0`, and
/// [`OrderValidationError::TotalOverflow`] if merged quantities overflow.
pub fn coalesce_lines(lines: &[OrderLine]) -> Result<Vec<OrderLine>, OrderValidationError> {
    if lines.is_empty() {
        return Err(OrderValidationError::Empty);
    }

    let mut merged: Vec<OrderLine> = Vec::with_capacity(lines.len());
    for line in lines {
        if line.quantity <= 0 {
            return Err(OrderValidationError::InvalidQuantity {
                product_id: line.product_id,
                quantity: line.quantity,
            });
        }
        match merged.iter_mut().find(|m| m.product_id == line.product_id) {
            Some(existing) => {
                existing.quantity = existing
                    .quantity
                    .checked_add(line.quantity)
                    .ok_or(OrderValidationError::TotalOverflow)?;
            }
            None => merged.push(*line),
        }
    }

    Ok(merged)
}

/// Check requested lines against current catalog state and price them.
///
/// `catalog` must contain every product that exists among the requested IDs;
/// absent keys are treated as missing products.
///
/// # Errors
///
/// - [`OrderValidationError::ProductNotFound`] on the first unknown product
/// - [`OrderValidationError::InsufficientStock`] with every shortfall found
/// - [`OrderValidationError::TotalOverflow`] if the total does not fit
pub fn price_order<S: std::hash::BuildHasher>(
    lines: &[OrderLine],
    catalog: &HashMap<ProductId, Product, S>,
) -> Result<PricedOrder, OrderValidationError> {
    let mut items = Vec::with_capacity(lines.len());
    let mut shortfalls = Vec::new();
    let mut total = Price::ZERO;

    for line in lines {
        let product = catalog
            .get(&line.product_id)
            .ok_or(OrderValidationError::ProductNotFound(line.product_id))?;

        if !product.has_stock_for(line.quantity) {
            shortfalls.push(StockShortfall {
                product_id: product.id,
                name: product.name.clone(),
                requested: line.quantity,
                available: product.stock,
            });
            continue;
        }

        let line_total = product
            .price
            .times(line.quantity)
            .ok_or(OrderValidationError::TotalOverflow)?;
        total = total
            .checked_add(line_total)
            .ok_or(OrderValidationError::TotalOverflow)?;

        items.push(OrderItem {
            product_id: product.id,
            quantity: line.quantity,
            unit_price: product.price,
        });
    }

    if !shortfalls.is_empty() {
        return Err(OrderValidationError::InsufficientStock(shortfalls));
    }

    Ok(PricedOrder { items, total })
}
