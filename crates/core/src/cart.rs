//! Cart items and cart mutation rules.
//!
//! A user has at most one cart. Adding a product that is already present
//! merges into the existing line, so a cart never holds two lines for the
//! same product. Setting a quantity to zero or below removes the line.
//!
//! The API persists each [`CartOp`] as a single conditional statement.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::{CartId, ProductId, UserId};

/// Errors from constructing cart lines.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CartError {
    /// Quantities added to a cart must be positive.
    #[error("quantity must be greater than zero (got {0})")]
    NonPositiveQuantity(i32),
}

/// One line of a cart: a product and how many of it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub product_id: ProductId,
    pub quantity: i32,
}

impl CartItem {
    /// Build a cart line, rejecting non-positive quantities.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::NonPositiveQuantity`] if `quantity <= 0`.
    pub const fn new(product_id: ProductId, quantity: i32) -> Result<Self, CartError> {
        if quantity <= 0 {
            return Err(CartError::NonPositiveQuantity(quantity));
        }
        Ok(Self {
            product_id,
            quantity,
        })
    }
}

/// What a quantity update does to an existing line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuantityUpdate {
    /// Replace the line's quantity.
    Set(i32),
    /// Drop the line.
    Remove,
}

impl QuantityUpdate {
    /// Interpret a requested quantity: positive sets it, anything else removes.
    #[must_use]
    pub const fn from_requested(quantity: i32) -> Self {
        if quantity > 0 {
            Self::Set(quantity)
        } else {
            Self::Remove
        }
    }
}

/// A single mutation of a user's cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CartOp {
    /// Add quantity, merging with an existing line for the same product.
    Add(CartItem),
    /// Change or drop the line for a product. No-op if absent.
    Update {
        product_id: ProductId,
        update: QuantityUpdate,
    },
    /// Drop the line for a product. No-op if absent.
    Remove(ProductId),
    /// Drop every line.
    Clear,
}

/// A user's cart.
///
/// `id` is `None` until the first write creates the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<CartId>,
    pub user_id: UserId,
    pub items: Vec<CartItem>,
}

impl Cart {
    /// A cart that has never been written.
    #[must_use]
    pub const fn empty(user_id: UserId) -> Self {
        Self {
            id: None,
            user_id,
            items: Vec::new(),
        }
    }
}
