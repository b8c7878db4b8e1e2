//! Wishlist set semantics.
//!
//! A wishlist is an insertion-ordered set of product IDs. Adding a product
//! that is already present is a no-op, not an error. The API persists each
//! [`WishlistOp`] as a single statement.

use serde::{Deserialize, Serialize};

use crate::types::{ProductId, UserId, WishlistId};

/// A single mutation of a user's wishlist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WishlistOp {
    Add(ProductId),
    Remove(ProductId),
}

/// A user's wishlist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Wishlist {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<WishlistId>,
    pub user_id: UserId,
    pub product_ids: Vec<ProductId>,
}

impl Wishlist {
    /// A wishlist that has never been written.
    #[must_use]
    pub const fn empty(user_id: UserId) -> Self {
        Self {
            id: None,
            user_id,
            product_ids: Vec::new(),
        }
    }
}
