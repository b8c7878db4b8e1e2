//! Catalog product records.

use serde::{Deserialize, Serialize};

use crate::types::{Price, ProductId};

/// A product in the catalog.
///
/// `stock` is only ever changed by order placement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    /// Unit price in whole currency units.
    pub price: Price,
    /// Image URL or path, stored as given.
    pub image: String,
    pub description: String,
    pub stock: i32,
}

impl Product {
    /// Whether `quantity` units can be taken from current stock.
    #[must_use]
    pub const fn has_stock_for(&self, quantity: i32) -> bool {
        self.stock >= quantity
    }
}
