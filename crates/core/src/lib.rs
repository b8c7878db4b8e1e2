//! Teakspice Core - Shared domain types and rules.
//!
//! This crate provides the types and business rules used across all Teakspice
//! components:
//! - `api` - The JSON HTTP API
//! - `cli` - Command-line tools for migrations and catalog seeding
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no database
//! access, no HTTP. The API crate persists what these rules decide, which keeps
//! the order and cart semantics testable without a database.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for IDs, prices, emails, and order status
//! - [`product`] - Catalog product records
//! - [`cart`] - Cart items and merge-on-add semantics
//! - [`wishlist`] - Wishlist set semantics
//! - [`order`] - Order records, pricing, and stock validation

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod order;
pub mod product;
pub mod types;
pub mod wishlist;

pub use cart::{Cart, CartError, CartItem, CartOp, QuantityUpdate};
pub use order::{
    Order, OrderItem, OrderLine, OrderValidationError, PricedOrder, StockShortfall,
    coalesce_lines, price_order,
};
pub use product::Product;
pub use types::*;
pub use wishlist::{Wishlist, WishlistOp};
