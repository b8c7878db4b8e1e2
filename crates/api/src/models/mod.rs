//! API-side domain models.
//!
//! Catalog, cart, wishlist and order types live in `teakspice_core`; only the
//! user record is specific to this crate.

pub mod user;

pub use user::{ProfileUpdate, User};
