//! Business logic services.
//!
//! # Services
//!
//! - `auth` - Registration, login, bearer tokens, and profiles
//! - `catalog` - Cached product listing
//! - `orders` - Transactional order placement and order history

pub mod auth;
pub mod catalog;
pub mod orders;

pub use auth::{AuthError, AuthService, TokenError, TokenSigner};
pub use catalog::ProductCatalog;
pub use orders::{OrderError, OrderService};
