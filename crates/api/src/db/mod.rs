//! Database operations for the shop `PostgreSQL` database.
//!
//! ## Tables (schema `shop`)
//!
//! - `user` / `user_password` - Accounts and their Argon2 hashes
//! - `product` - Catalog with stock levels
//! - `cart` / `cart_item` - One cart per user, one line per product
//! - `wishlist` / `wishlist_item` - One wishlist per user, one row per product
//! - `order` / `order_item` - Placed orders and their item snapshots
//!
//! # Migrations
//!
//! Migrations are stored in `crates/api/migrations/` and run via:
//! ```bash
//! cargo run -p teakspice-cli -- migrate
//! ```

pub mod carts;
pub mod orders;
pub mod products;
pub mod users;
pub mod wishlists;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use carts::CartRepository;
pub use orders::OrderRepository;
pub use products::ProductRepository;
pub use users::UserRepository;
pub use wishlists::WishlistRepository;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested or referenced entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique email).
    #[error("constraint violation: {0}")]
    Conflict(String),

    /// A written value does not fit its column (e.g., a merged quantity past
    /// `INTEGER`).
    #[error("value out of range: {0}")]
    OutOfRange(String),
}

/// SQLSTATE `numeric_value_out_of_range`.
const NUMERIC_VALUE_OUT_OF_RANGE: &str = "22003";

/// Classify a failed write: unique violations become `Conflict`, foreign-key
/// violations become `NotFound` (the referenced row does not exist), numeric
/// overflow becomes `OutOfRange`.
pub(crate) fn classify_write_error(e: sqlx::Error, conflict: &str) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = e {
        if db_err.is_unique_violation() {
            return RepositoryError::Conflict(conflict.to_owned());
        }
        if db_err.is_foreign_key_violation() {
            return RepositoryError::NotFound;
        }
        if db_err.code().as_deref() == Some(NUMERIC_VALUE_OUT_OF_RANGE) {
            return RepositoryError::OutOfRange(db_err.message().to_owned());
        }
    }
    RepositoryError::Database(e)
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established within the
/// 10 second acquire deadline.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_errors_stay_database_errors() {
        let err = classify_write_error(sqlx::Error::RowNotFound, "duplicate");
        assert!(matches!(err, RepositoryError::Database(sqlx::Error::RowNotFound)));
    }
}
