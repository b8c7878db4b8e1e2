//! Order placement and order history.
//!
//! Placement runs in one transaction:
//!
//! 1. Merge repeated products and reject empty or non-positive requests.
//! 2. Lock the requested product rows in ID order.
//! 3. Price the order against the locked rows, collecting every shortfall.
//! 4. Insert the order and its item snapshot in `Processing`.
//! 5. Take stock with a conditional decrement per line.
//! 6. Clear the user's cart.
//!
//! Any failure rolls everything back, so an order never exists without its
//! stock having been taken. Two orders racing for the last units serialize on
//! the row locks; the second one sees the reduced stock and is refused.

use std::collections::HashMap;

use sqlx::PgPool;
use thiserror::Error;
use tracing::{info, instrument};

use teakspice_core::{
    CartOp, Order, OrderId, OrderLine, OrderValidationError, ProductId, UserId, coalesce_lines,
    price_order,
};

use crate::db::{OrderRepository, RepositoryError, carts, orders, products};

use super::catalog::ProductCatalog;

/// Errors from placing or reading orders.
#[derive(Debug, Error)]
pub enum OrderError {
    /// The request was refused before anything was written.
    #[error(transparent)]
    Validation(#[from] OrderValidationError),

    /// Stock moved between validation and decrement.
    #[error("stock changed for product {0}")]
    StockChanged(ProductId),

    /// The order does not exist or belongs to another user.
    #[error("order not found")]
    NotFound,

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

impl From<sqlx::Error> for OrderError {
    fn from(e: sqlx::Error) -> Self {
        Self::Repository(RepositoryError::Database(e))
    }
}

/// Order workflow service.
pub struct OrderService<'a> {
    pool: &'a PgPool,
    catalog: &'a ProductCatalog,
}

impl<'a> OrderService<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool, catalog: &'a ProductCatalog) -> Self {
        Self { pool, catalog }
    }

    /// Place an order for `user_id`.
    ///
    /// # Errors
    ///
    /// - `OrderError::Validation` for empty requests, bad quantities, unknown
    ///   products, or insufficient stock (nothing is written)
    /// - `OrderError::StockChanged` if a conditional decrement fails
    /// - `OrderError::Repository` for database failures
    #[instrument(skip(self, address, lines), fields(user_id = %user_id, lines = lines.len()))]
    pub async fn place_order(
        &self,
        user_id: UserId,
        address: &str,
        lines: &[OrderLine],
    ) -> Result<Order, OrderError> {
        let lines = coalesce_lines(lines)?;
        let mut ids: Vec<ProductId> = lines.iter().map(|line| line.product_id).collect();
        ids.sort_unstable();

        let mut tx = self.pool.begin().await?;

        let locked = products::lock_for_update(&mut *tx, &ids).await?;
        let catalog: HashMap<ProductId, _> = locked.into_iter().map(|p| (p.id, p)).collect();

        // Returning here drops `tx`, which rolls back and releases the locks.
        let priced = price_order(&lines, &catalog)?;

        let order = orders::insert(&mut *tx, user_id, address, &priced).await?;

        for item in &priced.items {
            if !products::decrement_stock(&mut *tx, item.product_id, item.quantity).await? {
                return Err(OrderError::StockChanged(item.product_id));
            }
        }

        carts::apply_op(&mut *tx, user_id, CartOp::Clear).await?;

        tx.commit().await?;
        self.catalog.invalidate().await;

        info!(order_id = %order.id, total = %order.total, "Order placed");
        Ok(order)
    }

    /// List the user's orders, newest first.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::Repository` if a query fails.
    pub async fn list(&self, user_id: UserId) -> Result<Vec<Order>, OrderError> {
        Ok(OrderRepository::new(self.pool)
            .list_for_user(user_id)
            .await?)
    }

    /// Get one of the user's orders.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::NotFound` if the order is absent or not theirs.
    pub async fn get(&self, user_id: UserId, order_id: OrderId) -> Result<Order, OrderError> {
        OrderRepository::new(self.pool)
            .get_for_user(user_id, order_id)
            .await?
            .ok_or(OrderError::NotFound)
    }
}
