//! Order repository.
//!
//! Orders are written once, inside the placement transaction, and read back
//! per owner. A lookup for an order owned by someone else behaves exactly
//! like a lookup for an order that does not exist.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgPool};

use teakspice_core::{Order, OrderId, OrderItem, OrderStatus, Price, PricedOrder, ProductId, UserId};

use super::RepositoryError;

#[derive(sqlx::FromRow)]
struct OrderRow {
    id: OrderId,
    user_id: UserId,
    address: String,
    total: Price,
    status: OrderStatus,
    created_at: DateTime<Utc>,
}

impl OrderRow {
    fn into_order(self, items: Vec<OrderItem>) -> Order {
        Order {
            id: self.id,
            user_id: self.user_id,
            address: self.address,
            items,
            total: self.total,
            date: self.created_at,
            status: self.status,
        }
    }
}

#[derive(sqlx::FromRow)]
struct OrderItemRow {
    order_id: OrderId,
    product_id: ProductId,
    quantity: i32,
    unit_price: Price,
}

impl From<OrderItemRow> for OrderItem {
    fn from(row: OrderItemRow) -> Self {
        Self {
            product_id: row.product_id,
            quantity: row.quantity,
            unit_price: row.unit_price,
        }
    }
}

/// Repository for reading placed orders.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List a user's orders, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn list_for_user(&self, user_id: UserId) -> Result<Vec<Order>, RepositoryError> {
        let rows = sqlx::query_as::<_, OrderRow>(
            r"
            SELECT id, user_id, address, total, status, created_at
            FROM shop.order
            WHERE user_id = $1
            ORDER BY created_at DESC, id DESC
            ",
        )
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;

        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<i32> = rows.iter().map(|r| r.id.as_i32()).collect();
        let item_rows = sqlx::query_as::<_, OrderItemRow>(
            r"
            SELECT order_id, product_id, quantity, unit_price
            FROM shop.order_item
            WHERE order_id = ANY($1)
            ORDER BY order_id, line_no
            ",
        )
        .bind(ids)
        .fetch_all(self.pool)
        .await?;

        let mut items_by_order: HashMap<OrderId, Vec<OrderItem>> = HashMap::new();
        for row in item_rows {
            items_by_order
                .entry(row.order_id)
                .or_default()
                .push(row.into());
        }

        Ok(rows
            .into_iter()
            .map(|row| {
                let items = items_by_order.remove(&row.id).unwrap_or_default();
                row.into_order(items)
            })
            .collect())
    }

    /// Get one of a user's orders.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn get_for_user(
        &self,
        user_id: UserId,
        order_id: OrderId,
    ) -> Result<Option<Order>, RepositoryError> {
        let row = sqlx::query_as::<_, OrderRow>(
            r"
            SELECT id, user_id, address, total, status, created_at
            FROM shop.order
            WHERE id = $1 AND user_id = $2
            ",
        )
        .bind(order_id)
        .bind(user_id)
        .fetch_optional(self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let items = sqlx::query_as::<_, OrderItemRow>(
            r"
            SELECT order_id, product_id, quantity, unit_price
            FROM shop.order_item
            WHERE order_id = $1
            ORDER BY line_no
            ",
        )
        .bind(order_id)
        .fetch_all(self.pool)
        .await?;

        Ok(Some(
            row.into_order(items.into_iter().map(OrderItem::from).collect()),
        ))
    }
}

/// Insert a priced order and its item snapshot.
///
/// The order starts in [`OrderStatus::Processing`].
///
/// # Errors
///
/// Returns `RepositoryError::Database` if a query fails.
pub async fn insert(
    conn: &mut PgConnection,
    user_id: UserId,
    address: &str,
    priced: &PricedOrder,
) -> Result<Order, RepositoryError> {
    let row = sqlx::query_as::<_, OrderRow>(
        r"
        INSERT INTO shop.order (user_id, address, total, status)
        VALUES ($1, $2, $3, $4)
        RETURNING id, user_id, address, total, status, created_at
        ",
    )
    .bind(user_id)
    .bind(address)
    .bind(priced.total)
    .bind(OrderStatus::Processing)
    .fetch_one(&mut *conn)
    .await?;

    for (line_no, item) in (1_i32..).zip(&priced.items) {
        sqlx::query(
            r"
            INSERT INTO shop.order_item (order_id, line_no, product_id, quantity, unit_price)
            VALUES ($1, $2, $3, $4, $5)
            ",
        )
        .bind(row.id)
        .bind(line_no)
        .bind(item.product_id)
        .bind(item.quantity)
        .bind(item.unit_price)
        .execute(&mut *conn)
        .await?;
    }

    Ok(row.into_order(priced.items.clone()))
}
