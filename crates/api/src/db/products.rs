//! Product repository.
//!
//! Reads serve the catalog endpoints; the locking reads and stock decrement
//! are only used inside the order-placement transaction.

use sqlx::{PgConnection, PgPool};

use teakspice_core::{Price, Product, ProductId};

use super::RepositoryError;

#[derive(sqlx::FromRow)]
struct ProductRow {
    id: ProductId,
    name: String,
    price: Price,
    image: String,
    description: String,
    stock: i32,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            price: row.price,
            image: row.image,
            description: row.description,
            stock: row.stock,
        }
    }
}

/// A catalog entry as loaded by the seeding tool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProduct {
    pub name: String,
    pub price: Price,
    pub image: String,
    pub description: String,
    pub stock: i32,
}

/// Repository for product database operations.
pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List every product, ordered by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_all(&self) -> Result<Vec<Product>, RepositoryError> {
        let rows = sqlx::query_as::<_, ProductRow>(
            r"
            SELECT id, name, price, image, description, stock
            FROM shop.product
            ORDER BY id
            ",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Product::from).collect())
    }

    /// Get a product by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(
            r"
            SELECT id, name, price, image, description, stock
            FROM shop.product
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Product::from))
    }

    /// Insert a product, or overwrite the one with the same name.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn upsert_by_name(&self, product: &NewProduct) -> Result<Product, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(
            r"
            INSERT INTO shop.product (name, price, image, description, stock)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (name) DO UPDATE
            SET price = EXCLUDED.price,
                image = EXCLUDED.image,
                description = EXCLUDED.description,
                stock = EXCLUDED.stock
            RETURNING id, name, price, image, description, stock
            ",
        )
        .bind(&product.name)
        .bind(product.price)
        .bind(&product.image)
        .bind(&product.description)
        .bind(product.stock)
        .fetch_one(self.pool)
        .await?;

        Ok(row.into())
    }

    /// Delete every product that no order references.
    ///
    /// Returns the number of rows removed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete_unreferenced(&self) -> Result<u64, RepositoryError> {
        let result = sqlx::query(
            r"
            DELETE FROM shop.product p
            WHERE NOT EXISTS (SELECT 1 FROM shop.order_item oi WHERE oi.product_id = p.id)
            ",
        )
        .execute(self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    /// Count products and total units in stock.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn stock_summary(&self) -> Result<(i64, i64), RepositoryError> {
        let (count, units): (i64, Option<i64>) =
            sqlx::query_as(r"SELECT COUNT(*), SUM(stock)::BIGINT FROM shop.product")
                .fetch_one(self.pool)
                .await?;

        Ok((count, units.unwrap_or(0)))
    }
}

/// Lock the given products for the rest of the transaction.
///
/// Rows are locked in ascending ID order so concurrent orders over
/// overlapping products never deadlock. IDs with no product are simply
/// absent from the result.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn lock_for_update(
    conn: &mut PgConnection,
    ids: &[ProductId],
) -> Result<Vec<Product>, RepositoryError> {
    let ids: Vec<i32> = ids.iter().map(ProductId::as_i32).collect();

    let rows = sqlx::query_as::<_, ProductRow>(
        r"
        SELECT id, name, price, image, description, stock
        FROM shop.product
        WHERE id = ANY($1)
        ORDER BY id
        FOR UPDATE
        ",
    )
    .bind(ids)
    .fetch_all(conn)
    .await?;

    Ok(rows.into_iter().map(Product::from).collect())
}

/// Take `quantity` units from a product's stock.
///
/// Returns `false` without changing anything if the product no longer has
/// enough units.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn decrement_stock(
    conn: &mut PgConnection,
    id: ProductId,
    quantity: i32,
) -> Result<bool, RepositoryError> {
    let result = sqlx::query(
        r"
        UPDATE shop.product
        SET stock = stock - $2
        WHERE id = $1 AND stock >= $2
        ",
    )
    .bind(id)
    .bind(quantity)
    .execute(conn)
    .await?;

    Ok(result.rows_affected() == 1)
}
