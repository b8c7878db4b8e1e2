//! Wishlist repository.
//!
//! Adds are `ON CONFLICT DO NOTHING`, so adding a product twice is harmless.

use sqlx::PgPool;

use teakspice_core::{ProductId, UserId, Wishlist, WishlistId, WishlistOp};

use super::{RepositoryError, classify_write_error};

/// Repository for wishlist database operations.
pub struct WishlistRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> WishlistRepository<'a> {
    /// Create a new wishlist repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get a user's wishlist, or an empty one if it was never written.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn get(&self, user_id: UserId) -> Result<Wishlist, RepositoryError> {
        let wishlist_id: Option<WishlistId> =
            sqlx::query_scalar(r"SELECT id FROM shop.wishlist WHERE user_id = $1")
                .bind(user_id)
                .fetch_optional(self.pool)
                .await?;

        let Some(wishlist_id) = wishlist_id else {
            return Ok(Wishlist::empty(user_id));
        };

        let product_ids: Vec<ProductId> = sqlx::query_scalar(
            r"
            SELECT product_id
            FROM shop.wishlist_item
            WHERE wishlist_id = $1
            ORDER BY position
            ",
        )
        .bind(wishlist_id)
        .fetch_all(self.pool)
        .await?;

        Ok(Wishlist {
            id: Some(wishlist_id),
            user_id,
            product_ids,
        })
    }

    /// Apply a mutation and return the resulting wishlist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if an added product does not exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn apply(&self, user_id: UserId, op: WishlistOp) -> Result<Wishlist, RepositoryError> {
        match op {
            WishlistOp::Add(product_id) => {
                sqlx::query(
                    r"
                    WITH wishlist AS (
                        INSERT INTO shop.wishlist (user_id)
                        VALUES ($1)
                        ON CONFLICT (user_id) DO UPDATE SET updated_at = now()
                        RETURNING id
                    )
                    INSERT INTO shop.wishlist_item (wishlist_id, product_id)
                    SELECT id, $2 FROM wishlist
                    ON CONFLICT (wishlist_id, product_id) DO NOTHING
                    ",
                )
                .bind(user_id)
                .bind(product_id)
                .execute(self.pool)
                .await
                .map_err(|e| classify_write_error(e, "wishlist entry already exists"))?;
            }
            WishlistOp::Remove(product_id) => {
                sqlx::query(
                    r"
                    DELETE FROM shop.wishlist_item wi
                    USING shop.wishlist w
                    WHERE wi.wishlist_id = w.id AND w.user_id = $1 AND wi.product_id = $2
                    ",
                )
                .bind(user_id)
                .bind(product_id)
                .execute(self.pool)
                .await?;
            }
        }

        self.get(user_id).await
    }
}
