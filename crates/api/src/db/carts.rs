//! Cart repository.
//!
//! Each [`CartOp`] is persisted as one SQL statement, so two requests for the
//! same user can never overwrite each other's changes. The cart row itself is
//! created by the first add.

use sqlx::{PgConnection, PgPool};

use teakspice_core::{Cart, CartId, CartItem, CartOp, ProductId, QuantityUpdate, UserId};

use super::{RepositoryError, classify_write_error};

#[derive(sqlx::FromRow)]
struct CartItemRow {
    product_id: ProductId,
    quantity: i32,
}

impl From<CartItemRow> for CartItem {
    fn from(row: CartItemRow) -> Self {
        Self {
            product_id: row.product_id,
            quantity: row.quantity,
        }
    }
}

/// Repository for cart database operations.
pub struct CartRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CartRepository<'a> {
    /// Create a new cart repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get a user's cart, or an empty one if it was never written.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn get(&self, user_id: UserId) -> Result<Cart, RepositoryError> {
        let cart_id: Option<CartId> =
            sqlx::query_scalar(r"SELECT id FROM shop.cart WHERE user_id = $1")
                .bind(user_id)
                .fetch_optional(self.pool)
                .await?;

        let Some(cart_id) = cart_id else {
            return Ok(Cart::empty(user_id));
        };

        let items = sqlx::query_as::<_, CartItemRow>(
            r"
            SELECT product_id, quantity
            FROM shop.cart_item
            WHERE cart_id = $1
            ORDER BY position
            ",
        )
        .bind(cart_id)
        .fetch_all(self.pool)
        .await?;

        Ok(Cart {
            id: Some(cart_id),
            user_id,
            items: items.into_iter().map(CartItem::from).collect(),
        })
    }

    /// Apply a mutation and return the resulting cart.
    ///
    /// Updates and removals of products not in the cart change nothing.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if an added product does not exist.
    /// Returns `RepositoryError::OutOfRange` if a merged quantity overflows.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn apply(&self, user_id: UserId, op: CartOp) -> Result<Cart, RepositoryError> {
        let mut conn = self.pool.acquire().await?;
        apply_op(&mut *conn, user_id, op).await?;
        self.get(user_id).await
    }
}

/// Run a single cart mutation on an existing connection or transaction.
///
/// # Errors
///
/// Returns `RepositoryError::NotFound` if an added product does not exist.
/// Returns `RepositoryError::OutOfRange` if a merged quantity overflows.
/// Returns `RepositoryError::Database` for other database errors.
pub async fn apply_op(
    conn: &mut PgConnection,
    user_id: UserId,
    op: CartOp,
) -> Result<(), RepositoryError> {
    match op {
        CartOp::Add(item) => {
            sqlx::query(
                r"
                WITH cart AS (
                    INSERT INTO shop.cart (user_id)
                    VALUES ($1)
                    ON CONFLICT (user_id) DO UPDATE SET updated_at = now()
                    RETURNING id
                )
                INSERT INTO shop.cart_item (cart_id, product_id, quantity)
                SELECT id, $2, $3 FROM cart
                ON CONFLICT (cart_id, product_id)
                DO UPDATE SET quantity = shop.cart_item.quantity + EXCLUDED.quantity
                ",
            )
            .bind(user_id)
            .bind(item.product_id)
            .bind(item.quantity)
            .execute(conn)
            .await
            .map_err(|e| classify_write_error(e, "cart line already exists"))?;
        }
        CartOp::Update {
            product_id,
            update: QuantityUpdate::Set(quantity),
        } => {
            sqlx::query(
                r"
                UPDATE shop.cart_item ci
                SET quantity = $3
                FROM shop.cart c
                WHERE ci.cart_id = c.id AND c.user_id = $1 AND ci.product_id = $2
                ",
            )
            .bind(user_id)
            .bind(product_id)
            .bind(quantity)
            .execute(conn)
            .await?;
        }
        CartOp::Update {
            product_id,
            update: QuantityUpdate::Remove,
        }
        | CartOp::Remove(product_id) => {
            sqlx::query(
                r"
                DELETE FROM shop.cart_item ci
                USING shop.cart c
                WHERE ci.cart_id = c.id AND c.user_id = $1 AND ci.product_id = $2
                ",
            )
            .bind(user_id)
            .bind(product_id)
            .execute(conn)
            .await?;
        }
        CartOp::Clear => {
            sqlx::query(
                r"
                DELETE FROM shop.cart_item ci
                USING shop.cart c
                WHERE ci.cart_id = c.id AND c.user_id = $1
                ",
            )
            .bind(user_id)
            .execute(conn)
            .await?;
        }
    }

    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::db::fixtures;

    fn add(product_id: ProductId, quantity: i32) -> CartOp {
        CartOp::Add(CartItem::new(product_id, quantity).unwrap())
    }

    fn quantities(cart: &Cart) -> Vec<(ProductId, i32)> {
        cart.items.iter().map(|i| (i.product_id, i.quantity)).collect()
    }

    #[sqlx::test]
    async fn test_unwritten_cart_is_empty(pool: PgPool) {
        let user = fixtures::user(&pool, "a@example.com").await;

        let cart = CartRepository::new(&pool).get(user).await.unwrap();
        assert_eq!(cart, Cart::empty(user));
    }

    #[sqlx::test]
    async fn test_add_merges_and_keeps_first_position(pool: PgPool) {
        let user = fixtures::user(&pool, "a@example.com").await;
        let tray = fixtures::product(&pool, "Tray", 10).await;
        let pods = fixtures::product(&pool, "Pods", 10).await;
        let repo = CartRepository::new(&pool);

        repo.apply(user, add(tray, 2)).await.unwrap();
        repo.apply(user, add(pods, 1)).await.unwrap();
        let cart = repo.apply(user, add(tray, 3)).await.unwrap();

        assert!(cart.id.is_some());
        assert_eq!(quantities(&cart), vec![(tray, 5), (pods, 1)]);
    }

    #[sqlx::test]
    async fn test_update_sets_or_removes(pool: PgPool) {
        let user = fixtures::user(&pool, "a@example.com").await;
        let tray = fixtures::product(&pool, "Tray", 10).await;
        let pods = fixtures::product(&pool, "Pods", 10).await;
        let repo = CartRepository::new(&pool);
        repo.apply(user, add(tray, 2)).await.unwrap();
        repo.apply(user, add(pods, 2)).await.unwrap();

        let set = CartOp::Update {
            product_id: tray,
            update: QuantityUpdate::from_requested(7),
        };
        let cart = repo.apply(user, set).await.unwrap();
        assert_eq!(quantities(&cart), vec![(tray, 7), (pods, 2)]);

        for requested in [0, -1] {
            let op = CartOp::Update {
                product_id: tray,
                update: QuantityUpdate::from_requested(requested),
            };
            let cart = repo.apply(user, op).await.unwrap();
            assert_eq!(quantities(&cart), vec![(pods, 2)]);
        }
    }

    #[sqlx::test]
    async fn test_update_of_missing_line_is_noop(pool: PgPool) {
        let user = fixtures::user(&pool, "a@example.com").await;
        let tray = fixtures::product(&pool, "Tray", 10).await;
        let pods = fixtures::product(&pool, "Pods", 10).await;
        let repo = CartRepository::new(&pool);
        repo.apply(user, add(tray, 2)).await.unwrap();

        let op = CartOp::Update {
            product_id: pods,
            update: QuantityUpdate::Set(4),
        };
        let cart = repo.apply(user, op).await.unwrap();
        assert_eq!(quantities(&cart), vec![(tray, 2)]);
    }

    #[sqlx::test]
    async fn test_remove_and_clear(pool: PgPool) {
        let user = fixtures::user(&pool, "a@example.com").await;
        let tray = fixtures::product(&pool, "Tray", 10).await;
        let pods = fixtures::product(&pool, "Pods", 10).await;
        let repo = CartRepository::new(&pool);
        repo.apply(user, add(tray, 2)).await.unwrap();
        repo.apply(user, add(pods, 1)).await.unwrap();

        let cart = repo.apply(user, CartOp::Remove(tray)).await.unwrap();
        assert_eq!(quantities(&cart), vec![(pods, 1)]);

        let cart = repo.apply(user, CartOp::Clear).await.unwrap();
        assert!(cart.items.is_empty());
        assert!(cart.id.is_some());
    }

    #[sqlx::test]
    async fn test_carts_are_per_user(pool: PgPool) {
        let alice = fixtures::user(&pool, "alice@example.com").await;
        let bob = fixtures::user(&pool, "bob@example.com").await;
        let tray = fixtures::product(&pool, "Tray", 10).await;
        let repo = CartRepository::new(&pool);

        repo.apply(alice, add(tray, 2)).await.unwrap();
        repo.apply(bob, CartOp::Clear).await.unwrap();

        let cart = repo.get(alice).await.unwrap();
        assert_eq!(quantities(&cart), vec![(tray, 2)]);
    }

    #[sqlx::test]
    async fn test_adding_unknown_product_is_not_found(pool: PgPool) {
        let user = fixtures::user(&pool, "a@example.com").await;
        let repo = CartRepository::new(&pool);

        let err = repo
            .apply(user, add(ProductId::new(999_999), 1))
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::NotFound));
        assert_eq!(repo.get(user).await.unwrap(), Cart::empty(user));
    }

    #[sqlx::test]
    async fn test_merged_quantity_overflow_is_out_of_range(pool: PgPool) {
        let user = fixtures::user(&pool, "a@example.com").await;
        let tray = fixtures::product(&pool, "Tray", 10).await;
        let repo = CartRepository::new(&pool);
        repo.apply(user, add(tray, 2_147_483_000)).await.unwrap();

        let err = repo.apply(user, add(tray, 1000)).await.unwrap_err();
        assert!(matches!(err, RepositoryError::OutOfRange(_)), "{err:?}");

        let cart = repo.get(user).await.unwrap();
        assert_eq!(quantities(&cart), vec![(tray, 2_147_483_000)]);
    }
}
