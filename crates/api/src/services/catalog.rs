//! Read-only catalog access with a short-lived product list cache.
//!
//! The list is cached for 30 seconds and dropped whenever an order changes
//! stock levels.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use sqlx::PgPool;
use tracing::{debug, instrument};

use teakspice_core::{Product, ProductId};

use crate::db::{ProductRepository, RepositoryError};

const ALL_PRODUCTS_KEY: &str = "products:all";

/// Cached view of the product catalog.
#[derive(Clone)]
pub struct ProductCatalog {
    cache: Cache<&'static str, Arc<Vec<Product>>>,
}

impl Default for ProductCatalog {
    fn default() -> Self {
        Self::new(Duration::from_secs(30))
    }
}

impl ProductCatalog {
    /// Create a catalog whose cached list lives for `ttl`.
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        let cache = Cache::builder().max_capacity(16).time_to_live(ttl).build();
        Self { cache }
    }

    /// List every product, ordered by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the list has to be loaded and
    /// the query fails.
    #[instrument(skip(self, pool))]
    pub async fn list(&self, pool: &PgPool) -> Result<Arc<Vec<Product>>, RepositoryError> {
        if let Some(products) = self.cache.get(ALL_PRODUCTS_KEY).await {
            debug!("Cache hit for products");
            return Ok(products);
        }

        let products = Arc::new(ProductRepository::new(pool).list_all().await?);
        self.cache
            .insert(ALL_PRODUCTS_KEY, Arc::clone(&products))
            .await;

        Ok(products)
    }

    /// Get a single product, bypassing the cache.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(
        &self,
        pool: &PgPool,
        id: ProductId,
    ) -> Result<Option<Product>, RepositoryError> {
        ProductRepository::new(pool).get_by_id(id).await
    }

    /// Drop the cached list so the next read sees current stock.
    pub async fn invalidate(&self) {
        self.cache.invalidate(ALL_PRODUCTS_KEY).await;
    }
}
