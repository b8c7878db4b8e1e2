//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::ApiConfig;
use crate::services::{ProductCatalog, TokenSigner};

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like database connections and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: ApiConfig,
    pool: PgPool,
    catalog: ProductCatalog,
    tokens: TokenSigner,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Arguments
    ///
    /// * `config` - API configuration
    /// * `pool` - `PostgreSQL` connection pool
    #[must_use]
    pub fn new(config: ApiConfig, pool: PgPool) -> Self {
        let tokens = TokenSigner::new(&config.token);

        Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                catalog: ProductCatalog::default(),
                tokens,
            }),
        }
    }

    /// Get a reference to the API configuration.
    #[must_use]
    pub fn config(&self) -> &ApiConfig {
        &self.inner.config
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Get a reference to the cached product catalog.
    #[must_use]
    pub fn catalog(&self) -> &ProductCatalog {
        &self.inner.catalog
    }

    /// Get a reference to the bearer token signer.
    #[must_use]
    pub fn tokens(&self) -> &TokenSigner {
        &self.inner.tokens
    }
}
