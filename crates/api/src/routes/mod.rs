//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET    /health                    - Liveness
//! GET    /health/ready              - Readiness (database reachable)
//!
//! # Auth (rate limited)
//! POST   /api/register              - Create an account
//! POST   /api/login                 - Get a bearer token
//!
//! # Catalog
//! GET    /api/products              - Product listing
//! GET    /api/products/{productId}  - Product detail
//!
//! # Requires `Authorization: Bearer <token>`
//! GET    /api/user/profile          - Own profile
//! PUT    /api/user/profile          - Update own profile
//! GET    /api/cart                  - Cart
//! POST   /api/cart                  - Add item (merges with an existing line)
//! PUT    /api/cart/{productId}      - Set quantity (<= 0 removes)
//! DELETE /api/cart/{productId}      - Remove item
//! POST   /api/cart/clear            - Empty the cart
//! GET    /api/wishlist              - Wishlist
//! POST   /api/wishlist              - Add product (idempotent)
//! DELETE /api/wishlist/{productId}  - Remove product
//! GET    /api/orders                - Own orders, newest first
//! POST   /api/orders                - Place an order
//! GET    /api/orders/{orderId}      - One own order
//! ```

pub mod auth;
pub mod cart;
pub mod orders;
pub mod products;
pub mod profile;
pub mod wishlist;

use std::str::FromStr;

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    routing::{get, post, put},
};

use crate::error::{AppError, Result};
use crate::middleware::auth_rate_limiter;
use crate::state::AppState;

/// Parse a numeric ID taken from a path segment.
fn parse_id<T: FromStr>(raw: &str, what: &str) -> Result<T> {
    raw.parse()
        .map_err(|_| AppError::BadRequest(format!("invalid {what} id: {raw}")))
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Returns 503 Service Unavailable if the database is not reachable.
async fn readiness(State(state): State<AppState>) -> StatusCode {
    match sqlx::query("SELECT 1").fetch_one(state.pool()).await {
        Ok(_) => StatusCode::OK,
        Err(_) => StatusCode::SERVICE_UNAVAILABLE,
    }
}

/// Create the auth routes router.
///
/// `trust_proxy_headers` lets the rate limiter key on `X-Forwarded-For`.
pub fn auth_routes(trust_proxy_headers: bool) -> Router<AppState> {
    Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route_layer(auth_rate_limiter(trust_proxy_headers))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show).post(cart::add))
        .route("/clear", post(cart::clear))
        .route("/{productId}", put(cart::update).delete(cart::remove))
}

/// Create the wishlist routes router.
pub fn wishlist_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(wishlist::show).post(wishlist::add))
        .route("/{productId}", axum::routing::delete(wishlist::remove))
}

/// Create the order routes router.
pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(orders::index).post(orders::place))
        .route("/{orderId}", get(orders::show))
}

/// Create all API routes.
pub fn routes(trust_proxy_headers: bool) -> Router<AppState> {
    let api = Router::new()
        .merge(auth_routes(trust_proxy_headers))
        .route("/products", get(products::index))
        .route("/products/{productId}", get(products::show))
        .route("/user/profile", get(profile::show).put(profile::update))
        .nest("/cart", cart_routes())
        .nest("/wishlist", wishlist_routes())
        .nest("/orders", order_routes());

    Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .nest("/api", api)
}
