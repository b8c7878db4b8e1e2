//! Teakspice shop API library.
//!
//! This crate provides the HTTP API as a library, allowing it to be tested
//! and reused. [`app`] builds the complete router with its middleware stack.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;

use axum::{
    Router,
    body::Body,
    http::{HeaderValue, Method, Request, header},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{Span, info_span};

use state::AppState;

/// Build a CORS layer for one allowed browser origin.
///
/// Returns `None` (and logs) if the origin is not a valid header value.
fn cors_layer(origin: &str) -> Option<CorsLayer> {
    let origin = match HeaderValue::from_str(origin) {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!(error = %e, origin, "Ignoring invalid CORS origin");
            return None;
        }
    };

    Some(
        CorsLayer::new()
            .allow_origin(origin)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::ORIGIN, header::CONTENT_TYPE, header::AUTHORIZATION])
            .allow_credentials(true),
    )
}

fn make_span<B>(request: &Request<B>) -> Span {
    info_span!(
        "request",
        method = %request.method(),
        uri = %request.uri(),
        request_id = tracing::field::Empty,
    )
}

/// Build the application router with all middleware applied.
pub fn app(state: AppState) -> Router {
    let cors = state.config().cors_origin.as_deref().and_then(cors_layer);
    let trust_proxy_headers = state.config().trust_proxy_headers;

    let mut router = routes::routes(trust_proxy_headers)
        .with_state(state)
        .layer(axum::middleware::from_fn(
            middleware::request_id_middleware,
        ))
        .layer(TraceLayer::new_for_http().make_span_with(make_span::<Body>));

    if let Some(cors) = cors {
        router = router.layer(cors);
    }

    router
        // Sentry layers (outermost for full request coverage)
        .layer(sentry_tower::NewSentryLayer::new_from_top())
        .layer(sentry_tower::SentryHttpLayer::new().enable_transaction())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::net::SocketAddr;

    use axum::extract::ConnectInfo;
    use axum::http::{StatusCode, header::AUTHORIZATION};
    use chrono::Duration;
    use secrecy::SecretString;
    use sqlx::postgres::PgPoolOptions;
    use tower::ServiceExt;

    use crate::config::{ApiConfig, TokenConfig};

    const SECRET: &str = "q7Vx2LmP9sKd4RtY8wZb3NcF6hJgA1eU";

    fn config(cors_origin: Option<&str>, trust_proxy_headers: bool) -> ApiConfig {
        ApiConfig {
            database_url: SecretString::from("postgres://localhost/teakspice_test".to_owned()),
            host: "127.0.0.1".parse().unwrap(),
            port: 8080,
            cors_origin: cors_origin.map(str::to_owned),
            token: TokenConfig {
                secret: SecretString::from(SECRET.to_owned()),
                ttl: Duration::hours(24),
            },
            trust_proxy_headers,
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 1.0,
        }
    }

    /// A router whose pool never connects. Only paths that are answered
    /// before touching the database can be exercised.
    fn test_app(cors_origin: Option<&str>) -> Router {
        app_with(config(cors_origin, false))
    }

    fn app_with(config: ApiConfig) -> Router {
        let pool = PgPoolOptions::new()
            .connect_lazy("postgres://localhost/teakspice_test")
            .unwrap();
        app(AppState::new(config, pool))
    }

    /// Attach the peer address `axum::serve` records for each connection.
    fn from_peer(mut request: Request<Body>, peer: &str) -> Request<Body> {
        request
            .extensions_mut()
            .insert(ConnectInfo(peer.parse::<SocketAddr>().unwrap()));
        request
    }

    fn malformed_login(forwarded_for: &str) -> Request<Body> {
        let request = Request::builder()
            .method("POST")
            .uri("/api/login")
            .header(header::CONTENT_TYPE, "application/json")
            .header("x-forwarded-for", forwarded_for)
            .body(Body::from("{\"email\":"))
            .unwrap();
        from_peer(request, "198.51.100.20:52000")
    }

    async fn send(app: Router, request: Request<Body>) -> (StatusCode, serde_json::Value) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap_or_default())
    }

    #[tokio::test]
    async fn test_health() {
        let response = test_app(None)
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key("x-request-id"));
    }

    #[tokio::test]
    async fn test_protected_routes_require_token() {
        let cases = [
            ("GET", "/api/user/profile"),
            ("PUT", "/api/user/profile"),
            ("GET", "/api/cart"),
            ("POST", "/api/cart"),
            ("PUT", "/api/cart/1"),
            ("DELETE", "/api/cart/1"),
            ("POST", "/api/cart/clear"),
            ("GET", "/api/wishlist"),
            ("POST", "/api/wishlist"),
            ("DELETE", "/api/wishlist/1"),
            ("GET", "/api/orders"),
            ("POST", "/api/orders"),
            ("GET", "/api/orders/1"),
        ];

        for (method, uri) in cases {
            let request = Request::builder()
                .method(method)
                .uri(uri)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from("{}"))
                .unwrap();

            let (status, body) = send(test_app(None), request).await;
            assert_eq!(status, StatusCode::UNAUTHORIZED, "{method} {uri}");
            assert_eq!(body["error"], "missing token", "{method} {uri}");
        }
    }

    #[tokio::test]
    async fn test_invalid_and_expired_tokens_rejected() {
        let signer = services::TokenSigner::new(&config(None, false).token);
        let expired = signer
            .issue_at(
                teakspice_core::UserId::new(1),
                chrono::Utc::now() - Duration::hours(25),
            )
            .unwrap();

        for token in ["garbage", expired.as_str()] {
            let request = Request::builder()
                .uri("/api/cart")
                .header(AUTHORIZATION, format!("Bearer {token}"))
                .body(Body::empty())
                .unwrap();

            let (status, body) = send(test_app(None), request).await;
            assert_eq!(status, StatusCode::UNAUTHORIZED);
            assert_eq!(body["error"], "invalid token");
        }
    }

    #[tokio::test]
    async fn test_malformed_login_is_bad_request() {
        let (status, body) = send(test_app(None), malformed_login("203.0.113.9")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn test_rotating_forwarded_for_shares_peer_bucket() {
        let app = test_app(None);
        let mut statuses = Vec::new();
        for i in 0..8 {
            let request = malformed_login(&format!("203.0.113.{i}"));
            statuses.push(send(app.clone(), request).await.0);
        }

        assert!(statuses[..5].iter().all(|s| *s == StatusCode::BAD_REQUEST));
        assert!(statuses[5..].iter().all(|s| *s == StatusCode::TOO_MANY_REQUESTS));
    }

    #[tokio::test]
    async fn test_forwarded_for_picks_bucket_when_trusted() {
        let app = app_with(config(None, true));
        for i in 0..8 {
            let request = malformed_login(&format!("203.0.113.{i}"));
            let (status, _) = send(app.clone(), request).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "request {i}");
        }
    }

    #[tokio::test]
    async fn test_short_password_rejected_before_database() {
        let request = Request::builder()
            .method("POST")
            .uri("/api/register")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(
                r#"{"name":"A","email":"a@example.com","phone":"","password":"short"}"#,
            ))
            .unwrap();

        let (status, body) = send(test_app(None), from_peer(request, "198.51.100.21:52000")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "password must be at least 8 characters");
    }

    #[tokio::test]
    async fn test_bad_path_id_is_bad_request() {
        let signer = services::TokenSigner::new(&config(None, false).token);
        let token = signer.issue(teakspice_core::UserId::new(1)).unwrap();

        let request = Request::builder()
            .method("DELETE")
            .uri("/api/wishlist/not-a-number")
            .header(AUTHORIZATION, format!("Bearer {token}"))
            .body(Body::empty())
            .unwrap();

        let (status, body) = send(test_app(None), request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "invalid product id: not-a-number");
    }

    #[tokio::test]
    async fn test_cors_preflight_allows_configured_origin() {
        let request = Request::builder()
            .method("OPTIONS")
            .uri("/api/products")
            .header(header::ORIGIN, "https://shop.example.com")
            .header(header::ACCESS_CONTROL_REQUEST_METHOD, "GET")
            .body(Body::empty())
            .unwrap();

        let response = test_app(Some("https://shop.example.com"))
            .oneshot(request)
            .await
            .unwrap();

        assert_eq!(
            response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
            "https://shop.example.com"
        );
        assert_eq!(
            response.headers()[header::ACCESS_CONTROL_ALLOW_CREDENTIALS],
            "true"
        );
    }
}
