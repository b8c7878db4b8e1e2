//! JSON extractor whose rejections use the API's error body.
//!
//! `axum::Json` answers malformed input with plain-text 400/415/422
//! responses. Every route here takes [`ApiJson`] instead, so a bad payload is
//! always a 400 with `{"error": "..."}`.

use axum::extract::{FromRequest, rejection::JsonRejection};

use crate::error::AppError;

/// `Json<T>` with rejections mapped to [`AppError::BadRequest`].
#[derive(Debug, Clone, Copy, Default, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct ApiJson<T>(pub T);

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use axum::{
        Router,
        body::Body,
        http::{Request, StatusCode, header::CONTENT_TYPE},
        routing::post,
    };
    use serde::Deserialize;
    use tower::ServiceExt;

    #[derive(Deserialize)]
    struct Payload {
        quantity: i32,
    }

    fn app() -> Router {
        Router::new().route(
            "/",
            post(|ApiJson(p): ApiJson<Payload>| async move { p.quantity.to_string() }),
        )
    }

    async fn post_json(body: &'static str) -> (StatusCode, serde_json::Value) {
        let response = app()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/")
                    .header(CONTENT_TYPE, "application/json")
                    .body(Body::from(body))
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap_or_default())
    }

    #[tokio::test]
    async fn test_syntax_error_is_bad_request() {
        let (status, body) = post_json("{not json").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn test_missing_field_is_bad_request() {
        let (status, _) = post_json("{}").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_wrong_type_is_bad_request() {
        let (status, _) = post_json(r#"{"quantity":"two"}"#).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_valid_payload_passes_through() {
        let response = app()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/")
                    .header(CONTENT_TYPE, "application/json")
                    .body(Body::from(r#"{"quantity":3}"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
