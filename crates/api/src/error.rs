//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures errors to Sentry before
//! responding to the client. All route handlers return `Result<T, AppError>`.
//!
//! Every error body is JSON: `{"error": "<message>"}`. An order refused for
//! stock additionally lists each shortfall.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use teakspice_core::OrderValidationError;

use crate::db::RepositoryError;
use crate::services::auth::AuthError;
use crate::services::orders::OrderError;

/// Application-level error type for the API.
#[derive(Debug, Error)]
pub enum AppError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Authentication operation failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Order workflow refused or failed.
    #[error("Order error: {0}")]
    Order(#[from] OrderError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// User is not authenticated.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),
}

impl AppError {
    const fn is_server_error(&self) -> bool {
        matches!(
            self,
            Self::Database(RepositoryError::Database(_) | RepositoryError::DataCorruption(_))
                | Self::Auth(
                    AuthError::Repository(_) | AuthError::PasswordHash | AuthError::Token(_)
                )
                | Self::Order(OrderError::Repository(_))
        )
    }

    fn status(&self) -> StatusCode {
        if self.is_server_error() {
            return StatusCode::INTERNAL_SERVER_ERROR;
        }

        match self {
            Self::Database(RepositoryError::NotFound) | Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Database(RepositoryError::Conflict(_)) => StatusCode::CONFLICT,
            Self::Auth(err) => match err {
                AuthError::InvalidCredentials => StatusCode::UNAUTHORIZED,
                AuthError::UserNotFound => StatusCode::NOT_FOUND,
                AuthError::UserAlreadyExists => StatusCode::CONFLICT,
                _ => StatusCode::BAD_REQUEST,
            },
            Self::Order(err) => match err {
                OrderError::Validation(OrderValidationError::InsufficientStock(_))
                | OrderError::StockChanged(_) => StatusCode::CONFLICT,
                OrderError::NotFound => StatusCode::NOT_FOUND,
                _ => StatusCode::BAD_REQUEST,
            },
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            _ => StatusCode::BAD_REQUEST,
        }
    }

    /// Client-facing message. Never includes internal details.
    fn message(&self) -> String {
        if self.is_server_error() {
            return "Internal server error".to_string();
        }

        match self {
            Self::Database(RepositoryError::NotFound) => "Not found".to_string(),
            Self::Database(RepositoryError::Conflict(msg) | RepositoryError::OutOfRange(msg)) => {
                msg.clone()
            }
            Self::Auth(err) => match err {
                AuthError::InvalidEmail(_) => "Invalid email address".to_string(),
                AuthError::WeakPassword(msg) => msg.clone(),
                AuthError::UserNotFound => "User not found".to_string(),
                other => other.to_string(),
            },
            Self::Order(OrderError::StockChanged(_)) => "Insufficient stock".to_string(),
            Self::Order(OrderError::NotFound) => "Order not found".to_string(),
            Self::Order(err) => err.to_string(),
            Self::NotFound(msg) | Self::Unauthorized(msg) | Self::BadRequest(msg) => msg.clone(),
            other => other.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Capture server errors to Sentry
        if self.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let status = self.status();
        let message = self.message();

        let body = match &self {
            Self::Order(OrderError::Validation(OrderValidationError::InsufficientStock(
                shortfalls,
            ))) => {
                let details: Vec<String> = shortfalls.iter().map(ToString::to_string).collect();
                json!({ "error": message, "details": details, "shortfalls": shortfalls })
            }
            _ => json!({ "error": message }),
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context from a user ID.
///
/// Called after successful authentication to associate errors with users.
pub fn set_sentry_user(user_id: &impl ToString) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            ..Default::default()
        }));
    });
}

/// Add a breadcrumb for user actions.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of user actions
/// leading up to an error.
///
/// # Example
///
/// ```rust,ignore
/// add_breadcrumb("cart", "Added item", Some(&[("product_id", "123")]));
/// ```
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    if let Some(pairs) = data {
        for (key, value) in pairs {
            breadcrumb.data.insert(
                (*key).to_string(),
                serde_json::Value::String((*value).to_string()),
            );
        }
    }

    sentry::add_breadcrumb(breadcrumb);
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use teakspice_core::{ProductId, StockShortfall};

    fn get_status(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    async fn body_json(err: AppError) -> serde_json::Value {
        let response = err.into_response();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn test_app_error_display() {
        let err = AppError::NotFound("product-123".to_string());
        assert_eq!(err.to_string(), "Not found: product-123");

        let err = AppError::BadRequest("invalid input".to_string());
        assert_eq!(err.to_string(), "Bad request: invalid input");
    }

    #[test]
    fn test_app_error_status_codes() {
        assert_eq!(
            get_status(AppError::NotFound("test".to_string())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(AppError::Unauthorized("test".to_string())),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            get_status(AppError::BadRequest("test".to_string())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(AppError::Database(RepositoryError::DataCorruption(
                "bad row".to_string()
            ))),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            get_status(AppError::Auth(AuthError::UserAlreadyExists)),
            StatusCode::CONFLICT
        );
        assert_eq!(
            get_status(AppError::Database(RepositoryError::NotFound)),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(AppError::Database(RepositoryError::OutOfRange(
                "integer out of range".to_string()
            ))),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_order_error_status_codes() {
        assert_eq!(
            get_status(OrderError::Validation(OrderValidationError::Empty).into()),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(
                OrderError::Validation(OrderValidationError::ProductNotFound(ProductId::new(3)))
                    .into()
            ),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(OrderError::NotFound.into()),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(OrderError::StockChanged(ProductId::new(1)).into()),
            StatusCode::CONFLICT
        );
    }

    #[tokio::test]
    async fn test_login_failures_share_one_message() {
        let json = body_json(AuthError::InvalidCredentials.into()).await;
        assert_eq!(json, json!({ "error": "Invalid credentials" }));
    }

    #[tokio::test]
    async fn test_product_not_found_message() {
        let err: AppError =
            OrderError::Validation(OrderValidationError::ProductNotFound(ProductId::new(42)))
                .into();
        assert_eq!(body_json(err).await["error"], "Product not found: 42");
    }

    #[tokio::test]
    async fn test_insufficient_stock_body() {
        let err: AppError = OrderError::Validation(OrderValidationError::InsufficientStock(vec![
            StockShortfall {
                product_id: ProductId::new(1),
                name: "X".to_string(),
                requested: 10,
                available: 5,
            },
        ]))
        .into();

        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json["error"], "Insufficient stock");
        assert_eq!(json["details"][0], "X: requested 10, only 5 available");
        assert_eq!(json["shortfalls"][0]["available"], 5);
    }

    #[tokio::test]
    async fn test_overflow_is_reported_to_client() {
        let err = AppError::Database(RepositoryError::OutOfRange(
            "integer out of range".to_string(),
        ));
        assert_eq!(
            body_json(err).await,
            json!({ "error": "integer out of range" })
        );
    }

    #[tokio::test]
    async fn test_internal_details_are_hidden() {
        let err = AppError::Database(RepositoryError::DataCorruption("secret detail".into()));
        assert_eq!(
            body_json(err).await,
            json!({ "error": "Internal server error" })
        );
    }
}
