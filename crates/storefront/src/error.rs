//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures errors to Sentry before
//! responding to the client. All route handlers return `Result<T, AppError>`.
//!
//! Errors render as JSON:
//!
//! ```json
//! { "error": "...", "retryable": false, "fields": [{ "field": "...", "message": "..." }] }
//! ```

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::backend::BackendError;
use crate::cart::CartError;
use crate::catalog::CatalogError;
use crate::checkout::CheckoutError;
use crate::validation::{FieldError, ValidationErrors};

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// One or more form fields failed validation.
    #[error(transparent)]
    Validation(#[from] ValidationErrors),

    #[error(transparent)]
    Cart(#[from] CartError),

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// Checkout precondition or wizard rule violated.
    #[error(transparent)]
    Checkout(#[from] CheckoutError),

    /// Mock backend call failed.
    #[error(transparent)]
    Backend(#[from] BackendError),

    /// Session store read or write failed.
    #[error("Session error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),
}

#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    error: String,
    retryable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    fields: Option<&'a [FieldError]>,
}

impl AppError {
    /// HTTP status for this error.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) | Self::Cart(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Catalog(err) => match err {
                CatalogError::UnknownProduct(_) => StatusCode::NOT_FOUND,
                _ => StatusCode::UNPROCESSABLE_ENTITY,
            },
            Self::Checkout(_) => StatusCode::CONFLICT,
            Self::Backend(err) => match err {
                BackendError::Unavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
                BackendError::ProductNotFound(_) | BackendError::OrderNotFound(_) => {
                    StatusCode::NOT_FOUND
                }
                BackendError::PromoNotFound(_)
                | BackendError::PromoMinimumNotMet { .. }
                | BackendError::UndeliverableAddress(_) => StatusCode::UNPROCESSABLE_ENTITY,
                BackendError::ReturnRejected(_) => StatusCode::CONFLICT,
            },
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Session(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Whether the client should offer a "try again" action.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Backend(err) if err.is_retryable())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Capture server errors to Sentry
        if status.is_server_error() && !self.is_retryable() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        } else if self.is_retryable() {
            tracing::warn!(error = %self, "Backend unavailable");
        }

        // Don't expose internal error details to clients
        let message = match &self {
            Self::Session(_) => "Internal server error".to_string(),
            _ => self.to_string(),
        };
        let fields = match &self {
            Self::Validation(errors) => Some(errors.errors.as_slice()),
            _ => None,
        };

        let body = ErrorBody {
            error: message,
            retryable: self.is_retryable(),
            fields,
        };
        (status, Json(body)).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Add a breadcrumb for user actions.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of user actions
/// leading up to an error.
///
/// # Example
///
/// ```rust,ignore
/// add_breadcrumb("cart", "Added item", Some(&[("product_id", "bond-primer")]));
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
    use axum::body::to_bytes;
    use paintshop_core::{OrderId, ProductId};

    use super::*;

    fn session_error(message: &str) -> AppError {
        AppError::Session(tower_sessions::session::Error::Store(
            tower_sessions::session_store::Error::Backend(message.to_string()),
        ))
    }

    async fn body_json(err: AppError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[test]
    fn test_app_error_display() {
        let err = AppError::NotFound("product-123".to_string());
        assert_eq!(err.to_string(), "Not found: product-123");

        let err = AppError::from(CartError::InvalidQuantity);
        assert_eq!(err.to_string(), "quantity must be at least 1");
    }

    #[test]
    fn test_app_error_status_codes() {
        assert_eq!(
            AppError::from(ValidationErrors::default()).status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            AppError::from(CheckoutError::EmptyCart).status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            AppError::from(BackendError::Unavailable {
                operation: "order submission"
            })
            .status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            AppError::from(BackendError::OrderNotFound(OrderId::new("PS-1"))).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::from(CatalogError::UnknownProduct(ProductId::new("x"))).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::BadRequest("test".to_string()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            session_error("memory store").status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn test_validation_body_lists_fields() {
        let mut errors = ValidationErrors::default();
        errors.add("email", "is required");

        let (status, body) = body_json(AppError::from(errors)).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["retryable"], false);
        assert_eq!(body["fields"][0]["field"], "email");
        assert_eq!(body["fields"][0]["message"], "is required");
    }

    #[tokio::test]
    async fn test_unavailable_is_retryable() {
        let (status, body) = body_json(AppError::from(BackendError::Unavailable {
            operation: "order submission",
        }))
        .await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["retryable"], true);
        assert!(body.get("fields").is_none());
    }

    #[tokio::test]
    async fn test_internal_details_hidden() {
        let (_, body) = body_json(session_error("store at 10.0.0.4 refused")).await;
        assert_eq!(body["error"], "Internal server error");
    }
}
