//! # API Error
//!
//! What the cashier UI sees when a request fails.
//!
//! ## Wire Format
//! ```json
//! { "error": "Insufficient stock for product 7: available 5, requested 9", "code": "INSUFFICIENT_STOCK" }
//! ```
//!
//! ## Status Mapping
//! | Source | Status | Code |
//! |---|---|---|
//! | malformed JSON / query string | 400 | `BAD_REQUEST` |
//! | `ValidationError` | 400 | `VALIDATION_ERROR` |
//! | `ProductNotFound` | 400 | `PRODUCT_NOT_FOUND` |
//! | `InsufficientStock` | 400 | `INSUFFICIENT_STOCK` |
//! | `InvalidExpiry` | 400 | `INVALID_EXPIRY` |
//! | `PaymentMismatch` | 400 | `PAYMENT_MISMATCH` |
//! | `AmountOverflow` | 400 | `AMOUNT_OVERFLOW` |
//! | `SaleNotFound` | 404 | `SALE_NOT_FOUND` |
//! | any `DbError` | 500 | `INTERNAL_ERROR` |
//!
//! Storage failures are logged with full detail; the client only gets a
//! generic message.

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use tracing::error;

use pharmapos_core::{CoreError, ValidationError};
use pharmapos_db::ServiceError;

/// Result type for handlers.
pub type ApiResult<T> = Result<Json<T>, ApiError>;

/// An HTTP error response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    pub status: StatusCode,
    pub code: &'static str,
    pub message: String,
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
    code: &'a str,
}

impl ApiError {
    pub fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "BAD_REQUEST", message)
    }

    pub fn internal() -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "INTERNAL_ERROR",
            "Internal server error",
        )
    }

    /// Like `From<ServiceError>`, but a missing product is a 404 because
    /// it is the resource the URL names.
    pub fn lookup(err: ServiceError) -> Self {
        let mut api = Self::from(err);
        if api.code == "PRODUCT_NOT_FOUND" {
            api.status = StatusCode::NOT_FOUND;
        }
        api
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        let (status, code) = match &err {
            CoreError::Validation(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            CoreError::ProductNotFound(_) => (StatusCode::BAD_REQUEST, "PRODUCT_NOT_FOUND"),
            CoreError::InsufficientStock { .. } => (StatusCode::BAD_REQUEST, "INSUFFICIENT_STOCK"),
            CoreError::InvalidExpiry { .. } => (StatusCode::BAD_REQUEST, "INVALID_EXPIRY"),
            CoreError::PaymentMismatch { .. } => (StatusCode::BAD_REQUEST, "PAYMENT_MISMATCH"),
            CoreError::AmountOverflow { .. } => (StatusCode::BAD_REQUEST, "AMOUNT_OVERFLOW"),
            CoreError::SaleNotFound(_) => (StatusCode::NOT_FOUND, "SALE_NOT_FOUND"),
        };
        Self::new(status, code, err.to_string())
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        CoreError::from(err).into()
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Domain(core) => core.into(),
            ServiceError::Storage(db) => {
                error!(error = %db, "Storage failure");
                Self::internal()
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: &self.message,
            code: self.code,
        };
        (self.status, Json(body)).into_response()
    }
}
