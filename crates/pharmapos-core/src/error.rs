//! # Error Types
//!
//! Domain-specific error types for pharmapos-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  pharmapos-core errors (this file)                                     │
//! │  ├── CoreError        - Business rule rejections                       │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  pharmapos-db errors (separate crate)                                  │
//! │  ├── DbError          - Database operation failures                    │
//! │  └── ServiceError     - CoreError | DbError, returned by services      │
//! │                                                                         │
//! │  HTTP errors (in api-server)                                           │
//! │  └── ApiError         - What the cashier UI sees (serialized)          │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → ServiceError → ApiError → UI      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (product ID, quantities, dates)
//! 3. Errors are enum variants, never String
//! 4. Each error variant maps to a user-facing message

use chrono::NaiveDate;
use thiserror::Error;

use crate::money::Money;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
///
/// Every variant is a rejection the cashier can act on. Storage failures
/// live in pharmapos-db and never appear here.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Product cannot be found.
    ///
    /// ## When This Occurs
    /// - A cart line names a product ID that doesn't exist
    /// - Stock is received against a product ID that doesn't exist
    #[error("Product not found: {0}")]
    ProductNotFound(i64),

    /// Not enough usable stock to fill a cart line.
    ///
    /// ## User Workflow
    /// ```text
    /// Cart: product 7, qty 1000
    ///      │
    ///      ▼
    /// Usable batches for product 7 hold 5 units
    ///      │
    ///      ▼
    /// InsufficientStock { product_id: 7, available: 5, requested: 1000 }
    ///      │
    ///      ▼
    /// Whole sale rolled back, UI shows the message
    /// ```
    #[error("Insufficient stock for product {product_id}: available {available}, requested {requested}")]
    InsufficientStock {
        product_id: i64,
        available: i64,
        requested: i64,
    },

    /// A stock receipt's expiry date is today or earlier.
    #[error("Expiry date {expiry_date} must be in the future")]
    InvalidExpiry { expiry_date: NaiveDate },

    /// The tendered amount differs from the sale total.
    #[error("Payment of {paid} does not match sale total {total}")]
    PaymentMismatch { total: Money, paid: Money },

    /// Sale not found.
    #[error("Sale not found: {0}")]
    SaleNotFound(i64),

    /// A line total, sale total or report sum does not fit in an `i64`.
    ///
    /// Validation caps prices and amounts so this is only reachable through
    /// rows written outside the services.
    #[error("{field} is too large to record")]
    AmountOverflow { field: String },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl CoreError {
    pub fn amount_overflow(field: impl Into<String>) -> Self {
        CoreError::AmountOverflow {
            field: field.into(),
        }
    }

    /// True when the error means "the thing you asked for doesn't exist".
    pub fn is_not_found(&self) -> bool {
        matches!(self, CoreError::ProductNotFound(_) | CoreError::SaleNotFound(_))
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when request fields don't meet requirements.
/// They are raised before any transaction begins.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g., unparseable date).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Value is not in allowed set.
    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::InsufficientStock {
            product_id: 7,
            available: 5,
            requested: 1000,
        };
        assert_eq!(
            err.to_string(),
            "Insufficient stock for product 7: available 5, requested 1000"
        );

        let err = CoreError::InvalidExpiry {
            expiry_date: NaiveDate::from_ymd_opt(2026, 10, 17).unwrap(),
        };
        assert_eq!(err.to_string(), "Expiry date 2026-10-17 must be in the future");

        let err = CoreError::PaymentMismatch {
            total: Money::from_kyats(3000),
            paid: Money::from_kyats(2500),
        };
        assert_eq!(
            err.to_string(),
            "Payment of 2,500 Ks does not match sale total 3,000 Ks"
        );

        let err = CoreError::amount_overflow("line total");
        assert_eq!(err.to_string(), "line total is too large to record");
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "name_mm".to_string(),
        };
        assert_eq!(err.to_string(), "name_mm is required");

        let err = ValidationError::MustBePositive {
            field: "qty".to_string(),
        };
        assert_eq!(err.to_string(), "qty must be positive");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Required {
            field: "items".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
        assert!(!core_err.is_not_found());
        assert!(CoreError::SaleNotFound(4).is_not_found());
    }
}
