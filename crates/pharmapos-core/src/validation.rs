//! # Validation Module
//!
//! Input validation utilities for PharmaPOS.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Cashier UI (browser)                                         │
//! │  └── Required fields, numeric inputs                                   │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: HTTP handler + service (Rust)                                │
//! │  ├── Type validation (JSON deserialization)                            │
//! │  └── THIS MODULE: Business rule validation                             │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── NOT NULL / CHECK constraints (qty_on_hand >= 0)                   │
//! │  ├── UNIQUE invoice numbers                                            │
//! │  └── Foreign key constraints                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Each validator checks one field. The `validate_*` functions for whole
//! requests call them in field order and stop at the first failure.
//!
//! ## Usage
//! ```rust
//! use pharmapos_core::validation::{validate_product_name, validate_quantity};
//!
//! assert!(validate_product_name("ပါရာစီတမော").is_ok());
//! assert!(validate_quantity(5).is_ok());
//! assert!(validate_quantity(0).is_err());
//! ```

use chrono::NaiveDate;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::types::{CheckoutRequest, NewExpense, NewProduct, PaymentMethod, StockReceipt};
use crate::{MAX_AMOUNT, MAX_CART_LINES, MAX_LINE_QUANTITY, MAX_UNIT_PRICE};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

const MAX_NAME_LEN: usize = 200;
const MAX_BARCODE_LEN: usize = 64;
const MAX_BATCH_NO_LEN: usize = 64;
const MAX_PARTICULARS_LEN: usize = 500;

fn required(field: &str, value: &str) -> ValidationResult<()> {
    if value.trim().is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }
    Ok(())
}

// Length is counted in characters: Myanmar names are multi-byte.
fn max_chars(field: &str, value: &str, max: usize) -> ValidationResult<()> {
    if value.trim().chars().count() > max {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
        });
    }
    Ok(())
}

// =============================================================================
// String Validators
// =============================================================================

/// Validates a product's Myanmar display name.
///
/// ## Rules
/// - Must not be empty
/// - At most 200 characters
///
/// ## Example
/// ```rust
/// use pharmapos_core::validation::validate_product_name;
///
/// assert!(validate_product_name("Biogesic").is_ok());
/// assert!(validate_product_name("   ").is_err());
/// ```
pub fn validate_product_name(name: &str) -> ValidationResult<()> {
    required("name_mm", name)?;
    max_chars("name_mm", name, MAX_NAME_LEN)
}

/// Validates a lot number on a stock receipt.
pub fn validate_batch_no(batch_no: &str) -> ValidationResult<()> {
    required("batch_no", batch_no)?;
    max_chars("batch_no", batch_no, MAX_BATCH_NO_LEN)
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a unit sale price. Products are never given away.
pub fn validate_sale_price(kyats: i64) -> ValidationResult<()> {
    if kyats <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "sale_price".to_string(),
        });
    }
    if kyats > MAX_UNIT_PRICE {
        return Err(ValidationError::OutOfRange {
            field: "sale_price".to_string(),
            min: 1,
            max: MAX_UNIT_PRICE,
        });
    }
    Ok(())
}

/// Validates a unit cost price. Zero is allowed (free samples).
pub fn validate_cost_price(kyats: i64) -> ValidationResult<()> {
    if !(0..=MAX_UNIT_PRICE).contains(&kyats) {
        return Err(ValidationError::OutOfRange {
            field: "cost_price".to_string(),
            min: 0,
            max: MAX_UNIT_PRICE,
        });
    }
    Ok(())
}

/// Validates a reorder threshold.
pub fn validate_reorder_level(level: i64) -> ValidationResult<()> {
    if level < 0 {
        return Err(ValidationError::OutOfRange {
            field: "reorder_level".to_string(),
            min: 0,
            max: i64::MAX,
        });
    }
    Ok(())
}

/// Validates a quantity value.
///
/// ## Rules
/// - Must be positive (> 0)
/// - Must not exceed MAX_LINE_QUANTITY
///
/// ## User Workflow
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  Cart line / stock receipt quantity                                     │
/// │                                                                         │
/// │  validate_quantity(qty) ← THIS FUNCTION                                │
/// │       │                                                                 │
/// │       ├── qty <= 0? → Error: "qty must be positive"                    │
/// │       │                                                                 │
/// │       ├── qty > 100000? → Error: "qty must be between 1 and 100000"    │
/// │       │                                                                 │
/// │       └── OK → allocate / receive                                      │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "qty".to_string(),
        });
    }

    if qty > MAX_LINE_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "qty".to_string(),
            min: 1,
            max: MAX_LINE_QUANTITY,
        });
    }

    Ok(())
}

/// Validates a payment amount.
pub fn validate_payment_amount(kyats: i64) -> ValidationResult<()> {
    validate_amount("payment amount", kyats)
}

fn validate_amount(field: &str, kyats: i64) -> ValidationResult<()> {
    if kyats <= 0 {
        return Err(ValidationError::MustBePositive {
            field: field.to_string(),
        });
    }
    if kyats > MAX_AMOUNT {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 1,
            max: MAX_AMOUNT,
        });
    }
    Ok(())
}

// =============================================================================
// Date Validators
// =============================================================================

/// Parses a `YYYY-MM-DD` query parameter.
///
/// ## Example
/// ```rust
/// use pharmapos_core::validation::parse_date;
///
/// assert!(parse_date("date", "2026-10-17").is_ok());
/// assert!(parse_date("date", "17/10/2026").is_err());
/// ```
pub fn parse_date(field: &str, value: &str) -> ValidationResult<NaiveDate> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| ValidationError::InvalidFormat {
        field: field.to_string(),
        reason: "expected YYYY-MM-DD".to_string(),
    })
}

/// Checks that a receipt's expiry date is strictly after `today`.
pub fn validate_expiry(expiry_date: NaiveDate, today: NaiveDate) -> CoreResult<()> {
    if expiry_date <= today {
        return Err(CoreError::InvalidExpiry { expiry_date });
    }
    Ok(())
}

// =============================================================================
// Request Validators
// =============================================================================

/// Validates a new product. Returns the reorder level to store.
pub fn validate_new_product(product: &NewProduct) -> ValidationResult<i64> {
    validate_product_name(&product.name_mm)?;
    if let Some(name_en) = &product.name_en {
        max_chars("name_en", name_en, MAX_NAME_LEN)?;
    }
    if let Some(barcode) = &product.barcode {
        max_chars("barcode", barcode, MAX_BARCODE_LEN)?;
    }
    validate_sale_price(product.sale_price)?;

    let reorder_level = product.reorder_level.unwrap_or(crate::DEFAULT_REORDER_LEVEL);
    validate_reorder_level(reorder_level)?;
    Ok(reorder_level)
}

/// Validates a stock receipt's fields. Expiry is checked separately
/// because it depends on the clock.
pub fn validate_stock_receipt(receipt: &StockReceipt) -> ValidationResult<()> {
    if receipt.product_id <= 0 {
        return Err(ValidationError::Required {
            field: "product_id".to_string(),
        });
    }
    validate_batch_no(&receipt.batch_no)?;
    validate_cost_price(receipt.cost_price)?;
    validate_quantity(receipt.qty)
}

/// Validates a checkout request and returns the parsed payment method.
///
/// ## Rules
/// - At least one cart line, at most MAX_CART_LINES
/// - Every line has a positive quantity within MAX_LINE_QUANTITY
/// - Payment method is CASH, KPAY or WAVE
/// - Payment amount is positive (equality with the total is checked
///   once the total is known, inside the transaction)
pub fn validate_checkout(request: &CheckoutRequest) -> ValidationResult<PaymentMethod> {
    if request.items.is_empty() {
        return Err(ValidationError::Required {
            field: "items".to_string(),
        });
    }

    if request.items.len() > MAX_CART_LINES {
        return Err(ValidationError::OutOfRange {
            field: "items".to_string(),
            min: 1,
            max: MAX_CART_LINES as i64,
        });
    }

    for line in &request.items {
        validate_quantity(line.qty)?;
    }

    let method = request.payment.method.parse::<PaymentMethod>()?;
    validate_payment_amount(request.payment.amount)?;

    Ok(method)
}

/// Validates an expense entry.
pub fn validate_new_expense(expense: &NewExpense) -> ValidationResult<()> {
    required("particulars", &expense.particulars)?;
    max_chars("particulars", &expense.particulars, MAX_PARTICULARS_LEN)?;
    validate_amount("amount", expense.amount)
}

// =============================================================================
// Unit Tests
// =============================================================================
