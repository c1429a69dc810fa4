//! # Domain Types
//!
//! Core domain types used throughout PharmaPOS.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │──►│     Batch       │   │    Expense      │       │
//! │  │  ─────────────  │1 n│  ─────────────  │   │  ─────────────  │       │
//! │  │  name_mm/en     │   │  batch_no       │   │  particulars    │       │
//! │  │  sale_price     │   │  expiry_date    │   │  amount         │       │
//! │  │  reorder_level  │   │  cost_price     │   └─────────────────┘       │
//! │  └─────────────────┘   │  qty_on_hand    │                              │
//! │                        └────────┬────────┘                              │
//! │                                 │ drawn from                            │
//! │  ┌─────────────────┐   ┌────────▼────────┐   ┌─────────────────┐       │
//! │  │      Sale       │──►│  SaleLineItem   │   │    Payment      │       │
//! │  │  ─────────────  │1 n│  ─────────────  │   │  ─────────────  │       │
//! │  │  invoice_no     │   │  qty            │   │  method         │       │
//! │  │  sold_at        │   │  unit_price     │   │  CASH|KPAY|WAVE │       │
//! │  │  total          │   │  cost_at_sale   │   │  amount         │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Snapshot Pattern
//! A line item freezes the product's sale price and the batch's cost price
//! at checkout. Profit reports read those snapshots and never look back at
//! the current catalogue.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::error::ValidationError;
use crate::money::Money;

// =============================================================================
// Product
// =============================================================================

/// A product in the pharmacy catalogue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Product {
    pub id: i64,

    /// Myanmar display name (required).
    pub name_mm: String,

    /// English display name.
    pub name_en: Option<String>,

    pub barcode: Option<String>,

    /// Unit sale price in kyats.
    pub sale_price: i64,

    /// Usable stock at or below this level should be reordered.
    pub reorder_level: i64,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl Product {
    /// Returns the sale price as Money.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_kyats(self.sale_price)
    }
}

/// Input for creating a product.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewProduct {
    pub name_mm: String,
    #[serde(default)]
    pub name_en: Option<String>,
    #[serde(default)]
    pub barcode: Option<String>,
    pub sale_price: i64,
    #[serde(default)]
    pub reorder_level: Option<i64>,
}

/// A product together with the stock figures derived from its batches.
///
/// ## Derived Quantities
/// - `total_qty`: every unit on hand, expired or not
/// - `usable_qty`: units in batches that expire after today
/// - `has_expiring_batch`: some usable batch expires within
///   [`EXPIRY_WARNING_DAYS`](crate::EXPIRY_WARNING_DAYS)
/// - `needs_reorder`: `usable_qty <= reorder_level`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct ProductListing {
    pub id: i64,
    pub name_mm: String,
    pub name_en: Option<String>,
    pub barcode: Option<String>,
    pub sale_price: i64,
    pub reorder_level: i64,
    pub total_qty: i64,
    pub usable_qty: i64,
    pub has_expiring_batch: bool,
    pub needs_reorder: bool,
}

// =============================================================================
// Batch (inventory lot)
// =============================================================================

/// Quantity of one product received under one lot number and expiry date.
///
/// `qty_on_hand` only ever goes down (checkout) and never below zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Batch {
    pub id: i64,
    pub product_id: i64,
    pub batch_no: String,
    #[ts(as = "String")]
    pub expiry_date: NaiveDate,
    /// Unit cost basis in kyats.
    pub cost_price: i64,
    pub qty_on_hand: i64,
    #[ts(as = "String")]
    pub received_at: DateTime<Utc>,
}

impl Batch {
    /// A batch is expired on the day it expires and every day after.
    pub fn is_expired_on(&self, today: NaiveDate) -> bool {
        self.expiry_date <= today
    }

    /// Whether checkout may draw from this batch today.
    pub fn is_usable_on(&self, today: NaiveDate) -> bool {
        self.qty_on_hand > 0 && !self.is_expired_on(today)
    }

}

/// A stock receipt: the event that creates a batch.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct StockReceipt {
    pub product_id: i64,
    pub batch_no: String,
    #[ts(as = "String")]
    pub expiry_date: NaiveDate,
    pub cost_price: i64,
    pub qty: i64,
}

// =============================================================================
// Payment Method
// =============================================================================

/// How the customer paid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "UPPERCASE"))]
#[serde(rename_all = "UPPERCASE")]
#[ts(export)]
pub enum PaymentMethod {
    /// Physical cash.
    Cash,
    /// KBZPay mobile wallet.
    Kpay,
    /// Wave Money mobile wallet.
    Wave,
}

impl PaymentMethod {
    pub const ALL: [PaymentMethod; 3] = [PaymentMethod::Cash, PaymentMethod::Kpay, PaymentMethod::Wave];

    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "CASH",
            PaymentMethod::Kpay => "KPAY",
            PaymentMethod::Wave => "WAVE",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentMethod {
    type Err = ValidationError;

    /// Parses a method name. Only the exact upper-case names are accepted,
    /// the same set the `payments.method` CHECK constraint allows.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "CASH" => Ok(PaymentMethod::Cash),
            "KPAY" => Ok(PaymentMethod::Kpay),
            "WAVE" => Ok(PaymentMethod::Wave),
            _ => Err(ValidationError::NotAllowed {
                field: "payment method".to_string(),
                allowed: PaymentMethod::ALL.iter().map(|m| m.to_string()).collect(),
            }),
        }
    }
}

// =============================================================================
// Sale
// =============================================================================

/// One checkout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Sale {
    pub id: i64,
    pub invoice_no: String,
    #[ts(as = "String")]
    pub sold_at: DateTime<Utc>,
    pub subtotal: i64,
    /// Always 0; discounts are not applied at the till.
    pub discount: i64,
    pub total: i64,
}

// =============================================================================
// Sale Line Item
// =============================================================================

/// Units of one product drawn from one batch within a sale.
///
/// A cart line that spans two batches becomes two line items.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct SaleLineItem {
    pub id: i64,
    pub sale_id: i64,
    pub product_id: i64,
    pub batch_id: i64,
    pub qty: i64,
    /// Product sale price at checkout (frozen).
    pub unit_price: i64,
    /// `qty * unit_price`.
    pub line_total: i64,
    /// Batch cost price at checkout (frozen).
    pub cost_at_sale: i64,
}

impl SaleLineItem {
    #[inline]
    pub fn line_total(&self) -> Money {
        Money::from_kyats(self.line_total)
    }
}

/// A line item joined with the product's display names, as printed on a receipt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct ReceiptLine {
    pub id: i64,
    pub sale_id: i64,
    pub product_id: i64,
    pub batch_id: i64,
    pub qty: i64,
    pub unit_price: i64,
    pub line_total: i64,
    pub cost_at_sale: i64,
    pub name_mm: String,
    pub name_en: Option<String>,
}

// =============================================================================
// Payment
// =============================================================================

/// The single payment recorded against a sale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Payment {
    pub id: i64,
    pub sale_id: i64,
    pub method: PaymentMethod,
    pub amount: i64,
}

/// Everything needed to reprint a receipt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SaleDetails {
    pub sale: Sale,
    pub items: Vec<ReceiptLine>,
    pub payment: Option<Payment>,
}

// =============================================================================
// Checkout Request / Result
// =============================================================================

/// One cart line as submitted by the till.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CartLine {
    pub product_id: i64,
    pub qty: i64,
}

/// Payment as submitted by the till. `method` is validated, not trusted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PaymentTender {
    pub method: String,
    pub amount: i64,
}

/// Body of `POST /sale`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CheckoutRequest {
    pub items: Vec<CartLine>,
    pub payment: PaymentTender,
}

/// What a committed checkout returns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CheckoutReceipt {
    pub sale_id: i64,
    pub invoice_no: String,
    pub total: Money,
}

// =============================================================================
// Expense
// =============================================================================

/// Cash going out of the till, unrelated to sales.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Expense {
    pub id: i64,
    #[ts(as = "String")]
    pub spent_at: DateTime<Utc>,
    pub particulars: String,
    pub method: Option<String>,
    pub amount: i64,
    pub notes: Option<String>,
}

/// Input for recording an expense.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewExpense {
    pub particulars: String,
    pub amount: i64,
    #[serde(default)]
    pub method: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

// =============================================================================
// Unit Tests
// =============================================================================
