//! # pharmapos-core: Pure Business Logic for PharmaPOS
//!
//! This crate holds the pharmacy's business rules as pure functions with
//! zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        PharmaPOS Architecture                           │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    Browser Cashier UI                           │   │
//! │  │    Product grid ──► Cart ──► Checkout ──► Receipt              │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ HTTP / JSON                            │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    apps/api-server (axum)                       │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │             ★ pharmapos-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌────────────┐  ┌──────────┐  │   │
//! │  │   │   types   │  │   money   │  │ allocation │  │  report  │  │   │
//! │  │   │  Product  │  │   Money   │  │ FEFO plan  │  │  profit  │  │   │
//! │  │   │  Batch    │  │  (kyats)  │  │            │  │  ledger  │  │   │
//! │  │   └───────────┘  └───────────┘  └────────────┘  └──────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 pharmapos-db (Database Layer)                   │   │
//! │  │         SQLite queries, migrations, checkout transaction        │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, Batch, Sale, Payment, Expense, ...)
//! - [`money`] - Money type with integer arithmetic (whole kyats)
//! - [`allocation`] - First-expiry-first-out batch allocation
//! - [`report`] - Profit, ledger and stock valuation folds
//! - [`error`] - Domain error types
//! - [`validation`] - Business rule validation
//!
//! ## Example Usage
//!
//! ```rust
//! use chrono::NaiveDate;
//! use pharmapos_core::allocation::{plan_fefo, BatchStock};
//!
//! let lots = [
//!     BatchStock::new(1, NaiveDate::from_ymd_opt(2027, 6, 1).unwrap(), 5, 700),
//!     BatchStock::new(2, NaiveDate::from_ymd_opt(2027, 1, 1).unwrap(), 2, 650),
//! ];
//!
//! // The January lot goes first, the June lot covers the rest.
//! let plan = plan_fefo(&lots, 4).unwrap();
//! assert_eq!(plan[0].batch_id, 2);
//! assert_eq!(plan[0].quantity, 2);
//! assert_eq!(plan[1].batch_id, 1);
//! assert_eq!(plan[1].quantity, 2);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod allocation;
pub mod error;
pub mod money;
pub mod report;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Days ahead of today within which a usable batch counts as "expiring soon".
///
/// Product listings flag such products so the cashier sells them first.
pub const EXPIRY_WARNING_DAYS: i64 = 60;

/// Reorder threshold used when a product is created without one.
pub const DEFAULT_REORDER_LEVEL: i64 = 10;

/// Maximum number of lines in a single checkout cart.
pub const MAX_CART_LINES: usize = 100;

/// Maximum quantity of a single cart line.
///
/// ## Business Reason
/// Catches typos (an extra zero or two) without getting in the way of
/// wholesale strip/box quantities.
pub const MAX_LINE_QUANTITY: i64 = 100_000;

/// Largest sale or cost price a product or batch may carry, in kyats.
///
/// A full cart at this price (`MAX_UNIT_PRICE × MAX_LINE_QUANTITY ×
/// MAX_CART_LINES` = 10^16) stays far below `i64::MAX` (≈ 9.2 × 10^18).
pub const MAX_UNIT_PRICE: i64 = 1_000_000_000;

/// Largest amount a single payment or expense may carry, in kyats: the
/// total of the largest possible cart.
pub const MAX_AMOUNT: i64 = MAX_UNIT_PRICE * MAX_LINE_QUANTITY * MAX_CART_LINES as i64;
