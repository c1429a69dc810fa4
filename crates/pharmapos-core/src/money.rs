//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In JavaScript/floating point:                                          │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  OUR SOLUTION: Whole Kyats                                              │
//! │    Myanmar kyat prices have no minor unit in practice, so every        │
//! │    price, cost and total is an i64 count of kyats.                     │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use pharmapos_core::money::Money;
//!
//! let price = Money::from_kyats(1_000);
//! let line_total = price.checked_mul_quantity(3).unwrap();
//! assert_eq!(line_total.kyats(), 3_000);
//! assert_eq!(line_total.to_string(), "3,000 Ks");
//! ```
//!
//! ## Overflow
//! Anything built from request data (line totals, sale totals, report
//! folds) goes through the `checked_*` methods. The operator impls are for
//! amounts already known to be in range and panic on overflow in debug
//! builds like plain `i64`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Sub, SubAssign};
use ts_rs::TS;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in whole kyats.
///
/// ## Design Decisions
/// - **i64 (signed)**: net profit and net cash can be negative
/// - **Single field tuple struct**: Zero-cost abstraction over i64, and
///   serializes to a bare JSON number
///
/// ## Where Money is Used
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  Product.sale_price ──► SaleLineItem.unit_price ──► line_total          │
/// │                                                                         │
/// │  Batch.cost_price ────► SaleLineItem.cost_at_sale ──► profit report     │
/// │                                                                         │
/// │  Σ line_total ──► Sale.total ──► Payment.amount ──► daily ledger        │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from whole kyats.
    #[inline]
    pub const fn from_kyats(kyats: i64) -> Self {
        Money(kyats)
    }

    /// Returns the value in whole kyats.
    #[inline]
    pub const fn kyats(&self) -> i64 {
        self.0
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the value is positive (greater than zero).
    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Multiplies a unit amount by a quantity. `None` on overflow.
    ///
    /// ## Example
    /// ```rust
    /// use pharmapos_core::money::Money;
    ///
    /// let unit_price = Money::from_kyats(5_500);
    /// assert_eq!(unit_price.checked_mul_quantity(2), Some(Money::from_kyats(11_000)));
    /// assert_eq!(unit_price.checked_mul_quantity(i64::MAX), None);
    /// ```
    #[inline]
    pub const fn checked_mul_quantity(&self, qty: i64) -> Option<Self> {
        match self.0.checked_mul(qty) {
            Some(kyats) => Some(Money(kyats)),
            None => None,
        }
    }

    /// `None` on overflow.
    #[inline]
    pub const fn checked_add(&self, other: Money) -> Option<Self> {
        match self.0.checked_add(other.0) {
            Some(kyats) => Some(Money(kyats)),
            None => None,
        }
    }

    /// `None` on overflow.
    #[inline]
    pub const fn checked_sub(&self, other: Money) -> Option<Self> {
        match self.0.checked_sub(other.0) {
            Some(kyats) => Some(Money(kyats)),
            None => None,
        }
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Shows money the way a Myanmar receipt does: `10,000 Ks`.
///
/// ## Note
/// This is for logs and receipts printed by the backend. The UI formats
/// numbers itself.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let digits = self.0.unsigned_abs().to_string();
        let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
        for (i, ch) in digits.chars().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                grouped.push(',');
            }
            grouped.push(ch);
        }

        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}{} Ks", sign, grouped)
    }
}

/// Default money is zero.
impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
