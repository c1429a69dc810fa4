//! # FEFO Allocation
//!
//! Plans how a cart line is filled from a product's batches:
//! first-expiry-first-out.
//!
//! ## How a Line is Filled
//! ```text
//! requested: 7
//!
//!   batch 12  exp 2027-01-31  on hand 3   ──► take 3   (remaining 4)
//!   batch  9  exp 2027-03-15  on hand 2   ──► take 2   (remaining 2)
//!   batch 15  exp 2027-03-15  on hand 10  ──► take 2   (remaining 0) stop
//!   batch 20  exp 2027-09-01  on hand 8       untouched
//! ```
//!
//! Ties on expiry date go to the lower batch ID (received earlier).
//!
//! The planner is pure. The checkout transaction in pharmapos-db feeds it
//! the allocatable batches it has just read, then applies the plan with
//! guarded decrements. If a decrement finds less stock than planned the
//! whole sale is rolled back.

use chrono::NaiveDate;

use crate::error::CoreError;
use crate::types::Batch;

// =============================================================================
// Inputs and Outputs
// =============================================================================

/// The slice of a batch the planner needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchStock {
    pub batch_id: i64,
    pub expiry_date: NaiveDate,
    pub available: i64,
    /// Unit cost, copied into the line item as `cost_at_sale`.
    pub cost_price: i64,
}

impl BatchStock {
    pub fn new(batch_id: i64, expiry_date: NaiveDate, available: i64, cost_price: i64) -> Self {
        Self {
            batch_id,
            expiry_date,
            available,
            cost_price,
        }
    }
}

impl From<&Batch> for BatchStock {
    fn from(batch: &Batch) -> Self {
        BatchStock::new(batch.id, batch.expiry_date, batch.qty_on_hand, batch.cost_price)
    }
}

/// Units to take from one batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Allocation {
    pub batch_id: i64,
    pub quantity: i64,
    pub cost_price: i64,
}

/// The batches together could not cover the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Shortfall {
    pub available: i64,
    pub requested: i64,
}

impl Shortfall {
    /// Attaches the product to turn this into a domain error.
    pub fn into_error(self, product_id: i64) -> CoreError {
        CoreError::InsufficientStock {
            product_id,
            available: self.available,
            requested: self.requested,
        }
    }
}

// =============================================================================
// Planner
// =============================================================================

/// Plans a FEFO allocation of `requested` units across `lots`.
///
/// Lots with nothing on hand are skipped. The returned allocations are in
/// the order they should be applied and their quantities sum to
/// `requested`.
///
/// ## Errors
/// [`Shortfall`] when the lots hold fewer than `requested` units in total.
/// Nothing is partially planned.
pub fn plan_fefo(lots: &[BatchStock], requested: i64) -> Result<Vec<Allocation>, Shortfall> {
    let mut ordered: Vec<&BatchStock> = lots.iter().filter(|lot| lot.available > 0).collect();
    ordered.sort_by_key(|lot| (lot.expiry_date, lot.batch_id));

    let available: i64 = ordered.iter().map(|lot| lot.available).sum();
    if available < requested {
        return Err(Shortfall {
            available,
            requested,
        });
    }

    let mut remaining = requested;
    let mut plan = Vec::new();

    for lot in ordered {
        if remaining == 0 {
            break;
        }

        let take = lot.available.min(remaining);
        plan.push(Allocation {
            batch_id: lot.batch_id,
            quantity: take,
            cost_price: lot.cost_price,
        });
        remaining -= take;
    }

    Ok(plan)
}

// =============================================================================
// Unit Tests
// =============================================================================
