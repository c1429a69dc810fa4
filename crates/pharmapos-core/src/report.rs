//! # Report Folds
//!
//! Row types and pure folds behind the read-side reports: profit, the
//! daily cash ledger, and stock valuation.
//!
//! The database layer fetches rows; everything that sums, merges or sorts
//! them lives here so it can be tested without SQLite.
//!
//! ## Profit Uses Snapshots
//! ```text
//! SaleLineItem { qty: 3, unit_price: 1000, cost_at_sale: 700 }
//!
//!   revenue = 3 × 1000 = 3000
//!   cost    = 3 ×  700 = 2100
//!   profit  =            900
//! ```
//! The batch's current cost is never consulted.
//!
//! Every fold uses checked arithmetic and fails with
//! `CoreError::AmountOverflow` rather than wrapping.

use chrono::{DateTime, NaiveDate, NaiveTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;

// =============================================================================
// Date Ranges
// =============================================================================

/// Start of `date` (UTC midnight).
pub fn start_of_day(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}

/// `[start, end)` covering the whole UTC calendar day.
pub fn day_bounds(date: NaiveDate) -> (DateTime<Utc>, DateTime<Utc>) {
    let start = start_of_day(date);
    (start, start + TimeDelta::days(1))
}

/// An optionally bounded, inclusive range of calendar days.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateRange {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl DateRange {
    /// No bounds: every sale ever made.
    pub fn all() -> Self {
        Self::default()
    }

    pub fn new(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        Self { start, end }
    }

    /// Timestamp bounds: `sold_at >= from` and `sold_at < until`.
    pub fn bounds(&self) -> (Option<DateTime<Utc>>, Option<DateTime<Utc>>) {
        (
            self.start.map(start_of_day),
            self.end.map(|end| day_bounds(end).1),
        )
    }
}

// =============================================================================
// Profit
// =============================================================================

/// One sale line as shown in the detailed profit report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct ProfitLine {
    #[ts(as = "String")]
    pub sold_at: DateTime<Utc>,
    pub invoice_no: String,
    pub name_mm: String,
    pub name_en: Option<String>,
    pub qty: i64,
    pub unit_price: i64,
    pub cost_at_sale: i64,
    /// `qty * (unit_price - cost_at_sale)`
    pub profit: i64,
}

impl ProfitLine {
    pub fn revenue(&self) -> CoreResult<Money> {
        Money::from_kyats(self.unit_price)
            .checked_mul_quantity(self.qty)
            .ok_or_else(|| CoreError::amount_overflow("revenue"))
    }

    pub fn cost(&self) -> CoreResult<Money> {
        Money::from_kyats(self.cost_at_sale)
            .checked_mul_quantity(self.qty)
            .ok_or_else(|| CoreError::amount_overflow("cost"))
    }
}

/// Revenue, cost and margin over a set of sale lines.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ProfitSummary {
    pub total_revenue: Money,
    pub total_cost: Money,
    pub net_profit: Money,
}

impl ProfitSummary {
    /// Folds sale lines into a summary.
    pub fn from_lines<'a>(lines: impl IntoIterator<Item = &'a ProfitLine>) -> CoreResult<Self> {
        let mut total_revenue = Money::zero();
        let mut total_cost = Money::zero();
        for line in lines {
            total_revenue = total_revenue
                .checked_add(line.revenue()?)
                .ok_or_else(|| CoreError::amount_overflow("total revenue"))?;
            total_cost = total_cost
                .checked_add(line.cost()?)
                .ok_or_else(|| CoreError::amount_overflow("total cost"))?;
        }

        let net_profit = total_revenue
            .checked_sub(total_cost)
            .ok_or_else(|| CoreError::amount_overflow("net profit"))?;

        Ok(Self {
            total_revenue,
            total_cost,
            net_profit,
        })
    }
}

/// Body of `GET /report/detailed-profit`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ProfitReport {
    pub items: Vec<ProfitLine>,
    pub summary: ProfitSummary,
}

impl ProfitReport {
    pub fn new(items: Vec<ProfitLine>) -> CoreResult<Self> {
        let summary = ProfitSummary::from_lines(&items)?;
        Ok(Self { items, summary })
    }
}

/// Body of `GET /report/profit`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct TotalProfit {
    pub total_profit: Money,
}

// =============================================================================
// Ledger
// =============================================================================

/// Which side of the till an entry is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "UPPERCASE"))]
#[serde(rename_all = "UPPERCASE")]
#[ts(export)]
pub enum LedgerEntryKind {
    Income,
    Expense,
}

/// A sale or an expense on the daily ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct LedgerEntry {
    /// Sale ID for income, expense ID for expenses.
    pub id: i64,
    #[ts(as = "String")]
    pub time: DateTime<Utc>,
    #[serde(rename = "type")]
    pub kind: LedgerEntryKind,
    /// `Sale #<invoice>` for income, the expense text otherwise.
    pub particulars: String,
    pub amount: i64,
}

/// Totals for one ledger day.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct LedgerSummary {
    pub total_income: Money,
    pub total_expense: Money,
    pub net_cash: Money,
}

/// Body of `GET /api/ledger`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Ledger {
    pub items: Vec<LedgerEntry>,
    pub summary: LedgerSummary,
}

/// Merges a day's income and expense entries into one ledger.
///
/// Entries are sorted by time; at the same instant income comes before
/// expense, then lower ID first.
pub fn merge_ledger(income: Vec<LedgerEntry>, expenses: Vec<LedgerEntry>) -> CoreResult<Ledger> {
    let mut items = income;
    items.extend(expenses);
    items.sort_by_key(|entry| (entry.time, entry.kind == LedgerEntryKind::Expense, entry.id));

    let mut summary = LedgerSummary::default();
    for entry in &items {
        let amount = Money::from_kyats(entry.amount);
        let (total, field) = match entry.kind {
            LedgerEntryKind::Income => (&mut summary.total_income, "total income"),
            LedgerEntryKind::Expense => (&mut summary.total_expense, "total expense"),
        };
        *total = total
            .checked_add(amount)
            .ok_or_else(|| CoreError::amount_overflow(field))?;
    }
    summary.net_cash = summary
        .total_income
        .checked_sub(summary.total_expense)
        .ok_or_else(|| CoreError::amount_overflow("net cash"))?;

    Ok(Ledger { items, summary })
}

// =============================================================================
// Stock Valuation
// =============================================================================

/// A batch with its product's names, as listed in stock history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct StockHistoryEntry {
    pub id: i64,
    pub product_id: i64,
    pub batch_no: String,
    #[ts(as = "String")]
    pub expiry_date: NaiveDate,
    pub cost_price: i64,
    pub qty_on_hand: i64,
    #[ts(as = "String")]
    pub received_at: DateTime<Utc>,
    pub name_mm: String,
    pub name_en: Option<String>,
}

impl StockHistoryEntry {
    pub fn value(&self) -> CoreResult<Money> {
        Money::from_kyats(self.cost_price)
            .checked_mul_quantity(self.qty_on_hand)
            .ok_or_else(|| CoreError::amount_overflow("stock value"))
    }
}

/// Body of `GET /api/stock/history`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct StockValuation {
    pub history: Vec<StockHistoryEntry>,
    /// Σ cost_price × qty_on_hand, at original cost.
    pub total_value: Money,
}

impl StockValuation {
    pub fn from_history(history: Vec<StockHistoryEntry>) -> CoreResult<Self> {
        let mut total_value = Money::zero();
        for entry in &history {
            total_value = total_value
                .checked_add(entry.value()?)
                .ok_or_else(|| CoreError::amount_overflow("total value"))?;
        }

        Ok(Self {
            history,
            total_value,
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn at(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 17, h, m, 0).unwrap()
    }

    fn line(qty: i64, unit_price: i64, cost_at_sale: i64) -> ProfitLine {
        ProfitLine {
            sold_at: at(9, 0),
            invoice_no: "INV-1".to_string(),
            name_mm: "Biogesic".to_string(),
            name_en: None,
            qty,
            unit_price,
            cost_at_sale,
            profit: qty * (unit_price - cost_at_sale),
        }
    }

    fn entry(id: i64, time: DateTime<Utc>, kind: LedgerEntryKind, amount: i64) -> LedgerEntry {
        LedgerEntry {
            id,
            time,
            kind,
            particulars: format!("entry {id}"),
            amount,
        }
    }

    #[test]
    fn test_day_bounds_cover_one_utc_day() {
        let (start, end) = day_bounds(day(2026, 10, 17));
        assert_eq!(start, at(0, 0));
        assert_eq!(end, Utc.with_ymd_and_hms(2026, 10, 18, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_date_range_end_is_inclusive() {
        let range = DateRange::new(Some(day(2026, 10, 1)), Some(day(2026, 10, 17)));
        let (from, until) = range.bounds();
        assert_eq!(from, Some(Utc.with_ymd_and_hms(2026, 10, 1, 0, 0, 0).unwrap()));
        assert_eq!(until, Some(Utc.with_ymd_and_hms(2026, 10, 18, 0, 0, 0).unwrap()));
        assert_eq!(DateRange::all().bounds(), (None, None));
    }

    #[test]
    fn test_profit_summary_uses_cost_snapshot() {
        let summary = ProfitSummary::from_lines(&[line(3, 1000, 700)]).unwrap();
        assert_eq!(summary.total_revenue.kyats(), 3000);
        assert_eq!(summary.total_cost.kyats(), 2100);
        assert_eq!(summary.net_profit.kyats(), 900);
    }

    #[test]
    fn test_profit_report_wire_format() {
        let report = ProfitReport::new(vec![line(2, 5500, 3850), line(1, 1000, 700)]).unwrap();
        assert_eq!(report.summary.net_profit.kyats(), 3300 + 300);

        let json = serde_json::to_value(&report.summary).unwrap();
        assert_eq!(json["totalRevenue"], 12000);
        assert_eq!(json["totalCost"], 8400);
        assert_eq!(json["netProfit"], 3600);
    }

    #[test]
    fn test_empty_profit_is_zero() {
        let summary = ProfitSummary::from_lines(&Vec::<ProfitLine>::new()).unwrap();
        assert!(summary.net_profit.is_zero());
    }

    #[test]
    fn test_profit_overflow_is_an_error() {
        let huge = (1_i64 << 62) + 1;
        let four_units = ProfitLine {
            qty: 4,
            unit_price: huge,
            cost_at_sale: 0,
            profit: 0,
            ..line(1, 1000, 700)
        };
        let err = ProfitSummary::from_lines(&[four_units]).unwrap_err();
        assert!(matches!(err, CoreError::AmountOverflow { .. }));

        let one_unit = ProfitLine {
            qty: 1,
            unit_price: huge,
            cost_at_sale: 0,
            profit: huge,
            ..line(1, 1000, 700)
        };
        let err = ProfitSummary::from_lines(&[one_unit.clone(), one_unit]).unwrap_err();
        assert!(matches!(err, CoreError::AmountOverflow { ref field } if field == "total revenue"));
    }

    #[test]
    fn test_merge_ledger_sorts_and_totals() {
        let income = vec![
            entry(2, at(15, 0), LedgerEntryKind::Income, 11_000),
            entry(1, at(9, 30), LedgerEntryKind::Income, 3_000),
        ];
        let expenses = vec![entry(1, at(12, 0), LedgerEntryKind::Expense, 20_000)];

        let ledger = merge_ledger(income, expenses).unwrap();
        let order: Vec<(i64, LedgerEntryKind)> =
            ledger.items.iter().map(|e| (e.id, e.kind)).collect();
        assert_eq!(
            order,
            vec![
                (1, LedgerEntryKind::Income),
                (1, LedgerEntryKind::Expense),
                (2, LedgerEntryKind::Income),
            ]
        );

        assert_eq!(ledger.summary.total_income.kyats(), 14_000);
        assert_eq!(ledger.summary.total_expense.kyats(), 20_000);
        assert_eq!(ledger.summary.net_cash.kyats(), -6_000);
    }

    #[test]
    fn test_ledger_entry_serializes_kind_as_type() {
        let json = serde_json::to_value(entry(5, at(9, 0), LedgerEntryKind::Expense, 100)).unwrap();
        assert_eq!(json["type"], "EXPENSE");
        assert!(json.get("kind").is_none());
    }

    #[test]
    fn test_stock_valuation_counts_drained_batches_as_zero() {
        let batch = |id, cost_price, qty_on_hand| StockHistoryEntry {
            id,
            product_id: 1,
            batch_no: format!("LOT-{id}"),
            expiry_date: day(2027, 1, 1),
            cost_price,
            qty_on_hand,
            received_at: at(8, 0),
            name_mm: "Biogesic".to_string(),
            name_en: None,
        };

        let valuation =
            StockValuation::from_history(vec![batch(1, 700, 10), batch(2, 650, 0)]).unwrap();
        assert_eq!(valuation.history.len(), 2);
        assert_eq!(valuation.total_value.kyats(), 7000);

        let json = serde_json::to_value(&valuation).unwrap();
        assert_eq!(json["totalValue"], 7000);

        let err = StockValuation::from_history(vec![batch(3, i64::MAX, 2)]).unwrap_err();
        assert!(matches!(err, CoreError::AmountOverflow { .. }));
    }
}
