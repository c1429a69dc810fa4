//! # Reporting Aggregator
//!
//! Read-only reports over committed sales, expenses and batches. Queries
//! fetch rows; the folds in [`pharmapos_core::report`] do the arithmetic.
//!
//! | Report | Source | Fold |
//! |---|---|---|
//! | profit | sale_items ⋈ sales ⋈ products | `ProfitSummary::from_lines` |
//! | ledger | sales (INCOME) + expenses (EXPENSE) for one UTC day | `merge_ledger` |
//! | stock valuation | every batch, newest first | `StockValuation::from_history` |

use chrono::NaiveDate;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::ServiceResult;
use crate::repository::batch::BatchRepository;
use crate::repository::expense::ExpenseRepository;
use crate::repository::sale::SaleRepository;
use pharmapos_core::report::{
    day_bounds, merge_ledger, DateRange, Ledger, ProfitReport, ProfitSummary, StockValuation,
    TotalProfit,
};

/// Profit, ledger and stock valuation reports.
#[derive(Debug, Clone)]
pub struct ReportingAggregator {
    sales: SaleRepository,
    expenses: ExpenseRepository,
    batches: BatchRepository,
}

impl ReportingAggregator {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            sales: SaleRepository::new(pool.clone()),
            expenses: ExpenseRepository::new(pool.clone()),
            batches: BatchRepository::new(pool),
        }
    }

    /// Revenue, cost at sale and net profit over a range of days.
    pub async fn compute_profit(&self, range: DateRange) -> ServiceResult<ProfitSummary> {
        let (from, until) = range.bounds();
        let lines = self.sales.profit_lines(from, until).await?;

        debug!(lines = lines.len(), "Computed profit");
        Ok(ProfitSummary::from_lines(&lines)?)
    }

    /// Net profit over every sale ever made.
    pub async fn total_profit(&self) -> ServiceResult<TotalProfit> {
        let summary = self.compute_profit(DateRange::all()).await?;
        Ok(TotalProfit {
            total_profit: summary.net_profit,
        })
    }

    /// Per-line profit rows, newest first, plus their summary.
    pub async fn compute_detailed_profit(&self, range: DateRange) -> ServiceResult<ProfitReport> {
        let (from, until) = range.bounds();
        let lines = self.sales.profit_lines(from, until).await?;
        Ok(ProfitReport::new(lines)?)
    }

    /// Income and expenses on one UTC calendar day.
    pub async fn compute_ledger(&self, date: NaiveDate) -> ServiceResult<Ledger> {
        let (from, until) = day_bounds(date);

        let income = self.sales.income_entries(from, until).await?;
        let expenses = self.expenses.ledger_entries(from, until).await?;

        debug!(%date, income = income.len(), expenses = expenses.len(), "Computed ledger");
        Ok(merge_ledger(income, expenses)?)
    }

    /// Every batch with its remaining value at cost.
    pub async fn compute_stock_valuation(&self) -> ServiceResult<StockValuation> {
        let history = self.batches.history().await?;
        Ok(StockValuation::from_history(history)?)
    }
}
