//! Profit and cash ledger reports.

use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::Json;
use chrono::NaiveDate;
use serde::Deserialize;

use pharmapos_core::report::{DateRange, Ledger, ProfitReport, TotalProfit};
use pharmapos_core::validation::parse_date;
use pharmapos_core::ValidationError;

use crate::error::ApiResult;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfitQuery {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct LedgerQuery {
    pub date: Option<String>,
}

/// Blank parameters count as absent.
fn optional_date(field: &str, value: Option<&str>) -> Result<Option<NaiveDate>, ValidationError> {
    match value.map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => parse_date(field, value).map(Some),
    }
}

/// GET /report/profit
pub async fn total_profit(State(state): State<AppState>) -> ApiResult<TotalProfit> {
    let profit = state.db.reports().total_profit().await?;
    Ok(Json(profit))
}

/// GET /report/detailed-profit?startDate=YYYY-MM-DD&endDate=YYYY-MM-DD
pub async fn detailed_profit(
    State(state): State<AppState>,
    query: Result<Query<ProfitQuery>, QueryRejection>,
) -> ApiResult<ProfitReport> {
    let Query(query) = query?;
    let range = DateRange::new(
        optional_date("startDate", query.start_date.as_deref())?,
        optional_date("endDate", query.end_date.as_deref())?,
    );

    let report = state.db.reports().compute_detailed_profit(range).await?;
    Ok(Json(report))
}

/// GET /api/ledger?date=YYYY-MM-DD
pub async fn ledger(
    State(state): State<AppState>,
    query: Result<Query<LedgerQuery>, QueryRejection>,
) -> ApiResult<Ledger> {
    let Query(query) = query?;
    let date = parse_date("date", query.date.as_deref().unwrap_or_default())?;

    let ledger = state.db.reports().compute_ledger(date).await?;
    Ok(Json(ledger))
}
