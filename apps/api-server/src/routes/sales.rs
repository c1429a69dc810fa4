//! Checkout and receipt lookup.

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::Json;
use serde::Serialize;

use pharmapos_core::{CheckoutReceipt, CheckoutRequest, SaleDetails};

use crate::error::ApiResult;
use crate::state::AppState;

/// Body of a successful `POST /sale`: `{success, saleId, invoiceNo, total}`.
#[derive(Debug, Serialize)]
pub struct CheckoutResponse {
    pub success: bool,
    #[serde(flatten)]
    pub receipt: CheckoutReceipt,
}

/// POST /sale
pub async fn checkout(
    State(state): State<AppState>,
    payload: Result<Json<CheckoutRequest>, JsonRejection>,
) -> ApiResult<CheckoutResponse> {
    let Json(request) = payload?;
    let receipt = state.db.checkout().checkout(&request).await?;

    Ok(Json(CheckoutResponse {
        success: true,
        receipt,
    }))
}

/// GET /api/sales/{id}
pub async fn get_sale(
    State(state): State<AppState>,
    sale_id: Result<Path<i64>, PathRejection>,
) -> ApiResult<SaleDetails> {
    let Path(sale_id) = sale_id?;
    let details = state.db.checkout().get_sale(sale_id).await?;
    Ok(Json(details))
}
