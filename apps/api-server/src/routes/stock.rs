//! Stock receipts and stock history.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;

use pharmapos_core::report::StockValuation;
use pharmapos_core::StockReceipt;

use super::Created;
use crate::error::ApiResult;
use crate::state::AppState;

/// POST /api/stock/receive
pub async fn receive_stock(
    State(state): State<AppState>,
    payload: Result<Json<StockReceipt>, JsonRejection>,
) -> ApiResult<Created> {
    let Json(receipt) = payload?;
    let id = state.db.inventory().receive_stock(&receipt).await?;
    Ok(Json(Created::new(id)))
}

/// GET /api/stock/history
pub async fn stock_history(State(state): State<AppState>) -> ApiResult<StockValuation> {
    let valuation = state.db.reports().compute_stock_valuation().await?;
    Ok(Json(valuation))
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use axum::http::StatusCode;
    use serde_json::json;

    #[tokio::test]
    async fn test_receive_then_history() {
        let state = test_state().await;
        let product = seed_product(&state, "Enervon C", 9500).await;

        let (status, body) = post_json(
            app(&state),
            "/api/stock/receive",
            json!({
                "product_id": product,
                "batch_no": "EN-2407",
                "expiry_date": days_from_today(200),
                "cost_price": 6650,
                "qty": 12
            }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        let batch_id = body["id"].as_i64().unwrap();

        let (status, body) = get(app(&state), "/api/stock/history").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["totalValue"], 6650 * 12);
        assert_eq!(body["history"][0]["id"], batch_id);
        assert_eq!(body["history"][0]["name_mm"], "Enervon C");
    }

    #[tokio::test]
    async fn test_receive_rejects_past_expiry() {
        let state = test_state().await;
        let product = seed_product(&state, "Parasafe", 5300).await;

        let (status, body) = post_json(
            app(&state),
            "/api/stock/receive",
            json!({
                "product_id": product,
                "batch_no": "OLD",
                "expiry_date": days_from_today(0),
                "cost_price": 3700,
                "qty": 5
            }),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "INVALID_EXPIRY");

        let (_, history) = get(app(&state), "/api/stock/history").await;
        assert!(history["history"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_receive_rejects_malformed_date() {
        let state = test_state().await;
        let product = seed_product(&state, "Parasafe", 5300).await;

        let (status, body) = post_json(
            app(&state),
            "/api/stock/receive",
            json!({
                "product_id": product,
                "batch_no": "P-1",
                "expiry_date": "31/12/2027",
                "cost_price": 3700,
                "qty": 5
            }),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "BAD_REQUEST");
    }
}
