//! Expense entry.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;

use pharmapos_core::NewExpense;

use super::Created;
use crate::error::ApiResult;
use crate::state::AppState;

/// POST /api/expenses
pub async fn record_expense(
    State(state): State<AppState>,
    payload: Result<Json<NewExpense>, JsonRejection>,
) -> ApiResult<Created> {
    let Json(expense) = payload?;
    let id = state.db.expense_book().record_expense(&expense).await?;
    Ok(Json(Created::new(id)))
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use axum::http::StatusCode;
    use serde_json::json;

    #[tokio::test]
    async fn test_record_expense() {
        let state = test_state().await;

        let (status, body) = post_json(
            app(&state),
            "/api/expenses",
            json!({ "particulars": "Shop rent", "amount": 300000, "method": "CASH", "notes": "October" }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);

        let id = body["id"].as_i64().unwrap();
        let stored = state.db.expense_book().get_expense(id).await.unwrap().unwrap();
        assert_eq!(stored.particulars, "Shop rent");
        assert_eq!(stored.notes.as_deref(), Some("October"));
    }

    #[tokio::test]
    async fn test_expense_validation() {
        let state = test_state().await;

        let (status, body) = post_json(
            app(&state),
            "/api/expenses",
            json!({ "particulars": "  ", "amount": 100 }),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "VALIDATION_ERROR");

        let (status, _) =
            post_json(app(&state), "/api/expenses", json!({ "particulars": "Tea" })).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
