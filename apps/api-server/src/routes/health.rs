//! Health check endpoint

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde_json::{json, Value};

use crate::state::AppState;

/// GET /health
///
/// 200 when the database answers, 503 otherwise.
pub async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    let database_ok = state.db.health_check().await;

    let status = if database_ok {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let body = json!({
        "status": if database_ok { "ok" } else { "degraded" },
        "database": if database_ok { "connected" } else { "unavailable" },
        "version": env!("CARGO_PKG_VERSION"),
    });

    (status, Json(body))
}
