//! HTTP handlers, one module per resource.

pub mod expenses;
pub mod health;
pub mod products;
pub mod reports;
pub mod sales;
pub mod stock;

use serde::Serialize;

/// Body returned by endpoints that create a row.
#[derive(Debug, Serialize)]
pub struct Created {
    pub success: bool,
    pub id: i64,
}

impl Created {
    pub fn new(id: i64) -> Self {
        Self { success: true, id }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use axum::Router;
    use chrono::{Days, Utc};
    use http_body_util::BodyExt;
    use serde_json::Value;
    use tower::ServiceExt;

    use pharmapos_core::{NewProduct, StockReceipt};
    use pharmapos_db::{Database, DbConfig};

    use crate::router::create_router;
    use crate::state::AppState;

    pub async fn test_state() -> AppState {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        AppState::new(db)
    }

    pub fn app(state: &AppState) -> Router {
        create_router(state.clone(), None)
    }

    /// `YYYY-MM-DD`, `days` after today (UTC).
    pub fn days_from_today(days: u64) -> String {
        let date = Utc::now().date_naive() + Days::new(days);
        date.format("%Y-%m-%d").to_string()
    }

    pub async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    pub async fn get(app: Router, uri: &str) -> (StatusCode, Value) {
        let request = Request::get(uri).body(Body::empty()).unwrap();
        send(app, request).await
    }

    pub async fn post_raw(app: Router, uri: &str, body: &str) -> (StatusCode, Value) {
        let request = Request::post(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        send(app, request).await
    }

    pub async fn post_json(app: Router, uri: &str, body: Value) -> (StatusCode, Value) {
        post_raw(app, uri, &body.to_string()).await
    }

    pub async fn seed_product(state: &AppState, name: &str, sale_price: i64) -> i64 {
        let product = NewProduct {
            name_mm: name.to_string(),
            name_en: None,
            barcode: None,
            sale_price,
            reorder_level: None,
        };
        state.db.catalog().create_product(&product).await.unwrap()
    }

    pub async fn seed_batch(
        state: &AppState,
        product_id: i64,
        batch_no: &str,
        expires_in_days: u64,
        cost_price: i64,
        qty: i64,
    ) -> i64 {
        let receipt = StockReceipt {
            product_id,
            batch_no: batch_no.to_string(),
            expiry_date: Utc::now().date_naive() + Days::new(expires_in_days),
            cost_price,
            qty,
        };
        state.db.inventory().receive_stock(&receipt).await.unwrap()
    }
}
