//! Router assembly: routes plus tracing and CORS layers.

use axum::http::{HeaderValue, Method};
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::warn;

use crate::routes::{expenses, health, products, reports, sales, stock};
use crate::state::AppState;

/// Builds the full application router.
///
/// `cors_origin` restricts browser access to one origin; `None` allows any.
pub fn create_router(state: AppState, cors_origin: Option<&str>) -> Router {
    Router::new()
        .route("/health", get(health::health_check))
        // Catalogue
        .route("/products", get(products::list_products).post(products::create_product))
        .route("/products/{id}/batches", get(products::list_batches))
        // Checkout
        .route("/sale", post(sales::checkout))
        .route("/api/sales/{id}", get(sales::get_sale))
        // Inventory
        .route("/api/stock/receive", post(stock::receive_stock))
        .route("/api/stock/history", get(stock::stock_history))
        // Reports
        .route("/report/profit", get(reports::total_profit))
        .route("/report/detailed-profit", get(reports::detailed_profit))
        .route("/api/ledger", get(reports::ledger))
        // Expenses
        .route("/api/expenses", post(expenses::record_expense))
        .layer(cors_layer(cors_origin))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cors_layer(origin: Option<&str>) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any);

    match origin.map(HeaderValue::from_str) {
        Some(Ok(origin)) => layer.allow_origin(origin),
        Some(Err(_)) => {
            warn!("Ignoring invalid CORS origin, allowing any");
            layer.allow_origin(Any)
        }
        None => layer.allow_origin(Any),
    }
}
