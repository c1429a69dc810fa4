//! # pharmapos-server: HTTP API for PharmaPOS
//!
//! A thin axum layer over the `pharmapos-db` services. Handlers parse the
//! request, call one service method and serialize the result; all rules
//! live below this crate.
//!
//! ## Endpoints
//! | Method & Path | Service |
//! |---|---|
//! | `GET /products` | `ProductCatalog::list_products` |
//! | `POST /products` | `ProductCatalog::create_product` |
//! | `GET /products/{id}/batches` | `InventoryLedger::list_available_batches` |
//! | `POST /sale` | `CheckoutEngine::checkout` |
//! | `GET /api/sales/{id}` | `CheckoutEngine::get_sale` |
//! | `POST /api/stock/receive` | `InventoryLedger::receive_stock` |
//! | `GET /api/stock/history` | `ReportingAggregator::compute_stock_valuation` |
//! | `GET /report/profit` | `ReportingAggregator::total_profit` |
//! | `GET /report/detailed-profit` | `ReportingAggregator::compute_detailed_profit` |
//! | `GET /api/ledger?date=` | `ReportingAggregator::compute_ledger` |
//! | `POST /api/expenses` | `ExpenseBook::record_expense` |
//! | `GET /health` | `Database::health_check` |

pub mod config;
pub mod error;
pub mod router;
pub mod routes;
pub mod state;

pub use config::{ConfigError, ServerConfig};
pub use error::{ApiError, ApiResult};
pub use router::create_router;
pub use state::AppState;
