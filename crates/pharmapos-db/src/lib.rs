//! # pharmapos-db: Database Layer for PharmaPOS
//!
//! SQLite storage for the pharmacy: pool, migrations, repositories, and
//! the services the HTTP layer calls.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        PharmaPOS Data Flow                              │
//! │                                                                         │
//! │  HTTP handler (POST /sale)                                             │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                   pharmapos-db (THIS CRATE)                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Services    │    │  Repositories │    │  Migrations  │  │   │
//! │  │   │               │    │               │    │  (embedded)  │  │   │
//! │  │   │ CheckoutEngine│───►│ SaleRepo      │    │              │  │   │
//! │  │   │ InventoryLedgr│───►│ BatchRepo     │    │ 001_initial_ │  │   │
//! │  │   │ Reporting     │───►│ ProductRepo   │    │   schema.sql │  │   │
//! │  │   │ Catalog/Expns │───►│ ExpenseRepo   │    │              │  │   │
//! │  │   └───────────────┘    └───────┬───────┘    └──────────────┘  │   │
//! │  │                                │                                │   │
//! │  │                        ┌───────▼───────┐                       │   │
//! │  │                        │  SqlitePool   │  (pool.rs)            │   │
//! │  │                        └───────────────┘                       │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite database file (WAL)                                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database and service error types
//! - [`repository`] - Repository implementations
//! - [`service`] - Catalog, inventory ledger, checkout, reporting, expenses
//!
//! ## Usage
//!
//! ```rust,ignore
//! use pharmapos_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("pharmapos.db")).await?;
//!
//! let receipt = db.checkout().checkout(&request).await?;
//! let ledger = db.reports().compute_ledger(today).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;
pub mod service;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult, ServiceError, ServiceResult};
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::batch::BatchRepository;
pub use repository::expense::ExpenseRepository;
pub use repository::product::ProductRepository;
pub use repository::sale::SaleRepository;

// Service re-exports
pub use service::catalog::ProductCatalog;
pub use service::checkout::CheckoutEngine;
pub use service::expenses::ExpenseBook;
pub use service::inventory::InventoryLedger;
pub use service::reporting::ReportingAggregator;
