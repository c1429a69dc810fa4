//! # Repository Module
//!
//! Database repository implementations for PharmaPOS.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Service (checkout, inventory, reporting, ...)                          │
//! │       │                                                                 │
//! │       │  db.batches().list_available(7)                                 │
//! │       ▼                                                                 │
//! │  BatchRepository                                                        │
//! │  ├── get_by_id / insert / list_available / history   (on the pool)     │
//! │  └── list_allocatable / take_stock              (on a transaction)     │
//! │       │                                                                 │
//! │       │  SQL Query                                                      │
//! │       ▼                                                                 │
//! │  SQLite Database                                                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Repository methods run on the pool. The module-level `pub(crate)`
//! functions take an executor or `&mut SqliteConnection` so the checkout
//! transaction can compose them.
//!
//! ## Available Repositories
//!
//! - [`ProductRepository`](product::ProductRepository) - Products and stock listings
//! - [`BatchRepository`](batch::BatchRepository) - Inventory batches
//! - [`SaleRepository`](sale::SaleRepository) - Sales, line items, payments
//! - [`ExpenseRepository`](expense::ExpenseRepository) - Expenses

pub mod batch;
pub mod expense;
pub mod product;
pub mod sale;
