//! # Services
//!
//! The operations the HTTP layer calls. Each service owns a clone of the
//! pool handle it was constructed with; none of them reach for global
//! state.
//!
//! ```text
//! ┌──────────────────┐   ┌──────────────────┐   ┌──────────────────────┐
//! │  ProductCatalog  │   │ InventoryLedger  │   │     ExpenseBook      │
//! │  create / list   │   │ receive / list   │   │  record expense      │
//! └────────┬─────────┘   └────────┬─────────┘   └──────────┬───────────┘
//!          │                      │                        │
//!          │             ┌────────▼─────────┐              │
//!          │             │  CheckoutEngine  │              │
//!          │             │  FEFO sale txn   │              │
//!          │             └────────┬─────────┘              │
//!          │                      │                        │
//!          │           ┌──────────▼──────────┐             │
//!          └──────────►│ ReportingAggregator │◄────────────┘
//!                      │ profit/ledger/stock │
//!                      └─────────────────────┘
//! ```

pub mod catalog;
pub mod checkout;
pub mod expenses;
pub mod inventory;
pub mod reporting;

#[cfg(test)]
pub(crate) mod test_support {
    use chrono::{DateTime, NaiveDate, TimeZone, Utc};
    use pharmapos_core::{NewProduct, StockReceipt};

    use crate::{Database, DbConfig};

    /// 2026-10-17 09:00 UTC, the clock every service test runs at.
    pub fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 17, 9, 0, 0).unwrap()
    }

    pub fn today() -> NaiveDate {
        now().date_naive()
    }

    pub fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    pub async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    pub async fn add_product(db: &Database, name: &str, sale_price: i64) -> i64 {
        let product = NewProduct {
            name_mm: name.to_string(),
            name_en: Some(name.to_string()),
            barcode: None,
            sale_price,
            reorder_level: None,
        };
        db.catalog().create_product_at(&product, now()).await.unwrap()
    }

    pub async fn add_batch(
        db: &Database,
        product_id: i64,
        batch_no: &str,
        expiry_date: NaiveDate,
        cost_price: i64,
        qty: i64,
    ) -> i64 {
        let receipt = StockReceipt {
            product_id,
            batch_no: batch_no.to_string(),
            expiry_date,
            cost_price,
            qty,
        };
        db.inventory().receive_stock_at(&receipt, now()).await.unwrap()
    }

    /// Inserts a batch that is already expired, bypassing the receipt rule.
    pub async fn add_expired_batch(db: &Database, product_id: i64, qty: i64, cost_price: i64) -> i64 {
        let result = sqlx::query(
            r#"
            INSERT INTO inventory_batches
                (product_id, batch_no, expiry_date, cost_price, qty_on_hand, received_at)
            VALUES (?1, 'OLD', ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(product_id)
        .bind(day(2026, 9, 30))
        .bind(cost_price)
        .bind(qty)
        .bind(now())
        .execute(db.pool())
        .await
        .unwrap();

        result.last_insert_rowid()
    }
}
