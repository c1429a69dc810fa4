//! # Batch Repository
//!
//! Database operations for inventory batches (lots).
//!
//! ## Two Ways to List a Product's Batches
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  list_available     qty_on_hand > 0                 ORDER BY expiry, id │
//! │                     (shows expired lots too, for inspection)            │
//! │                                                                         │
//! │  list_allocatable   qty_on_hand > 0                                     │
//! │                     AND expiry_date > today         ORDER BY expiry, id │
//! │                     (what checkout sells from)                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Guarded Decrement
//! `take_stock` only succeeds while the batch still holds the quantity:
//! ```sql
//! UPDATE inventory_batches SET qty_on_hand = qty_on_hand - ?2
//! WHERE id = ?1 AND qty_on_hand >= ?2
//! ```
//! Zero rows affected means someone else got there first.

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{SqliteConnection, SqliteExecutor, SqlitePool};
use tracing::debug;

use crate::error::DbResult;
use pharmapos_core::report::StockHistoryEntry;
use pharmapos_core::{Batch, StockReceipt};

/// Repository for batch database operations.
#[derive(Debug, Clone)]
pub struct BatchRepository {
    pool: SqlitePool,
}

impl BatchRepository {
    /// Creates a new BatchRepository.
    pub fn new(pool: SqlitePool) -> Self {
        BatchRepository { pool }
    }

    /// Gets a batch by ID.
    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<Batch>> {
        let batch = sqlx::query_as::<_, Batch>(
            r#"
            SELECT id, product_id, batch_no, expiry_date, cost_price, qty_on_hand, received_at
            FROM inventory_batches
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(batch)
    }

    /// Inserts a batch from a stock receipt and returns its ID.
    pub async fn insert(&self, receipt: &StockReceipt, received_at: DateTime<Utc>) -> DbResult<i64> {
        debug!(
            product_id = receipt.product_id,
            batch_no = %receipt.batch_no,
            qty = receipt.qty,
            "Inserting batch"
        );

        let result = sqlx::query(
            r#"
            INSERT INTO inventory_batches
                (product_id, batch_no, expiry_date, cost_price, qty_on_hand, received_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(receipt.product_id)
        .bind(receipt.batch_no.trim())
        .bind(receipt.expiry_date)
        .bind(receipt.cost_price)
        .bind(receipt.qty)
        .bind(received_at)
        .execute(&self.pool)
        .await?;

        Ok(result.last_insert_rowid())
    }

    /// Lists a product's batches with stock, earliest expiry first.
    ///
    /// Expired batches are included.
    pub async fn list_available(&self, product_id: i64) -> DbResult<Vec<Batch>> {
        let batches = sqlx::query_as::<_, Batch>(
            r#"
            SELECT id, product_id, batch_no, expiry_date, cost_price, qty_on_hand, received_at
            FROM inventory_batches
            WHERE product_id = ?1 AND qty_on_hand > 0
            ORDER BY expiry_date ASC, id ASC
            "#,
        )
        .bind(product_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(batches)
    }

    /// Lists the batches checkout may sell from today.
    pub async fn list_allocatable(&self, product_id: i64, today: NaiveDate) -> DbResult<Vec<Batch>> {
        list_allocatable(&self.pool, product_id, today).await
    }

    /// Every batch ever received, newest first, with product names.
    ///
    /// Drained batches stay in the list with `qty_on_hand = 0`.
    pub async fn history(&self) -> DbResult<Vec<StockHistoryEntry>> {
        let history = sqlx::query_as::<_, StockHistoryEntry>(
            r#"
            SELECT
                b.id,
                b.product_id,
                b.batch_no,
                b.expiry_date,
                b.cost_price,
                b.qty_on_hand,
                b.received_at,
                p.name_mm,
                p.name_en
            FROM inventory_batches b
            JOIN products p ON p.id = b.product_id
            ORDER BY b.received_at DESC, b.id DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(history)
    }
}

/// Batches of `product_id` with stock that expire after `today`, FEFO order.
pub(crate) async fn list_allocatable<'e, E>(
    executor: E,
    product_id: i64,
    today: NaiveDate,
) -> DbResult<Vec<Batch>>
where
    E: SqliteExecutor<'e>,
{
    let batches = sqlx::query_as::<_, Batch>(
        r#"
        SELECT id, product_id, batch_no, expiry_date, cost_price, qty_on_hand, received_at
        FROM inventory_batches
        WHERE product_id = ?1 AND qty_on_hand > 0 AND expiry_date > ?2
        ORDER BY expiry_date ASC, id ASC
        "#,
    )
    .bind(product_id)
    .bind(today)
    .fetch_all(executor)
    .await?;

    Ok(batches)
}

/// Takes `qty` units from a batch inside an open transaction.
///
/// Returns `false` (and changes nothing) if the batch holds less than `qty`.
pub(crate) async fn take_stock(conn: &mut SqliteConnection, batch_id: i64, qty: i64) -> DbResult<bool> {
    let result = sqlx::query(
        r#"
        UPDATE inventory_batches
        SET qty_on_hand = qty_on_hand - ?2
        WHERE id = ?1 AND qty_on_hand >= ?2
        "#,
    )
    .bind(batch_id)
    .bind(qty)
    .execute(conn)
    .await?;

    Ok(result.rows_affected() == 1)
}
