//! # Sale Repository
//!
//! Database operations for sales, sale line items and payments.
//!
//! ## Write Path (inside the checkout transaction)
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  1. insert_sale()        → sales row, total 0, fresh invoice number    │
//! │  2. insert_line_item()   → one row per (cart line, batch) allocation   │
//! │  3. insert_payment()     → the single payment                          │
//! │  4. set_totals()         → subtotal = total = Σ line_total             │
//! │                                                                         │
//! │  All four take `&mut SqliteConnection` so they join the caller's       │
//! │  transaction. None of them commits.                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The read path (receipt lookup, profit lines, ledger income) runs on the
//! pool.

use chrono::{DateTime, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use pharmapos_core::report::{LedgerEntry, ProfitLine};
use pharmapos_core::{CoreError, CoreResult, Money, Payment, PaymentMethod, ReceiptLine, Sale};

/// Repository for sale database operations.
#[derive(Debug, Clone)]
pub struct SaleRepository {
    pool: SqlitePool,
}

impl SaleRepository {
    /// Creates a new SaleRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SaleRepository { pool }
    }

    /// Gets a sale by ID.
    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<Sale>> {
        let sale = sqlx::query_as::<_, Sale>(
            r#"
            SELECT id, invoice_no, sold_at, subtotal, discount, total
            FROM sales
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(sale)
    }

    /// Gets a sale's line items with product names, in insertion order.
    pub async fn get_receipt_lines(&self, sale_id: i64) -> DbResult<Vec<ReceiptLine>> {
        let items = sqlx::query_as::<_, ReceiptLine>(
            r#"
            SELECT
                si.id,
                si.sale_id,
                si.product_id,
                si.batch_id,
                si.qty,
                si.unit_price,
                si.line_total,
                si.cost_at_sale,
                p.name_mm,
                p.name_en
            FROM sale_items si
            JOIN products p ON p.id = si.product_id
            WHERE si.sale_id = ?1
            ORDER BY si.id
            "#,
        )
        .bind(sale_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    /// Gets the payment recorded for a sale.
    pub async fn get_payment(&self, sale_id: i64) -> DbResult<Option<Payment>> {
        let payment = sqlx::query_as::<_, Payment>(
            r#"
            SELECT id, sale_id, method, amount
            FROM payments
            WHERE sale_id = ?1
            "#,
        )
        .bind(sale_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(payment)
    }

    /// Sale lines with product names and margin, newest sale first.
    ///
    /// ## Arguments
    /// * `from` - inclusive lower bound on `sold_at`, or unbounded
    /// * `until` - exclusive upper bound on `sold_at`, or unbounded
    pub async fn profit_lines(
        &self,
        from: Option<DateTime<Utc>>,
        until: Option<DateTime<Utc>>,
    ) -> DbResult<Vec<ProfitLine>> {
        let lines = sqlx::query_as::<_, ProfitLine>(
            r#"
            SELECT
                s.sold_at,
                s.invoice_no,
                p.name_mm,
                p.name_en,
                si.qty,
                si.unit_price,
                si.cost_at_sale,
                (si.unit_price - si.cost_at_sale) * si.qty AS profit
            FROM sale_items si
            JOIN sales s ON s.id = si.sale_id
            JOIN products p ON p.id = si.product_id
            WHERE (?1 IS NULL OR s.sold_at >= ?1)
              AND (?2 IS NULL OR s.sold_at < ?2)
            ORDER BY s.sold_at DESC, si.id ASC
            "#,
        )
        .bind(from)
        .bind(until)
        .fetch_all(&self.pool)
        .await?;

        Ok(lines)
    }

    /// Sales in `[from, until)` as ledger income entries.
    pub async fn income_entries(
        &self,
        from: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> DbResult<Vec<LedgerEntry>> {
        let entries = sqlx::query_as::<_, LedgerEntry>(
            r#"
            SELECT
                id,
                sold_at AS time,
                'INCOME' AS kind,
                'Sale #' || invoice_no AS particulars,
                total AS amount
            FROM sales
            WHERE sold_at >= ?1 AND sold_at < ?2
            ORDER BY sold_at, id
            "#,
        )
        .bind(from)
        .bind(until)
        .fetch_all(&self.pool)
        .await?;

        Ok(entries)
    }
}

// =============================================================================
// Transaction Steps
// =============================================================================

/// A line item about to be written. `line_total` is derived in [`NewLineItem::new`].
#[derive(Debug, Clone, Copy)]
pub(crate) struct NewLineItem {
    pub sale_id: i64,
    pub product_id: i64,
    pub batch_id: i64,
    pub qty: i64,
    pub unit_price: Money,
    pub cost_at_sale: Money,
    pub line_total: Money,
}

impl NewLineItem {
    /// Builds the item with `line_total = unit_price × qty`.
    ///
    /// Fails with `AmountOverflow` when the product does not fit in an i64.
    pub fn new(
        sale_id: i64,
        product_id: i64,
        batch_id: i64,
        qty: i64,
        unit_price: Money,
        cost_at_sale: Money,
    ) -> CoreResult<Self> {
        let line_total = unit_price
            .checked_mul_quantity(qty)
            .ok_or_else(|| CoreError::amount_overflow("line total"))?;

        Ok(NewLineItem {
            sale_id,
            product_id,
            batch_id,
            qty,
            unit_price,
            cost_at_sale,
            line_total,
        })
    }
}

/// Inserts the sale header with a zero total and returns its ID.
pub(crate) async fn insert_sale(
    conn: &mut SqliteConnection,
    invoice_no: &str,
    sold_at: DateTime<Utc>,
) -> DbResult<i64> {
    debug!(invoice_no = %invoice_no, "Inserting sale");

    let result = sqlx::query(
        r#"
        INSERT INTO sales (invoice_no, sold_at, subtotal, discount, total)
        VALUES (?1, ?2, 0, 0, 0)
        "#,
    )
    .bind(invoice_no)
    .bind(sold_at)
    .execute(conn)
    .await?;

    Ok(result.last_insert_rowid())
}

/// Records units drawn from one batch.
///
/// ## Snapshot Pattern
/// `unit_price` and `cost_at_sale` are copied in so later price or cost
/// changes never rewrite history.
pub(crate) async fn insert_line_item(conn: &mut SqliteConnection, item: &NewLineItem) -> DbResult<i64> {
    debug!(
        sale_id = item.sale_id,
        product_id = item.product_id,
        batch_id = item.batch_id,
        qty = item.qty,
        "Adding sale item"
    );

    let result = sqlx::query(
        r#"
        INSERT INTO sale_items
            (sale_id, product_id, batch_id, qty, unit_price, line_total, cost_at_sale)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
        "#,
    )
    .bind(item.sale_id)
    .bind(item.product_id)
    .bind(item.batch_id)
    .bind(item.qty)
    .bind(item.unit_price.kyats())
    .bind(item.line_total.kyats())
    .bind(item.cost_at_sale.kyats())
    .execute(conn)
    .await?;

    Ok(result.last_insert_rowid())
}

/// Records the sale's payment.
pub(crate) async fn insert_payment(
    conn: &mut SqliteConnection,
    sale_id: i64,
    method: PaymentMethod,
    amount: Money,
) -> DbResult<i64> {
    debug!(sale_id, method = %method, amount = %amount, "Recording payment");

    let result = sqlx::query("INSERT INTO payments (sale_id, method, amount) VALUES (?1, ?2, ?3)")
        .bind(sale_id)
        .bind(method)
        .bind(amount.kyats())
        .execute(conn)
        .await?;

    Ok(result.last_insert_rowid())
}

/// Writes the final subtotal and total. Discount stays 0.
pub(crate) async fn set_totals(conn: &mut SqliteConnection, sale_id: i64, total: Money) -> DbResult<()> {
    let result = sqlx::query("UPDATE sales SET subtotal = ?2, total = ?2 WHERE id = ?1")
        .bind(sale_id)
        .bind(total.kyats())
        .execute(conn)
        .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::not_found("Sale", sale_id));
    }

    Ok(())
}

/// Generates an invoice number: `INV-YYYYMMDDHHMMSS-XXXXXXXX`.
///
/// ## Format
/// - timestamp of the sale (UTC, second precision) for humans
/// - 8 hex digits of a random UUID so two terminals in the same second
///   never collide (the column is UNIQUE regardless)
///
/// ## Example
/// `INV-20261017093015-5F2A9C1E`
pub(crate) fn generate_invoice_number(sold_at: DateTime<Utc>) -> String {
    let suffix = Uuid::new_v4().simple().to_string().to_uppercase();
    format!("INV-{}-{}", sold_at.format("%Y%m%d%H%M%S"), &suffix[..8])
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_invoice_number_format() {
        let at = Utc.with_ymd_and_hms(2026, 10, 17, 9, 30, 15).unwrap();
        let invoice = generate_invoice_number(at);

        assert!(invoice.starts_with("INV-20261017093015-"));
        assert_eq!(invoice.len(), "INV-20261017093015-".len() + 8);
        assert!(invoice[19..].chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_invoice_numbers_differ_within_a_second() {
        let at = Utc.with_ymd_and_hms(2026, 10, 17, 9, 30, 15).unwrap();
        assert_ne!(generate_invoice_number(at), generate_invoice_number(at));
    }

    #[test]
    fn test_line_total() {
        let item = NewLineItem::new(1, 7, 3, 3, Money::from_kyats(1000), Money::from_kyats(700)).unwrap();
        assert_eq!(item.line_total.kyats(), 3000);
    }

    #[test]
    fn test_line_total_overflow() {
        let huge = Money::from_kyats((1 << 62) + 1);
        let err = NewLineItem::new(1, 7, 3, 4, huge, Money::zero()).unwrap_err();
        assert!(matches!(err, CoreError::AmountOverflow { ref field } if field == "line total"));
    }
}
