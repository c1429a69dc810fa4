//! # Checkout Engine
//!
//! Turns a cart into a committed sale, or into nothing at all.
//!
//! ## The Sale Transaction
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  validate request (before BEGIN)                                        │
//! │       │                                                                 │
//! │  BEGIN                                                                  │
//! │       │                                                                 │
//! │  1. INSERT sales (total 0)       ← takes SQLite's write lock first     │
//! │       │                                                                 │
//! │  2. for each cart line:                                                 │
//! │       ├── product price            (missing → ProductNotFound)         │
//! │       ├── allocatable batches      (qty > 0, expiry > today, FEFO)     │
//! │       ├── plan_fefo                (short → InsufficientStock)         │
//! │       └── for each allocation:                                          │
//! │             ├── guarded decrement  (lost race → InsufficientStock)     │
//! │             └── INSERT sale_items  (unit_price, cost_at_sale snapshot) │
//! │       │                                                                 │
//! │  3. paid == total?                 (no → PaymentMismatch)              │
//! │  4. INSERT payments                                                     │
//! │  5. UPDATE sales SET subtotal = total = Σ line_total                    │
//! │       │                                                                 │
//! │  COMMIT                      any error above: ROLLBACK (on drop)       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Concurrency
//! The sale header is written before any batch is read, so the transaction
//! holds SQLite's single write lock for its whole read-decrement sequence.
//! A second terminal's checkout waits (busy timeout) and then reads the
//! already-decremented quantities. The guarded decrement and the schema's
//! `CHECK (qty_on_hand >= 0)` back this up.

use chrono::{DateTime, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{error, info, warn};

use crate::error::{ServiceError, ServiceResult};
use crate::repository::sale::{self as sale_repo, NewLineItem, SaleRepository};
use crate::repository::{batch as batch_repo, product as product_repo};
use pharmapos_core::allocation::{plan_fefo, BatchStock};
use pharmapos_core::validation::validate_checkout;
use pharmapos_core::{
    CartLine, CheckoutReceipt, CheckoutRequest, CoreError, Money, PaymentMethod, SaleDetails,
};

/// The sale transaction and receipt lookup.
#[derive(Debug, Clone)]
pub struct CheckoutEngine {
    pool: SqlitePool,
    sales: SaleRepository,
}

impl CheckoutEngine {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            sales: SaleRepository::new(pool.clone()),
            pool,
        }
    }

    /// Checks out a cart at the current time.
    pub async fn checkout(&self, request: &CheckoutRequest) -> ServiceResult<CheckoutReceipt> {
        self.checkout_at(request, Utc::now()).await
    }

    /// Checks out a cart as of `now`.
    ///
    /// `now` stamps the sale and decides which batches have expired
    /// (anything expiring on or before `now`'s UTC date).
    ///
    /// ## Errors
    /// - `Validation` - empty cart, bad quantity, unknown payment method
    /// - `ProductNotFound` / `InsufficientStock` / `PaymentMismatch`
    /// - `Storage` - anything SQLite reports
    ///
    /// On every error nothing is persisted.
    pub async fn checkout_at(
        &self,
        request: &CheckoutRequest,
        now: DateTime<Utc>,
    ) -> ServiceResult<CheckoutReceipt> {
        let method = validate_checkout(request)?;

        match self.run_transaction(request, method, now).await {
            Ok(receipt) => {
                info!(
                    sale_id = receipt.sale_id,
                    invoice_no = %receipt.invoice_no,
                    total = %receipt.total,
                    method = %method,
                    "Sale committed"
                );
                Ok(receipt)
            }
            Err(ServiceError::Domain(err)) => {
                warn!(error = %err, "Checkout rejected");
                Err(ServiceError::Domain(err))
            }
            Err(ServiceError::Storage(err)) => {
                error!(error = %err, "Checkout failed");
                Err(ServiceError::Storage(err))
            }
        }
    }

    async fn run_transaction(
        &self,
        request: &CheckoutRequest,
        method: PaymentMethod,
        now: DateTime<Utc>,
    ) -> ServiceResult<CheckoutReceipt> {
        let mut tx = self.pool.begin().await?;

        let invoice_no = sale_repo::generate_invoice_number(now);
        let sale_id = sale_repo::insert_sale(&mut tx, &invoice_no, now).await?;

        let mut total = Money::zero();
        for line in &request.items {
            let revenue = allocate_line(&mut tx, sale_id, line, now).await?;
            total = total
                .checked_add(revenue)
                .ok_or_else(|| CoreError::amount_overflow("sale total"))?;
        }

        let paid = Money::from_kyats(request.payment.amount);
        if paid != total {
            return Err(CoreError::PaymentMismatch { total, paid }.into());
        }

        sale_repo::insert_payment(&mut tx, sale_id, method, paid).await?;
        sale_repo::set_totals(&mut tx, sale_id, total).await?;

        tx.commit().await?;

        Ok(CheckoutReceipt {
            sale_id,
            invoice_no,
            total,
        })
    }

    /// Everything needed to reprint a receipt. Read-only.
    pub async fn get_sale(&self, sale_id: i64) -> ServiceResult<SaleDetails> {
        let sale = self
            .sales
            .get_by_id(sale_id)
            .await?
            .ok_or(CoreError::SaleNotFound(sale_id))?;

        let items = self.sales.get_receipt_lines(sale_id).await?;
        let payment = self.sales.get_payment(sale_id).await?;

        Ok(SaleDetails {
            sale,
            items,
            payment,
        })
    }
}

/// Fills one cart line from the product's batches, FEFO.
///
/// Returns the revenue the line adds to the sale.
async fn allocate_line(
    conn: &mut SqliteConnection,
    sale_id: i64,
    line: &CartLine,
    now: DateTime<Utc>,
) -> ServiceResult<Money> {
    let product = product_repo::find_by_id(&mut *conn, line.product_id)
        .await?
        .ok_or(CoreError::ProductNotFound(line.product_id))?;

    let batches = batch_repo::list_allocatable(&mut *conn, line.product_id, now.date_naive()).await?;
    let stock: Vec<BatchStock> = batches.iter().map(BatchStock::from).collect();

    let plan = plan_fefo(&stock, line.qty).map_err(|shortfall| shortfall.into_error(line.product_id))?;

    let mut revenue = Money::zero();
    let mut allocated = 0;
    for allocation in plan {
        if !batch_repo::take_stock(&mut *conn, allocation.batch_id, allocation.quantity).await? {
            return Err(CoreError::InsufficientStock {
                product_id: line.product_id,
                available: allocated,
                requested: line.qty,
            }
            .into());
        }

        let item = NewLineItem::new(
            sale_id,
            line.product_id,
            allocation.batch_id,
            allocation.quantity,
            product.price(),
            Money::from_kyats(allocation.cost_price),
        )?;
        sale_repo::insert_line_item(&mut *conn, &item).await?;

        revenue = revenue
            .checked_add(item.line_total)
            .ok_or_else(|| CoreError::amount_overflow("line total"))?;
        allocated += allocation.quantity;
    }

    Ok(revenue)
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::test_support::*;
    use crate::{Database, DbConfig};
    use pharmapos_core::{PaymentTender, SaleLineItem};

    fn cart(lines: &[(i64, i64)], method: &str, amount: i64) -> CheckoutRequest {
        CheckoutRequest {
            items: lines
                .iter()
                .map(|&(product_id, qty)| CartLine { product_id, qty })
                .collect(),
            payment: PaymentTender {
                method: method.to_string(),
                amount,
            },
        }
    }

    async fn qty_on_hand(db: &Database, batch_id: i64) -> i64 {
        db.inventory().get_batch(batch_id).await.unwrap().unwrap().qty_on_hand
    }

    async fn line_items(db: &Database, sale_id: i64) -> Vec<SaleLineItem> {
        sqlx::query_as::<_, SaleLineItem>(
            "SELECT id, sale_id, product_id, batch_id, qty, unit_price, line_total, cost_at_sale
             FROM sale_items WHERE sale_id = ?1 ORDER BY id",
        )
        .bind(sale_id)
        .fetch_all(db.pool())
        .await
        .unwrap()
    }

    async fn row_count(db: &Database, table: &str) -> i64 {
        sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {table}"))
            .fetch_one(db.pool())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_checkout_draws_from_earliest_expiry() {
        let db = test_db().await;
        let product = add_product(&db, "Biogesic", 1000).await;
        let late = add_batch(&db, product, "LATE", day(2027, 6, 1), 750, 10).await;
        let early = add_batch(&db, product, "EARLY", day(2027, 1, 1), 700, 10).await;

        let receipt = db
            .checkout()
            .checkout_at(&cart(&[(product, 3)], "CASH", 3000), now())
            .await
            .unwrap();

        assert_eq!(receipt.total.kyats(), 3000);
        assert!(receipt.invoice_no.starts_with("INV-20261017090000-"));
        assert_eq!(qty_on_hand(&db, early).await, 7);
        assert_eq!(qty_on_hand(&db, late).await, 10);

        let items = line_items(&db, receipt.sale_id).await;
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].batch_id, early);
        assert_eq!(items[0].cost_at_sale, 700);
        assert_eq!(items[0].unit_price, 1000);
    }

    #[tokio::test]
    async fn test_line_spanning_batches_splits_into_items() {
        let db = test_db().await;
        let product = add_product(&db, "Tiffy", 5500).await;
        let first = add_batch(&db, product, "T-1", day(2027, 1, 1), 3800, 2).await;
        let second = add_batch(&db, product, "T-2", day(2027, 2, 1), 3900, 5).await;

        let receipt = db
            .checkout()
            .checkout_at(&cart(&[(product, 4)], "KPAY", 22_000), now())
            .await
            .unwrap();

        let items = line_items(&db, receipt.sale_id).await;
        let split: Vec<(i64, i64, i64)> = items
            .iter()
            .map(|i| (i.batch_id, i.qty, i.cost_at_sale))
            .collect();
        assert_eq!(split, vec![(first, 2, 3800), (second, 2, 3900)]);

        let persisted_total: i64 = items.iter().map(|i| i.line_total).sum();
        assert_eq!(persisted_total, receipt.total.kyats());
        assert_eq!(qty_on_hand(&db, first).await, 0);
        assert_eq!(qty_on_hand(&db, second).await, 3);
    }

    #[tokio::test]
    async fn test_insufficient_stock_rolls_back_whole_cart() {
        let db = test_db().await;
        let plenty = add_product(&db, "Silo", 1000).await;
        let scarce = add_product(&db, "Enervon C", 9500).await;
        let plenty_batch = add_batch(&db, plenty, "S-1", day(2027, 1, 1), 700, 50).await;
        let scarce_batch = add_batch(&db, scarce, "E-1", day(2027, 1, 1), 6650, 5).await;

        // The first line would succeed on its own.
        let request = cart(&[(plenty, 2), (scarce, 1000)], "CASH", 9_502_000);
        let err = db.checkout().checkout_at(&request, now()).await.unwrap_err();

        assert!(matches!(
            err,
            ServiceError::Domain(CoreError::InsufficientStock {
                available: 5,
                requested: 1000,
                ..
            })
        ));
        assert_eq!(qty_on_hand(&db, plenty_batch).await, 50);
        assert_eq!(qty_on_hand(&db, scarce_batch).await, 5);
        assert_eq!(row_count(&db, "sales").await, 0);
        assert_eq!(row_count(&db, "sale_items").await, 0);
        assert_eq!(row_count(&db, "payments").await, 0);
    }

    #[tokio::test]
    async fn test_expired_batches_are_not_sold() {
        let db = test_db().await;
        let product = add_product(&db, "Parasafe", 5300).await;
        let expired = add_expired_batch(&db, product, 10, 3700).await;
        let fresh = add_batch(&db, product, "P-1", day(2027, 1, 1), 3710, 1).await;

        let err = db
            .checkout()
            .checkout_at(&cart(&[(product, 2)], "CASH", 10_600), now())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ServiceError::Domain(CoreError::InsufficientStock { available: 1, .. })
        ));

        db.checkout()
            .checkout_at(&cart(&[(product, 1)], "CASH", 5300), now())
            .await
            .unwrap();
        assert_eq!(qty_on_hand(&db, expired).await, 10);
        assert_eq!(qty_on_hand(&db, fresh).await, 0);
    }

    #[tokio::test]
    async fn test_unknown_product_rolls_back() {
        let db = test_db().await;
        let product = add_product(&db, "Biogesic", 1000).await;
        let batch = add_batch(&db, product, "B-1", day(2027, 1, 1), 700, 5).await;

        let err = db
            .checkout()
            .checkout_at(&cart(&[(product, 1), (404, 1)], "CASH", 2000), now())
            .await
            .unwrap_err();

        assert!(matches!(err, ServiceError::Domain(CoreError::ProductNotFound(404))));
        assert_eq!(qty_on_hand(&db, batch).await, 5);
        assert_eq!(row_count(&db, "sales").await, 0);
    }

    #[tokio::test]
    async fn test_payment_must_match_total() {
        let db = test_db().await;
        let product = add_product(&db, "Biogesic", 1000).await;
        let batch = add_batch(&db, product, "B-1", day(2027, 1, 1), 700, 5).await;

        let err = db
            .checkout()
            .checkout_at(&cart(&[(product, 3)], "WAVE", 2500), now())
            .await
            .unwrap_err();

        match err {
            ServiceError::Domain(CoreError::PaymentMismatch { total, paid }) => {
                assert_eq!(total.kyats(), 3000);
                assert_eq!(paid.kyats(), 2500);
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(qty_on_hand(&db, batch).await, 5);
        assert_eq!(row_count(&db, "sales").await, 0);
    }

    #[tokio::test]
    async fn test_overflowing_line_total_rolls_back() {
        let db = test_db().await;
        let product = add_product(&db, "Biogesic", 1000).await;
        let batch = add_batch(&db, product, "B-1", day(2027, 1, 1), 700, 10).await;

        // the catalogue caps prices, so write the row directly
        sqlx::query("UPDATE products SET sale_price = ?2 WHERE id = ?1")
            .bind(product)
            .bind((1_i64 << 62) + 1)
            .execute(db.pool())
            .await
            .unwrap();

        let err = db
            .checkout()
            .checkout_at(&cart(&[(product, 4)], "CASH", 4), now())
            .await
            .unwrap_err();

        assert!(matches!(err, ServiceError::Domain(CoreError::AmountOverflow { .. })));
        assert_eq!(qty_on_hand(&db, batch).await, 10);
        assert_eq!(row_count(&db, "sales").await, 0);
        assert_eq!(row_count(&db, "sale_items").await, 0);
    }

    #[tokio::test]
    async fn test_invalid_request_is_rejected_before_transaction() {
        let db = test_db().await;
        let product = add_product(&db, "Biogesic", 1000).await;
        add_batch(&db, product, "B-1", day(2027, 1, 1), 700, 5).await;

        for request in [
            cart(&[], "CASH", 1000),
            cart(&[(product, 0)], "CASH", 1000),
            cart(&[(product, 1)], "VISA", 1000),
            cart(&[(product, 1)], "CASH", 0),
        ] {
            let err = db.checkout().checkout_at(&request, now()).await.unwrap_err();
            assert!(matches!(err, ServiceError::Domain(CoreError::Validation(_))));
        }
        assert_eq!(row_count(&db, "sales").await, 0);
    }

    #[tokio::test]
    async fn test_same_product_on_two_lines() {
        let db = test_db().await;
        let product = add_product(&db, "Biogesic", 1000).await;
        let first = add_batch(&db, product, "B-1", day(2027, 1, 1), 700, 3).await;
        let second = add_batch(&db, product, "B-2", day(2027, 2, 1), 720, 3).await;

        db.checkout()
            .checkout_at(&cart(&[(product, 2), (product, 2)], "CASH", 4000), now())
            .await
            .unwrap();

        assert_eq!(qty_on_hand(&db, first).await, 0);
        assert_eq!(qty_on_hand(&db, second).await, 2);
    }

    #[tokio::test]
    async fn test_receipt_lookup_is_stable() {
        let db = test_db().await;
        let product = add_product(&db, "Ameprolol", 30_000).await;
        add_batch(&db, product, "A-1", day(2027, 1, 1), 21_000, 5).await;

        let receipt = db
            .checkout()
            .checkout_at(&cart(&[(product, 2)], "KPAY", 60_000), now())
            .await
            .unwrap();

        let first = db.checkout().get_sale(receipt.sale_id).await.unwrap();
        let second = db.checkout().get_sale(receipt.sale_id).await.unwrap();
        assert_eq!(first, second);

        assert_eq!(first.sale.invoice_no, receipt.invoice_no);
        assert_eq!(first.sale.total, 60_000);
        assert_eq!(first.sale.subtotal, 60_000);
        assert_eq!(first.sale.discount, 0);
        assert_eq!(first.sale.sold_at, now());
        assert_eq!(first.items.len(), 1);
        assert_eq!(first.items[0].name_mm, "Ameprolol");

        let payment = first.payment.unwrap();
        assert_eq!(payment.method, PaymentMethod::Kpay);
        assert_eq!(payment.amount, 60_000);
    }

    #[tokio::test]
    async fn test_missing_sale() {
        let db = test_db().await;
        let err = db.checkout().get_sale(1).await.unwrap_err();
        assert!(matches!(err, ServiceError::Domain(CoreError::SaleNotFound(1))));
    }

    #[tokio::test]
    async fn test_concurrent_checkouts_never_oversell() {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::new(DbConfig::new(dir.path().join("race.db")).max_connections(4))
            .await
            .unwrap();

        let product = add_product(&db, "Biogesic", 1000).await;
        let batch = add_batch(&db, product, "B-1", day(2027, 1, 1), 700, 5).await;

        let request = cart(&[(product, 4)], "CASH", 4000);
        let engine_a = db.checkout();
        let engine_b = db.checkout();
        let (a, b) = tokio::join!(
            engine_a.checkout_at(&request, now()),
            engine_b.checkout_at(&request, now()),
        );

        let committed = [a.is_ok(), b.is_ok()].iter().filter(|ok| **ok).count();
        assert_eq!(committed, 1);

        let failure = if a.is_err() { a.unwrap_err() } else { b.unwrap_err() };
        assert!(matches!(
            failure,
            ServiceError::Domain(CoreError::InsufficientStock { .. })
        ));
        assert_eq!(qty_on_hand(&db, batch).await, 1);
        assert_eq!(row_count(&db, "sales").await, 1);

        db.close().await;
    }
}
