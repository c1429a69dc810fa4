//! # Inventory Ledger
//!
//! Owns the batch table: stock comes in through [`InventoryLedger::receive_stock`]
//! and goes out only through the checkout transaction.
//!
//! ## Receiving Stock
//! ```text
//! StockReceipt { product_id, batch_no, expiry_date, cost_price, qty }
//!      │
//!      ├── field rules (batch_no, cost >= 0, 0 < qty) ─► ValidationError
//!      ├── expiry_date <= today ─────────────────────► InvalidExpiry
//!      ├── product missing ──────────────────────────► ProductNotFound
//!      │
//!      ▼
//! INSERT inventory_batches (qty_on_hand = qty)  → batch ID
//! ```

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::SqlitePool;
use tracing::{info, warn};

use crate::error::ServiceResult;
use crate::repository::batch::BatchRepository;
use crate::repository::product::ProductRepository;
use pharmapos_core::validation::{validate_expiry, validate_stock_receipt};
use pharmapos_core::{Batch, CoreError, StockReceipt};

/// Batch-level inventory operations.
#[derive(Debug, Clone)]
pub struct InventoryLedger {
    products: ProductRepository,
    batches: BatchRepository,
}

impl InventoryLedger {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            products: ProductRepository::new(pool.clone()),
            batches: BatchRepository::new(pool),
        }
    }

    /// Records a stock receipt as a new batch and returns the batch ID.
    pub async fn receive_stock(&self, receipt: &StockReceipt) -> ServiceResult<i64> {
        self.receive_stock_at(receipt, Utc::now()).await
    }

    /// [`receive_stock`](Self::receive_stock) with an explicit clock.
    ///
    /// The expiry date must be strictly after `now`'s UTC date.
    pub async fn receive_stock_at(
        &self,
        receipt: &StockReceipt,
        now: DateTime<Utc>,
    ) -> ServiceResult<i64> {
        validate_stock_receipt(receipt)?;

        if let Err(err) = validate_expiry(receipt.expiry_date, now.date_naive()) {
            warn!(
                product_id = receipt.product_id,
                expiry_date = %receipt.expiry_date,
                "Rejected stock receipt with past expiry"
            );
            return Err(err.into());
        }

        if self.products.get_by_id(receipt.product_id).await?.is_none() {
            return Err(CoreError::ProductNotFound(receipt.product_id).into());
        }

        let batch_id = self.batches.insert(receipt, now).await?;

        info!(
            batch_id,
            product_id = receipt.product_id,
            batch_no = %receipt.batch_no,
            qty = receipt.qty,
            "Stock received"
        );
        Ok(batch_id)
    }

    /// A product's batches with stock, earliest expiry first.
    ///
    /// Expired batches are listed too; see
    /// [`list_allocatable_batches`](Self::list_allocatable_batches) for what
    /// checkout can actually sell.
    pub async fn list_available_batches(&self, product_id: i64) -> ServiceResult<Vec<Batch>> {
        self.ensure_product(product_id).await?;
        Ok(self.batches.list_available(product_id).await?)
    }

    /// A product's batches that checkout may draw from on `today`.
    pub async fn list_allocatable_batches(
        &self,
        product_id: i64,
        today: NaiveDate,
    ) -> ServiceResult<Vec<Batch>> {
        self.ensure_product(product_id).await?;
        Ok(self.batches.list_allocatable(product_id, today).await?)
    }

    /// Gets a single batch.
    pub async fn get_batch(&self, batch_id: i64) -> ServiceResult<Option<Batch>> {
        Ok(self.batches.get_by_id(batch_id).await?)
    }

    async fn ensure_product(&self, product_id: i64) -> ServiceResult<()> {
        match self.products.get_by_id(product_id).await? {
            Some(_) => Ok(()),
            None => Err(CoreError::ProductNotFound(product_id).into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ServiceError;
    use crate::service::test_support::*;

    fn receipt(product_id: i64, expiry_date: NaiveDate) -> StockReceipt {
        StockReceipt {
            product_id,
            batch_no: "LOT-1".to_string(),
            expiry_date,
            cost_price: 700,
            qty: 10,
        }
    }

    #[tokio::test]
    async fn test_receive_stock_creates_batch() {
        let db = test_db().await;
        let product = add_product(&db, "Biogesic", 1000).await;

        let batch_id = db
            .inventory()
            .receive_stock_at(&receipt(product, day(2027, 1, 1)), now())
            .await
            .unwrap();

        let batch = db.inventory().get_batch(batch_id).await.unwrap().unwrap();
        assert_eq!(batch.product_id, product);
        assert_eq!(batch.batch_no, "LOT-1");
        assert_eq!(batch.expiry_date, day(2027, 1, 1));
        assert_eq!(batch.qty_on_hand, 10);
        assert_eq!(batch.cost_price, 700);
        assert_eq!(batch.received_at, now());
    }

    #[tokio::test]
    async fn test_expiry_today_or_earlier_is_rejected() {
        let db = test_db().await;
        let product = add_product(&db, "Biogesic", 1000).await;

        for expiry in [today(), day(2026, 1, 1)] {
            let err = db
                .inventory()
                .receive_stock_at(&receipt(product, expiry), now())
                .await
                .unwrap_err();
            assert!(matches!(
                err,
                ServiceError::Domain(CoreError::InvalidExpiry { .. })
            ));
        }

        let batches = db.inventory().list_available_batches(product).await.unwrap();
        assert!(batches.is_empty());
    }

    #[tokio::test]
    async fn test_receive_for_unknown_product() {
        let db = test_db().await;
        let err = db
            .inventory()
            .receive_stock_at(&receipt(99, day(2027, 1, 1)), now())
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Domain(CoreError::ProductNotFound(99))));
    }

    #[tokio::test]
    async fn test_receive_rejects_bad_fields() {
        let db = test_db().await;
        let product = add_product(&db, "Biogesic", 1000).await;

        let zero_qty = StockReceipt {
            qty: 0,
            ..receipt(product, day(2027, 1, 1))
        };
        let err = db.inventory().receive_stock_at(&zero_qty, now()).await.unwrap_err();
        assert!(matches!(err, ServiceError::Domain(CoreError::Validation(_))));

        let no_lot = StockReceipt {
            batch_no: String::new(),
            ..receipt(product, day(2027, 1, 1))
        };
        assert!(db.inventory().receive_stock_at(&no_lot, now()).await.is_err());
    }

    #[tokio::test]
    async fn test_available_vs_allocatable() {
        let db = test_db().await;
        let product = add_product(&db, "Biogesic", 1000).await;

        let late = add_batch(&db, product, "LATE", day(2027, 6, 1), 700, 4).await;
        let early = add_batch(&db, product, "EARLY", day(2027, 1, 1), 650, 2).await;
        let expired = add_expired_batch(&db, product, 3, 600).await;

        let available: Vec<i64> = db
            .inventory()
            .list_available_batches(product)
            .await
            .unwrap()
            .iter()
            .map(|b| b.id)
            .collect();
        assert_eq!(available, vec![expired, early, late]);

        let allocatable: Vec<i64> = db
            .inventory()
            .list_allocatable_batches(product, today())
            .await
            .unwrap()
            .iter()
            .map(|b| b.id)
            .collect();
        assert_eq!(allocatable, vec![early, late]);
    }
}
