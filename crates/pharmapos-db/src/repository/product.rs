//! # Product Repository
//!
//! Database operations for products.
//!
//! ## Stock Figures in Listings
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  products p  LEFT JOIN  inventory_batches b  GROUP BY p.id              │
//! │                                                                         │
//! │  total_qty          Σ b.qty_on_hand                                     │
//! │  usable_qty         Σ b.qty_on_hand  where b.expiry_date > today        │
//! │  has_expiring_batch any usable b with expiry_date <= today + horizon    │
//! │  needs_reorder      usable_qty <= p.reorder_level                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//! Dates are stored as `YYYY-MM-DD`, so the comparisons above are plain
//! string comparisons in SQLite.

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{SqliteExecutor, SqlitePool};
use tracing::debug;

use crate::error::DbResult;
use pharmapos_core::{NewProduct, Product, ProductListing};

const PRODUCT_COLUMNS: &str =
    "id, name_mm, name_en, barcode, sale_price, reorder_level, created_at";

/// Repository for product database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = ProductRepository::new(pool);
/// let listing = repo.list_with_stock(today, today + Days::new(60)).await?;
/// let product = repo.get_by_id(7).await?;
/// ```
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Gets a product by ID.
    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<Product>> {
        find_by_id(&self.pool, id).await
    }

    /// Inserts a product and returns its ID.
    ///
    /// `reorder_level` is passed separately because the caller has already
    /// applied the default.
    pub async fn insert(
        &self,
        product: &NewProduct,
        reorder_level: i64,
        created_at: DateTime<Utc>,
    ) -> DbResult<i64> {
        debug!(name_mm = %product.name_mm, "Inserting product");

        let result = sqlx::query(
            r#"
            INSERT INTO products (name_mm, name_en, barcode, sale_price, reorder_level, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(product.name_mm.trim())
        .bind(product.name_en.as_deref().map(str::trim))
        .bind(product.barcode.as_deref().map(str::trim))
        .bind(product.sale_price)
        .bind(reorder_level)
        .bind(created_at)
        .execute(&self.pool)
        .await?;

        Ok(result.last_insert_rowid())
    }

    /// Counts all products.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    /// Lists every product with stock figures derived from its batches.
    ///
    /// ## Arguments
    /// * `today` - batches expiring on or before this date are unusable
    /// * `expiring_by` - last day of the "expiring soon" window
    pub async fn list_with_stock(
        &self,
        today: NaiveDate,
        expiring_by: NaiveDate,
    ) -> DbResult<Vec<ProductListing>> {
        let listings = sqlx::query_as::<_, ProductListing>(
            r#"
            SELECT
                p.id,
                p.name_mm,
                p.name_en,
                p.barcode,
                p.sale_price,
                p.reorder_level,
                COALESCE(SUM(b.qty_on_hand), 0) AS total_qty,
                COALESCE(SUM(CASE WHEN b.expiry_date > ?1 THEN b.qty_on_hand ELSE 0 END), 0)
                    AS usable_qty,
                COALESCE(MAX(CASE
                    WHEN b.qty_on_hand > 0 AND b.expiry_date > ?1 AND b.expiry_date <= ?2
                    THEN 1 ELSE 0 END), 0) AS has_expiring_batch,
                CASE
                    WHEN COALESCE(SUM(CASE WHEN b.expiry_date > ?1 THEN b.qty_on_hand ELSE 0 END), 0)
                        <= p.reorder_level
                    THEN 1 ELSE 0 END AS needs_reorder
            FROM products p
            LEFT JOIN inventory_batches b ON b.product_id = p.id
            GROUP BY p.id
            ORDER BY p.name_mm, p.id
            "#,
        )
        .bind(today)
        .bind(expiring_by)
        .fetch_all(&self.pool)
        .await?;

        Ok(listings)
    }
}

/// Looks a product up by ID on any executor (pool or open transaction).
pub(crate) async fn find_by_id<'e, E>(executor: E, id: i64) -> DbResult<Option<Product>>
where
    E: SqliteExecutor<'e>,
{
    let product = sqlx::query_as::<_, Product>(&format!(
        "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ?1"
    ))
    .bind(id)
    .fetch_optional(executor)
    .await?;

    Ok(product)
}
