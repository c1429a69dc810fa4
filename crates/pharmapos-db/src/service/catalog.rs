//! # Product Catalog
//!
//! Creating products and listing them with expiry-aware stock figures.

use chrono::{DateTime, Days, NaiveDate, Utc};
use sqlx::SqlitePool;
use tracing::info;

use crate::error::ServiceResult;
use crate::repository::product::ProductRepository;
use pharmapos_core::validation::validate_new_product;
use pharmapos_core::{CoreError, NewProduct, Product, ProductListing, EXPIRY_WARNING_DAYS};

/// Product catalogue operations.
#[derive(Debug, Clone)]
pub struct ProductCatalog {
    products: ProductRepository,
}

impl ProductCatalog {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            products: ProductRepository::new(pool),
        }
    }

    /// Creates a product and returns its ID.
    ///
    /// `reorder_level` defaults to [`DEFAULT_REORDER_LEVEL`](pharmapos_core::DEFAULT_REORDER_LEVEL).
    pub async fn create_product(&self, product: &NewProduct) -> ServiceResult<i64> {
        self.create_product_at(product, Utc::now()).await
    }

    pub async fn create_product_at(
        &self,
        product: &NewProduct,
        now: DateTime<Utc>,
    ) -> ServiceResult<i64> {
        let reorder_level = validate_new_product(product)?;
        let id = self.products.insert(product, reorder_level, now).await?;

        info!(product_id = id, name_mm = %product.name_mm, "Product created");
        Ok(id)
    }

    /// Gets a product or fails with `ProductNotFound`.
    pub async fn get_product(&self, id: i64) -> ServiceResult<Product> {
        self.products
            .get_by_id(id)
            .await?
            .ok_or_else(|| CoreError::ProductNotFound(id).into())
    }

    /// Lists all products with stock figures as of today (UTC).
    pub async fn list_products(&self) -> ServiceResult<Vec<ProductListing>> {
        self.list_products_as_of(Utc::now().date_naive()).await
    }

    /// Lists all products with stock figures as of `today`.
    pub async fn list_products_as_of(&self, today: NaiveDate) -> ServiceResult<Vec<ProductListing>> {
        let expiring_by = today
            .checked_add_days(Days::new(EXPIRY_WARNING_DAYS as u64))
            .unwrap_or(NaiveDate::MAX);

        Ok(self.products.list_with_stock(today, expiring_by).await?)
    }
}
