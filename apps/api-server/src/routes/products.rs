//! Product catalogue endpoints.

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::Json;

use pharmapos_core::{Batch, NewProduct, ProductListing};

use super::Created;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// GET /products
pub async fn list_products(State(state): State<AppState>) -> ApiResult<Vec<ProductListing>> {
    let products = state.db.catalog().list_products().await?;
    Ok(Json(products))
}

/// POST /products
pub async fn create_product(
    State(state): State<AppState>,
    payload: Result<Json<NewProduct>, JsonRejection>,
) -> ApiResult<Created> {
    let Json(product) = payload?;
    let id = state.db.catalog().create_product(&product).await?;
    Ok(Json(Created::new(id)))
}

/// GET /products/{id}/batches
pub async fn list_batches(
    State(state): State<AppState>,
    product_id: Result<Path<i64>, PathRejection>,
) -> ApiResult<Vec<Batch>> {
    let Path(product_id) = product_id?;
    let batches = state
        .db
        .inventory()
        .list_available_batches(product_id)
        .await
        .map_err(ApiError::lookup)?;
    Ok(Json(batches))
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use axum::http::StatusCode;
    use serde_json::json;

    #[tokio::test]
    async fn test_create_then_list() {
        let state = test_state().await;

        let (status, body) = post_json(
            app(&state),
            "/products",
            json!({ "name_mm": "ဘိုင်အိုဂျစ်စစ်", "name_en": "Biogesic", "sale_price": 10000 }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        let id = body["id"].as_i64().unwrap();

        seed_batch(&state, id, "B-1", 30, 7000, 4).await;

        let (status, body) = get(app(&state), "/products").await;
        assert_eq!(status, StatusCode::OK);
        let products = body.as_array().unwrap();
        assert_eq!(products.len(), 1);
        assert_eq!(products[0]["name_en"], "Biogesic");
        assert_eq!(products[0]["reorder_level"], 10);
        assert_eq!(products[0]["usable_qty"], 4);
        assert_eq!(products[0]["has_expiring_batch"], true);
        assert_eq!(products[0]["needs_reorder"], true);
    }

    #[tokio::test]
    async fn test_create_rejects_bad_input() {
        let state = test_state().await;

        let (status, body) =
            post_json(app(&state), "/products", json!({ "name_mm": "", "sale_price": 100 })).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "VALIDATION_ERROR");

        let (status, body) = post_json(
            app(&state),
            "/products",
            json!({ "name_mm": "Biogesic", "sale_price": 4_611_686_018_427_387_905_i64 }),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "VALIDATION_ERROR");

        let (_, listing) = get(app(&state), "/products").await;
        assert!(listing.as_array().unwrap().is_empty());

        let (status, body) = post_raw(app(&state), "/products", "{\"name_mm\": ").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "BAD_REQUEST");
    }

    #[tokio::test]
    async fn test_batches_in_expiry_order() {
        let state = test_state().await;
        let product = seed_product(&state, "Tiffy", 5500).await;
        seed_batch(&state, product, "LATE", 300, 3800, 5).await;
        seed_batch(&state, product, "EARLY", 90, 3850, 5).await;

        let (status, body) = get(app(&state), &format!("/products/{product}/batches")).await;
        assert_eq!(status, StatusCode::OK);
        let batches = body.as_array().unwrap();
        assert_eq!(batches[0]["batch_no"], "EARLY");
        assert_eq!(batches[1]["batch_no"], "LATE");
    }

    #[tokio::test]
    async fn test_batches_for_unknown_product() {
        let state = test_state().await;

        let (status, body) = get(app(&state), "/products/99/batches").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], "PRODUCT_NOT_FOUND");

        let (status, _) = get(app(&state), "/products/abc/batches").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
