//! Product and stock API handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::catalog::{CreateProductRequest, ItemRef, Product, UpdateProductRequest};
use crate::error::{ApiError, ApiResult};
use crate::middleware::AdminUser;
use crate::state::AppState;

/// Request body for the stock endpoints. `quantity` is optional so a
/// missing field maps to a 400 rather than a deserialization rejection.
#[derive(Debug, Deserialize)]
pub struct StockQuantityRequest {
    pub quantity: Option<i32>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StockResponse {
    pub success: bool,
    pub quantity: i32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VariantStockResponse {
    pub success: bool,
    pub variant_quantity: i32,
    pub total_quantity: i32,
}

/// List the catalog (public)
pub async fn list_products(State(app_state): State<AppState>) -> ApiResult<Json<Vec<Product>>> {
    let products = app_state.catalog_service.list_products().await?;

    Ok(Json(products))
}

/// Get a single product (public)
pub async fn get_product(
    State(app_state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Product>> {
    let product = app_state
        .catalog_service
        .get_product(&id)
        .await?
        .ok_or_else(ApiError::product_not_found)?;

    Ok(Json(product))
}

/// Create a product (admin)
pub async fn create_product(
    _admin: AdminUser,
    State(app_state): State<AppState>,
    Json(request): Json<CreateProductRequest>,
) -> ApiResult<(StatusCode, Json<Product>)> {
    request.validate()?;

    let product = app_state.catalog_service.create_product(request).await?;

    Ok((StatusCode::CREATED, Json(product)))
}

/// Replace a product (admin)
pub async fn update_product(
    _admin: AdminUser,
    State(app_state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<UpdateProductRequest>,
) -> ApiResult<Json<Product>> {
    request.validate()?;

    let product = app_state.catalog_service.update_product(&id, request).await?;

    Ok(Json(product))
}

/// Delete a product (admin)
pub async fn delete_product(
    _admin: AdminUser,
    State(app_state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    app_state.catalog_service.delete_product(&id).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Set a product's aggregate stock quantity (admin)
pub async fn update_product_stock(
    _admin: AdminUser,
    State(app_state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<StockQuantityRequest>,
) -> ApiResult<Json<StockResponse>> {
    let quantity = request
        .quantity
        .ok_or_else(|| ApiError::BadRequest("Quantité manquante".to_string()))?;

    let item = ItemRef {
        product_id: id,
        variant_index: None,
    };
    let write = app_state.catalog_service.set_stock(&item, quantity).await?;

    Ok(Json(StockResponse {
        success: true,
        quantity: write.total_quantity,
    }))
}

/// Set a color variant's stock quantity (admin). The product aggregate is
/// recomputed from the variants in the same write.
pub async fn update_variant_stock(
    _admin: AdminUser,
    State(app_state): State<AppState>,
    Path((id, index)): Path<(String, usize)>,
    Json(request): Json<StockQuantityRequest>,
) -> ApiResult<Json<VariantStockResponse>> {
    let quantity = request
        .quantity
        .ok_or_else(|| ApiError::BadRequest("Quantité manquante".to_string()))?;

    let item = ItemRef {
        product_id: id,
        variant_index: Some(index),
    };
    let write = app_state.catalog_service.set_stock(&item, quantity).await?;

    Ok(Json(VariantStockResponse {
        success: true,
        variant_quantity: write.variant_quantity.unwrap_or(write.total_quantity),
        total_quantity: write.total_quantity,
    }))
}
