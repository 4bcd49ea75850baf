//! Order API handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::middleware::AdminUser;
use crate::orders::{CreateOrderRequest, Order, UpdateStatusRequest};
use crate::state::AppState;

/// Place an order (storefront, public)
pub async fn create_order(
    State(app_state): State<AppState>,
    Json(request): Json<CreateOrderRequest>,
) -> ApiResult<(StatusCode, Json<Order>)> {
    let order = app_state.order_service.create_order(request).await?;

    Ok((StatusCode::CREATED, Json(order)))
}

/// List all orders, newest first (admin)
pub async fn list_orders(
    _admin: AdminUser,
    State(app_state): State<AppState>,
) -> ApiResult<Json<Vec<Order>>> {
    let orders = app_state.order_service.list_orders().await?;

    Ok(Json(orders))
}

/// Get a single order by id
pub async fn get_order(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Order>> {
    let order = app_state
        .order_service
        .get_order(&id)
        .await?
        .ok_or_else(ApiError::order_not_found)?;

    Ok(Json(order))
}

/// Apply a status transition (admin)
pub async fn update_order_status(
    _admin: AdminUser,
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateStatusRequest>,
) -> ApiResult<Json<Order>> {
    let status = request
        .status
        .ok_or_else(|| ApiError::BadRequest("Statut manquant".to_string()))?;

    let order = app_state.order_service.update_status(&id, status).await?;

    Ok(Json(order))
}
