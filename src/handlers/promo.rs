//! Promo code API handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use validator::Validate;

use crate::error::{ApiError, ApiResult};
use crate::middleware::AdminUser;
use crate::promo::{
    CodeRequest, CreatePromoCodeRequest, PromoCode, PromoCodeSummary, UpdatePromoCodeRequest,
};
use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageResponse {
    pub success: bool,
    pub used_count: i32,
}

fn require_code(request: CodeRequest) -> ApiResult<String> {
    request
        .code
        .filter(|code| !code.trim().is_empty())
        .ok_or_else(|| ApiError::BadRequest("Code promo manquant".to_string()))
}

/// Validate a promo code for checkout (public). Returns the sanitized
/// record on success.
pub async fn validate_promo_code(
    State(app_state): State<AppState>,
    Json(request): Json<CodeRequest>,
) -> ApiResult<Json<PromoCodeSummary>> {
    let code = require_code(request)?;

    let summary = app_state.promo_service.validate_code(&code).await?;

    Ok(Json(summary))
}

/// Record one use of a promo code (public, called at checkout)
pub async fn increment_promo_usage(
    State(app_state): State<AppState>,
    Json(request): Json<CodeRequest>,
) -> ApiResult<Json<UsageResponse>> {
    let code = require_code(request)?;

    let used_count = app_state.promo_service.increment_usage(&code).await?;

    Ok(Json(UsageResponse {
        success: true,
        used_count,
    }))
}

/// List all promo codes (admin)
pub async fn list_promo_codes(
    _admin: AdminUser,
    State(app_state): State<AppState>,
) -> ApiResult<Json<Vec<PromoCode>>> {
    let codes = app_state.promo_service.list_codes().await?;

    Ok(Json(codes))
}

/// Create a promo code (admin)
pub async fn create_promo_code(
    _admin: AdminUser,
    State(app_state): State<AppState>,
    Json(request): Json<CreatePromoCodeRequest>,
) -> ApiResult<(StatusCode, Json<PromoCode>)> {
    request.validate()?;

    let promo = app_state.promo_service.create_code(request).await?;

    Ok((StatusCode::CREATED, Json(promo)))
}

/// Edit a promo code (admin)
pub async fn update_promo_code(
    _admin: AdminUser,
    State(app_state): State<AppState>,
    Path(code): Path<String>,
    Json(request): Json<UpdatePromoCodeRequest>,
) -> ApiResult<Json<PromoCode>> {
    let promo = app_state.promo_service.update_code(&code, request).await?;

    Ok(Json(promo))
}

/// Delete a promo code (admin)
pub async fn delete_promo_code(
    _admin: AdminUser,
    State(app_state): State<AppState>,
    Path(code): Path<String>,
) -> ApiResult<StatusCode> {
    app_state.promo_service.delete_code(&code).await?;

    Ok(StatusCode::NO_CONTENT)
}
