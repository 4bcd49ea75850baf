//! Promo code service layer - validation, usage accounting and admin CRUD

use chrono::Utc;
use sqlx::PgPool;

use crate::error::{ApiError, ApiResult};
use crate::promo::{
    normalize_code, CreatePromoCodeRequest, PromoCode, PromoCodeSummary, UpdatePromoCodeRequest,
};

/// Promo code service
#[derive(Clone)]
pub struct PromoService {
    pool: PgPool,
}

impl PromoService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Validate a code for use. Rejections are checked in a fixed order
    /// (not found, inactive, expired, limit reached) and surfaced with the
    /// storefront's French messages. Success returns the sanitized record.
    pub async fn validate_code(&self, raw_code: &str) -> ApiResult<PromoCodeSummary> {
        let code = normalize_code(raw_code);

        let promo = self
            .find_code(&code)
            .await?
            .ok_or_else(ApiError::promo_not_found)?;

        promo
            .check_usable(Utc::now())
            .map_err(|rejection| ApiError::BadRequest(rejection.message().to_string()))?;

        Ok(PromoCodeSummary::from(promo))
    }

    /// Record one use of a code. The increment is a single atomic UPDATE,
    /// so concurrent orders cannot lose counts.
    pub async fn increment_usage(&self, raw_code: &str) -> ApiResult<i32> {
        let code = normalize_code(raw_code);

        let used_count: Option<(i32,)> = sqlx::query_as(
            r#"
            UPDATE promo_codes
            SET used_count = used_count + 1, updated_at = NOW()
            WHERE code = $1
            RETURNING used_count
            "#,
        )
        .bind(&code)
        .fetch_optional(&self.pool)
        .await?;

        let (used_count,) = used_count.ok_or_else(ApiError::promo_not_found)?;

        Ok(used_count)
    }

    /// List all promo codes (admin view, unsanitized)
    pub async fn list_codes(&self) -> ApiResult<Vec<PromoCode>> {
        let codes =
            sqlx::query_as::<_, PromoCode>("SELECT * FROM promo_codes ORDER BY created_at DESC")
                .fetch_all(&self.pool)
                .await?;

        Ok(codes)
    }

    /// Create a promo code. The code is stored uppercase.
    pub async fn create_code(&self, request: CreatePromoCodeRequest) -> ApiResult<PromoCode> {
        let code = normalize_code(&request.code);

        let promo = sqlx::query_as::<_, PromoCode>(
            r#"
            INSERT INTO promo_codes (
                code, discount_type, value, min_purchase, expiry_date, active, usage_limit
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(&code)
        .bind(request.discount_type)
        .bind(request.value)
        .bind(request.min_purchase)
        .bind(request.expiry_date)
        .bind(request.active.unwrap_or(true))
        .bind(request.usage_limit)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                ApiError::BadRequest("Ce code promo existe déjà".to_string())
            }
            _ => e.into(),
        })?;

        tracing::info!(code = %promo.code, "Promo code created");

        Ok(promo)
    }

    /// Edit a promo code. Usage count is not editable.
    pub async fn update_code(
        &self,
        raw_code: &str,
        request: UpdatePromoCodeRequest,
    ) -> ApiResult<PromoCode> {
        let code = normalize_code(raw_code);

        let promo = sqlx::query_as::<_, PromoCode>(
            r#"
            UPDATE promo_codes
            SET discount_type = $2, value = $3, min_purchase = $4,
                expiry_date = $5, active = $6, usage_limit = $7, updated_at = NOW()
            WHERE code = $1
            RETURNING *
            "#,
        )
        .bind(&code)
        .bind(request.discount_type)
        .bind(request.value)
        .bind(request.min_purchase)
        .bind(request.expiry_date)
        .bind(request.active)
        .bind(request.usage_limit)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(ApiError::promo_not_found)?;

        Ok(promo)
    }

    /// Delete a promo code
    pub async fn delete_code(&self, raw_code: &str) -> ApiResult<()> {
        let code = normalize_code(raw_code);

        let result = sqlx::query("DELETE FROM promo_codes WHERE code = $1")
            .bind(&code)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(ApiError::promo_not_found());
        }

        tracing::info!(code = %code, "Promo code deleted");

        Ok(())
    }

    async fn find_code(&self, code: &str) -> ApiResult<Option<PromoCode>> {
        let promo = sqlx::query_as::<_, PromoCode>("SELECT * FROM promo_codes WHERE code = $1")
            .bind(code)
            .fetch_optional(&self.pool)
            .await?;

        Ok(promo)
    }
}
