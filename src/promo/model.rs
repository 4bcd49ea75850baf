//! Promo code models

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Discount type
#[derive(Debug, Serialize, Deserialize, sqlx::Type, Clone, Copy, PartialEq, Eq)]
#[sqlx(type_name = "promo_discount_type", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum DiscountType {
    Percentage,
    Fixed,
}

/// Promo code model. Codes are stored uppercase.
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, Clone)]
#[serde(rename_all = "camelCase")]
pub struct PromoCode {
    pub code: String,
    #[serde(rename = "type")]
    pub discount_type: DiscountType,
    pub value: Decimal,
    pub min_purchase: Option<Decimal>,
    pub expiry_date: Option<DateTime<Utc>>,
    pub active: bool,
    pub usage_limit: Option<i32>,
    pub used_count: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Why a promo code cannot be used. Checks run in a fixed order and the
/// first failure wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromoRejection {
    Inactive,
    Expired,
    LimitReached,
}

impl PromoRejection {
    /// Storefront-facing message (French)
    pub fn message(self) -> &'static str {
        match self {
            PromoRejection::Inactive => "Ce code promo n'est plus actif",
            PromoRejection::Expired => "Ce code promo a expiré",
            PromoRejection::LimitReached => "Ce code promo a atteint sa limite d'utilisation",
        }
    }
}

impl PromoCode {
    /// Check applicability: inactive, then expired, then usage limit.
    /// Minimum purchase is the cart's concern and is returned to the
    /// caller in the sanitized summary instead.
    pub fn check_usable(&self, now: DateTime<Utc>) -> Result<(), PromoRejection> {
        if !self.active {
            return Err(PromoRejection::Inactive);
        }
        if let Some(expiry) = self.expiry_date {
            if expiry < now {
                return Err(PromoRejection::Expired);
            }
        }
        if let Some(limit) = self.usage_limit {
            if self.used_count >= limit {
                return Err(PromoRejection::LimitReached);
            }
        }
        Ok(())
    }
}

/// Sanitized promo record returned by validation: no usage counters or
/// internal flags.
#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PromoCodeSummary {
    pub code: String,
    #[serde(rename = "type")]
    pub discount_type: DiscountType,
    pub value: Decimal,
    pub min_purchase: Option<Decimal>,
}

impl From<PromoCode> for PromoCodeSummary {
    fn from(promo: PromoCode) -> Self {
        Self {
            code: promo.code,
            discount_type: promo.discount_type,
            value: promo.value,
            min_purchase: promo.min_purchase,
        }
    }
}

/// Normalize a raw code for lookup and storage
pub fn normalize_code(raw: &str) -> String {
    raw.trim().to_uppercase()
}

/// Request DTO carrying a code (`validate` and `increment-usage`)
#[derive(Debug, Deserialize)]
pub struct CodeRequest {
    pub code: Option<String>,
}

/// Request DTO for creating a promo code
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreatePromoCodeRequest {
    #[validate(length(min = 1, message = "code must not be empty"))]
    pub code: String,
    #[serde(rename = "type")]
    pub discount_type: DiscountType,
    pub value: Decimal,
    pub min_purchase: Option<Decimal>,
    pub expiry_date: Option<DateTime<Utc>>,
    pub active: Option<bool>,
    pub usage_limit: Option<i32>,
}

/// Request DTO for editing a promo code
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePromoCodeRequest {
    #[serde(rename = "type")]
    pub discount_type: DiscountType,
    pub value: Decimal,
    pub min_purchase: Option<Decimal>,
    pub expiry_date: Option<DateTime<Utc>>,
    pub active: bool,
    pub usage_limit: Option<i32>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn promo() -> PromoCode {
        let now = Utc::now();
        PromoCode {
            code: "SAVE10".to_string(),
            discount_type: DiscountType::Percentage,
            value: Decimal::new(10, 0),
            min_purchase: None,
            expiry_date: None,
            active: true,
            usage_limit: None,
            used_count: 0,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_usable_code() {
        assert!(promo().check_usable(Utc::now()).is_ok());
    }

    #[test]
    fn test_inactive_rejected() {
        let mut p = promo();
        p.active = false;
        assert_eq!(p.check_usable(Utc::now()), Err(PromoRejection::Inactive));
    }

    #[test]
    fn test_expired_rejected() {
        let mut p = promo();
        p.expiry_date = Some(Utc::now() - Duration::days(1));
        assert_eq!(p.check_usable(Utc::now()), Err(PromoRejection::Expired));
    }

    #[test]
    fn test_future_expiry_accepted() {
        let mut p = promo();
        p.expiry_date = Some(Utc::now() + Duration::days(30));
        assert!(p.check_usable(Utc::now()).is_ok());
    }

    #[test]
    fn test_limit_reached_rejected() {
        let mut p = promo();
        p.usage_limit = Some(1);
        p.used_count = 1;
        assert_eq!(
            p.check_usable(Utc::now()),
            Err(PromoRejection::LimitReached)
        );
    }

    #[test]
    fn test_under_limit_accepted() {
        let mut p = promo();
        p.usage_limit = Some(5);
        p.used_count = 4;
        assert!(p.check_usable(Utc::now()).is_ok());
    }

    #[test]
    fn test_first_rejection_wins() {
        // Inactive is checked before expiry and limit
        let mut p = promo();
        p.active = false;
        p.expiry_date = Some(Utc::now() - Duration::days(1));
        p.usage_limit = Some(1);
        p.used_count = 1;
        assert_eq!(p.check_usable(Utc::now()), Err(PromoRejection::Inactive));
    }

    #[test]
    fn test_normalize_code() {
        assert_eq!(normalize_code("  save10 "), "SAVE10");
        assert_eq!(normalize_code("Été2024"), "ÉTÉ2024");
    }

    #[test]
    fn test_summary_drops_internal_fields() {
        let json = serde_json::to_value(PromoCodeSummary::from(promo())).unwrap();
        assert_eq!(json["code"], "SAVE10");
        assert_eq!(json["type"], "percentage");
        assert!(json.get("usedCount").is_none());
        assert!(json.get("active").is_none());
        assert!(json.get("usageLimit").is_none());
    }
}
