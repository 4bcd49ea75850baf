//! Order models and status transition rules

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use uuid::Uuid;

use crate::error::ApiError;

/// Order status
#[derive(Debug, Serialize, Deserialize, sqlx::Type, Clone, Copy, PartialEq, Eq)]
#[sqlx(type_name = "order_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    /// Fulfilled statuses are the ones whose entry debits stock
    pub fn is_fulfilled(self) -> bool {
        matches!(self, OrderStatus::Shipped | OrderStatus::Delivered)
    }
}

/// Stock side effect of a status transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StockEffect {
    /// First entry into a fulfilled status: debit every line item
    Debit,
    /// Cancellation after fulfillment: credit every line item back
    Credit,
    /// Plain status write, no stock effect
    None,
}

/// Classify a status transition. Same-status no-ops are handled before
/// classification; stock is debited exactly once per order (first entry
/// into shipped/delivered) and credited exactly once per debit
/// (cancellation from a fulfilled status).
pub fn stock_effect(from: OrderStatus, to: OrderStatus) -> StockEffect {
    if !from.is_fulfilled() && to.is_fulfilled() {
        StockEffect::Debit
    } else if from.is_fulfilled() && to == OrderStatus::Cancelled {
        StockEffect::Credit
    } else {
        StockEffect::None
    }
}

/// A line item within an order. `id` is a line-item identifier, possibly
/// composite (`"<productId>-<variantIndex>"`).
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub id: String,
    pub name: String,
    pub price: Decimal,
    pub quantity: i32,
    pub image: Option<String>,
}

impl OrderItem {
    /// Creation rejects invalid items outright; stock mutation on
    /// existing orders skips them with a warning instead.
    pub fn is_valid(&self) -> bool {
        !self.id.is_empty() && self.quantity > 0
    }
}

/// Order model
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: Uuid,
    pub customer_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub address: String,
    pub city: String,
    pub postal_code: String,
    pub items: Json<Vec<OrderItem>>,
    pub total: Decimal,
    pub status: OrderStatus,
    pub promo_code: Option<String>,
    pub discount: Option<Decimal>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request DTO for creating an order
#[derive(Debug, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    pub customer_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub address: String,
    pub city: String,
    pub postal_code: String,
    pub items: Vec<OrderItem>,
    pub total: Decimal,
    pub promo_code: Option<String>,
    pub discount: Option<Decimal>,
    pub notes: Option<String>,
}

impl CreateOrderRequest {
    /// Strict creation-time validation, with the storefront's French
    /// user-facing messages. Stock sufficiency is checked separately.
    pub fn validate(&self) -> Result<(), ApiError> {
        let contact_complete = !self.customer_name.is_empty()
            && !self.email.is_empty()
            && !self.address.is_empty()
            && !self.city.is_empty()
            && !self.postal_code.is_empty();
        if !contact_complete {
            return Err(ApiError::BadRequest(
                "Informations client incomplètes".to_string(),
            ));
        }

        if self.items.is_empty() {
            return Err(ApiError::BadRequest(
                "La commande ne contient aucun article".to_string(),
            ));
        }

        for item in &self.items {
            if item.id.is_empty() {
                return Err(ApiError::BadRequest(
                    "Article invalide : identifiant manquant".to_string(),
                ));
            }
            if item.quantity <= 0 {
                return Err(ApiError::BadRequest(format!(
                    "Quantité invalide pour {}",
                    item.name
                )));
            }
        }

        if self.total.is_sign_negative() {
            return Err(ApiError::BadRequest("Montant total invalide".to_string()));
        }

        Ok(())
    }
}

/// Request DTO for a status update. `status` is optional so a missing
/// field maps to a 400 rather than a deserialization rejection.
#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: Option<OrderStatus>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn item(id: &str, quantity: i32) -> OrderItem {
        OrderItem {
            id: id.to_string(),
            name: format!("item {id}"),
            price: Decimal::new(1999, 2),
            quantity,
            image: None,
        }
    }

    fn draft() -> CreateOrderRequest {
        CreateOrderRequest {
            customer_name: "Claire Dupont".to_string(),
            email: "claire@example.com".to_string(),
            phone: None,
            address: "12 rue des Lilas".to_string(),
            city: "Lyon".to_string(),
            postal_code: "69003".to_string(),
            items: vec![item("prod1", 2)],
            total: Decimal::new(3998, 2),
            promo_code: None,
            discount: None,
            notes: None,
        }
    }

    #[test]
    fn test_valid_draft_passes() {
        assert!(draft().validate().is_ok());
    }

    #[test]
    fn test_empty_items_rejected() {
        let mut req = draft();
        req.items.clear();
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_missing_item_id_rejected() {
        let mut req = draft();
        req.items[0].id.clear();
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_non_positive_quantity_rejected() {
        let mut req = draft();
        req.items[0].quantity = 0;
        let err = req.validate().unwrap_err();
        assert!(err.to_string().contains("Quantité invalide"));
    }

    #[test]
    fn test_missing_contact_rejected() {
        let mut req = draft();
        req.email.clear();
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_stock_effect_table() {
        use OrderStatus::*;

        // First entry into a fulfilled status debits
        assert_eq!(stock_effect(Pending, Shipped), StockEffect::Debit);
        assert_eq!(stock_effect(Processing, Delivered), StockEffect::Debit);
        assert_eq!(stock_effect(Cancelled, Shipped), StockEffect::Debit);

        // Fulfilled to fulfilled does not debit again
        assert_eq!(stock_effect(Shipped, Delivered), StockEffect::None);

        // Cancellation credits only after fulfillment
        assert_eq!(stock_effect(Shipped, Cancelled), StockEffect::Credit);
        assert_eq!(stock_effect(Delivered, Cancelled), StockEffect::Credit);
        assert_eq!(stock_effect(Pending, Cancelled), StockEffect::None);

        // Plain administrative moves
        assert_eq!(stock_effect(Pending, Processing), StockEffect::None);
        assert_eq!(stock_effect(Cancelled, Pending), StockEffect::None);
    }
}
