//! Order confirmation dispatch
//!
//! Mail delivery is delegated to an external transport; this client only
//! posts the confirmation payload to its webhook. The call is best-effort
//! and never affects order creation.

use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use crate::orders::Order;

/// Client for the mail-transport webhook
#[derive(Clone)]
pub struct MailClient {
    http: reqwest::Client,
    webhook_url: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct OrderConfirmation<'a> {
    to: &'a str,
    order_id: Uuid,
    customer_name: &'a str,
    total: Decimal,
}

impl MailClient {
    pub fn new(webhook_url: Option<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            webhook_url,
        }
    }

    /// Send the order confirmation. A missing webhook configuration is a
    /// silent skip, not an error.
    pub async fn send_order_confirmation(&self, order: &Order) -> Result<(), reqwest::Error> {
        let Some(url) = &self.webhook_url else {
            tracing::debug!(order_id = %order.id, "No mail webhook configured, skipping confirmation");
            return Ok(());
        };

        let payload = OrderConfirmation {
            to: &order.email,
            order_id: order.id,
            customer_name: &order.customer_name,
            total: order.total,
        };

        self.http
            .post(url)
            .json(&payload)
            .send()
            .await?
            .error_for_status()?;

        tracing::info!(order_id = %order.id, "Order confirmation dispatched");

        Ok(())
    }
}
