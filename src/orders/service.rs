//! Order service layer - creation and lifecycle transitions
//!
//! Creation validates stock without mutating it; the debit happens on the
//! first transition into a fulfilled status, inside one transaction that
//! locks every affected product row. Cancellation credits are best-effort:
//! per-item failures are logged and skipped, and the status update stands.

use std::collections::BTreeMap;

use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::catalog::{CatalogService, ItemRef, StockRow};
use crate::error::{ApiError, ApiResult};
use crate::mail::MailClient;
use crate::orders::{
    stock_effect, CreateOrderRequest, Order, OrderItem, OrderStatus, StockEffect,
};
use crate::promo::PromoService;

/// Order service for managing the order lifecycle
#[derive(Clone)]
pub struct OrderService {
    pool: PgPool,
    catalog: CatalogService,
    promo: PromoService,
    mail: MailClient,
}

impl OrderService {
    pub fn new(
        pool: PgPool,
        catalog: CatalogService,
        promo: PromoService,
        mail: MailClient,
    ) -> Self {
        Self {
            pool,
            catalog,
            promo,
            mail,
        }
    }

    /// Create an order in `pending` state after validating every item
    /// against current stock. No stock is mutated here; debiting happens
    /// at the fulfillment transition.
    pub async fn create_order(&self, request: CreateOrderRequest) -> ApiResult<Order> {
        request.validate()?;

        for item in &request.items {
            let item_ref = ItemRef::parse(&item.id);
            let available = self.catalog.get_stock(&item_ref).await?.units();
            if available < item.quantity {
                return Err(ApiError::insufficient_stock(
                    &item.name,
                    item.quantity,
                    available,
                ));
            }
        }

        let order = sqlx::query_as::<_, Order>(
            r#"
            INSERT INTO orders (
                id, customer_name, email, phone, address, city, postal_code,
                items, total, status, promo_code, discount, notes
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, 'pending', $10, $11, $12)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&request.customer_name)
        .bind(&request.email)
        .bind(&request.phone)
        .bind(&request.address)
        .bind(&request.city)
        .bind(&request.postal_code)
        .bind(sqlx::types::Json(&request.items))
        .bind(request.total)
        .bind(&request.promo_code)
        .bind(request.discount)
        .bind(&request.notes)
        .fetch_one(&self.pool)
        .await?;

        tracing::info!(order_id = %order.id, total = %order.total, "Order created");

        // Best-effort promo usage accounting: a failure here is logged but
        // never rolls back the order.
        if let Some(code) = &order.promo_code {
            match self.promo.increment_usage(code).await {
                Ok(used_count) => {
                    tracing::debug!(code = %code, used_count, "Promo usage recorded");
                }
                Err(e) => {
                    tracing::warn!(order_id = %order.id, code = %code, error = %e,
                        "Failed to record promo usage");
                }
            }
        }

        // Confirmation email is fire-and-forget
        let mail = self.mail.clone();
        let sent = order.clone();
        tokio::spawn(async move {
            if let Err(e) = mail.send_order_confirmation(&sent).await {
                tracing::warn!(order_id = %sent.id, error = %e,
                    "Failed to send order confirmation");
            }
        });

        Ok(order)
    }

    /// List all orders, newest first
    pub async fn list_orders(&self) -> ApiResult<Vec<Order>> {
        let orders = sqlx::query_as::<_, Order>("SELECT * FROM orders ORDER BY created_at DESC")
            .fetch_all(&self.pool)
            .await?;

        Ok(orders)
    }

    /// Get a single order by id
    pub async fn get_order(&self, id: &Uuid) -> ApiResult<Option<Order>> {
        let order = sqlx::query_as::<_, Order>("SELECT * FROM orders WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(order)
    }

    /// Apply a status transition. Setting the current status again is a
    /// no-op that returns the order unchanged. A fulfillment transition
    /// that fails stock validation aborts entirely; a cancellation always
    /// goes through even if some stock credits fail.
    pub async fn update_status(&self, order_id: &Uuid, new_status: OrderStatus) -> ApiResult<Order> {
        let mut tx = self.pool.begin().await?;

        // The order row lock serializes concurrent transitions on the same
        // order, so the same-status check below also prevents double
        // debits and double credits.
        let order = sqlx::query_as::<_, Order>("SELECT * FROM orders WHERE id = $1 FOR UPDATE")
            .bind(order_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(ApiError::order_not_found)?;

        if order.status == new_status {
            tx.rollback().await?;
            return Ok(order);
        }

        match stock_effect(order.status, new_status) {
            StockEffect::Debit => {
                debit_items(&mut tx, &order.items.0).await?;
                let updated = persist_status(&mut tx, order_id, new_status).await?;
                tx.commit().await?;
                tracing::info!(order_id = %order_id, status = ?new_status,
                    "Order fulfilled, stock debited");
                Ok(updated)
            }
            StockEffect::Credit => {
                let updated = persist_status(&mut tx, order_id, new_status).await?;
                tx.commit().await?;
                // Credits run after the status is durable; failures must
                // not undo the cancellation.
                self.credit_items(&order.items.0).await;
                tracing::info!(order_id = %order_id, "Order cancelled, stock restored");
                Ok(updated)
            }
            StockEffect::None => {
                let updated = persist_status(&mut tx, order_id, new_status).await?;
                tx.commit().await?;
                Ok(updated)
            }
        }
    }

    /// Credit stock back for each item, tolerating per-item failures
    async fn credit_items(&self, items: &[OrderItem]) {
        for item in items {
            if !item.is_valid() {
                tracing::warn!(item_id = %item.id,
                    "Skipping malformed order item during stock credit");
                continue;
            }
            let item_ref = ItemRef::parse(&item.id);
            if let Err(e) = self.catalog.credit_stock(&item_ref, item.quantity).await {
                tracing::warn!(item_id = %item.id, error = %e,
                    "Failed to restore stock for item, continuing");
            }
        }
    }
}

/// Debit every valid line item inside the caller's transaction. Products
/// are locked in sorted id order so two concurrent fulfillments cannot
/// deadlock, and the whole pass aborts on the first insufficiency.
async fn debit_items(tx: &mut Transaction<'_, Postgres>, items: &[OrderItem]) -> ApiResult<()> {
    let valid: Vec<(ItemRef, OrderItem)> = items
        .iter()
        .filter_map(|item| {
            if item.is_valid() {
                Some((ItemRef::parse(&item.id), item.clone()))
            } else {
                tracing::warn!(item_id = %item.id,
                    "Skipping malformed order item during stock debit");
                None
            }
        })
        .collect();

    let mut product_ids: Vec<&str> = valid.iter().map(|(r, _)| r.product_id.as_str()).collect();
    product_ids.sort_unstable();
    product_ids.dedup();

    let mut rows: BTreeMap<String, StockRow> = BTreeMap::new();
    for product_id in product_ids {
        if let Some(row) = CatalogService::stock_row_for_update(&mut *tx, product_id).await? {
            rows.insert(product_id.to_string(), row);
        }
    }

    apply_debits(&mut rows, &valid)?;

    for (product_id, row) in &rows {
        CatalogService::store_stock_row(&mut *tx, product_id, row).await?;
    }

    Ok(())
}

/// Pure debit pass over the locked rows. Items are applied in order, each
/// validated against the running quantity, so stock can never go negative
/// even when several items target the same product or variant.
fn apply_debits(
    rows: &mut BTreeMap<String, StockRow>,
    items: &[(ItemRef, OrderItem)],
) -> ApiResult<()> {
    for (item_ref, item) in items {
        let available = rows
            .get(&item_ref.product_id)
            .and_then(|row| row.units(item_ref.variant_index))
            .unwrap_or(0);

        if available < item.quantity {
            return Err(ApiError::insufficient_stock(
                &item.name,
                item.quantity,
                available,
            ));
        }

        // The scope resolved above, so set_units cannot fail here
        if let Some(row) = rows.get_mut(&item_ref.product_id) {
            row.set_units(item_ref.variant_index, available - item.quantity);
        }
    }

    Ok(())
}

async fn persist_status(
    tx: &mut Transaction<'_, Postgres>,
    order_id: &Uuid,
    status: OrderStatus,
) -> ApiResult<Order> {
    let order = sqlx::query_as::<_, Order>(
        "UPDATE orders SET status = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
    )
    .bind(order_id)
    .bind(status)
    .fetch_one(&mut **tx)
    .await?;

    Ok(order)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::ColorVariant;
    use rust_decimal::Decimal;
    use sqlx::types::Json;

    fn item(id: &str, quantity: i32) -> (ItemRef, OrderItem) {
        (
            ItemRef::parse(id),
            OrderItem {
                id: id.to_string(),
                name: format!("item {id}"),
                price: Decimal::new(1000, 2),
                quantity,
                image: None,
            },
        )
    }

    fn plain_row(quantity: i32) -> StockRow {
        StockRow {
            quantity,
            has_color_variants: false,
            color_variants: None,
        }
    }

    fn variant_row(quantities: &[i32]) -> StockRow {
        StockRow {
            quantity: quantities.iter().sum(),
            has_color_variants: true,
            color_variants: Some(Json(
                quantities
                    .iter()
                    .map(|q| ColorVariant {
                        name: "teinte".to_string(),
                        hex: None,
                        image_url: None,
                        quantity: *q,
                    })
                    .collect(),
            )),
        }
    }

    #[test]
    fn test_apply_debits_exact_stock_succeeds() {
        let mut rows = BTreeMap::from([("p1".to_string(), plain_row(5))]);
        apply_debits(&mut rows, &[item("p1", 5)]).unwrap();
        assert_eq!(rows["p1"].quantity, 0);
    }

    #[test]
    fn test_apply_debits_one_over_fails_and_names_item() {
        let mut rows = BTreeMap::from([("p1".to_string(), plain_row(5))]);
        let err = apply_debits(&mut rows, &[item("p1", 6)]).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("item p1"));
        assert!(message.contains("demandé 6"));
        assert!(message.contains("disponible 5"));
    }

    #[test]
    fn test_apply_debits_variant_scope_recomputes_aggregate() {
        let mut rows = BTreeMap::from([("p1".to_string(), variant_row(&[3, 2]))]);
        apply_debits(&mut rows, &[item("p1-1", 2)]).unwrap();
        let row = &rows["p1"];
        assert_eq!(row.color_variants.as_ref().unwrap().0[1].quantity, 0);
        assert_eq!(row.color_variants.as_ref().unwrap().0[0].quantity, 3);
        assert_eq!(row.quantity, 3);
    }

    #[test]
    fn test_apply_debits_cumulative_on_same_product() {
        // Two items on the same product must not jointly oversell
        let mut rows = BTreeMap::from([("p1".to_string(), plain_row(5))]);
        let err = apply_debits(&mut rows, &[item("p1", 3), item("p1", 3)]).unwrap_err();
        assert!(err.to_string().contains("disponible 2"));
    }

    #[test]
    fn test_apply_debits_missing_product_reads_as_zero() {
        let mut rows = BTreeMap::new();
        let err = apply_debits(&mut rows, &[item("ghost", 1)]).unwrap_err();
        assert!(err.to_string().contains("disponible 0"));
    }

    #[test]
    fn test_apply_debits_invalid_variant_reads_as_zero() {
        let mut rows = BTreeMap::from([("p1".to_string(), variant_row(&[3, 2]))]);
        let err = apply_debits(&mut rows, &[item("p1-9", 1)]).unwrap_err();
        assert!(err.to_string().contains("disponible 0"));
    }
}
