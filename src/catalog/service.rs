//! Catalog service layer - product CRUD and the stock ledger
//!
//! All stock writes go through a transaction with a `SELECT ... FOR UPDATE`
//! row lock, so the variant-sum invariant survives concurrent writers.

use sqlx::{PgConnection, PgPool};
use sqlx::types::Json;
use uuid::Uuid;

use crate::catalog::{
    ColorVariant, CreateProductRequest, ItemRef, Product, StockLevel, StockRow, StockWrite,
    UpdateProductRequest,
};
use crate::error::{ApiError, ApiResult};

/// Catalog service for product and stock management
#[derive(Clone)]
pub struct CatalogService {
    pool: PgPool,
}

impl CatalogService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// List all products, newest first
    pub async fn list_products(&self) -> ApiResult<Vec<Product>> {
        let products =
            sqlx::query_as::<_, Product>("SELECT * FROM products ORDER BY created_at DESC")
                .fetch_all(&self.pool)
                .await?;

        Ok(products)
    }

    /// Get a single product by id
    pub async fn get_product(&self, id: &str) -> ApiResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>("SELECT * FROM products WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(product)
    }

    /// Create a product. With color variants, the aggregate quantity is
    /// derived from the variants rather than taken from the request.
    pub async fn create_product(&self, request: CreateProductRequest) -> ApiResult<Product> {
        if request.price.is_sign_negative() {
            return Err(ApiError::BadRequest(
                "price must be non-negative".to_string(),
            ));
        }

        let id = request
            .id
            .filter(|id| !id.is_empty())
            .unwrap_or_else(|| Uuid::new_v4().to_string());

        let (quantity, variants) =
            resolve_quantities(request.has_color_variants, request.quantity, request.color_variants)?;

        let product = sqlx::query_as::<_, Product>(
            r#"
            INSERT INTO products (
                id, name, brand, price, category, subcategory, description,
                image_url, quantity, has_color_variants, color_variants
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING *
            "#,
        )
        .bind(&id)
        .bind(&request.name)
        .bind(&request.brand)
        .bind(request.price)
        .bind(&request.category)
        .bind(&request.subcategory)
        .bind(&request.description)
        .bind(&request.image_url)
        .bind(quantity)
        .bind(request.has_color_variants)
        .bind(variants)
        .fetch_one(&self.pool)
        .await?;

        tracing::info!(product_id = %product.id, "Product created");

        Ok(product)
    }

    /// Replace a product (PUT semantics). Re-establishes the variant-sum
    /// invariant the same way creation does.
    pub async fn update_product(&self, id: &str, request: UpdateProductRequest) -> ApiResult<Product> {
        if request.price.is_sign_negative() {
            return Err(ApiError::BadRequest(
                "price must be non-negative".to_string(),
            ));
        }

        let (quantity, variants) =
            resolve_quantities(request.has_color_variants, request.quantity, request.color_variants)?;

        let product = sqlx::query_as::<_, Product>(
            r#"
            UPDATE products
            SET name = $2, brand = $3, price = $4, category = $5, subcategory = $6,
                description = $7, image_url = $8, quantity = $9,
                has_color_variants = $10, color_variants = $11, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&request.name)
        .bind(&request.brand)
        .bind(request.price)
        .bind(&request.category)
        .bind(&request.subcategory)
        .bind(&request.description)
        .bind(&request.image_url)
        .bind(quantity)
        .bind(request.has_color_variants)
        .bind(variants)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(ApiError::product_not_found)?;

        Ok(product)
    }

    /// Hard delete, no order-linkage check
    pub async fn delete_product(&self, id: &str) -> ApiResult<()> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(ApiError::product_not_found());
        }

        tracing::info!(product_id = %id, "Product deleted");

        Ok(())
    }

    /// Read the stock level for a line item. Fail-soft: a missing product
    /// or an unresolvable variant scope yields `StockLevel::Missing`
    /// (0 sellable units) rather than an error.
    pub async fn get_stock(&self, item: &ItemRef) -> ApiResult<StockLevel> {
        let row = sqlx::query_as::<_, StockRow>(
            "SELECT quantity, has_color_variants, color_variants FROM products WHERE id = $1",
        )
        .bind(&item.product_id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            tracing::warn!(product_id = %item.product_id, "Stock lookup for missing product");
            return Ok(StockLevel::Missing);
        };

        match row.units(item.variant_index) {
            Some(units) => Ok(StockLevel::Available(units)),
            None => {
                tracing::warn!(
                    product_id = %item.product_id,
                    variant_index = ?item.variant_index,
                    "Stock lookup for unresolvable variant"
                );
                Ok(StockLevel::Missing)
            }
        }
    }

    /// Set the stock level for a line item. Variant-scoped writes replace
    /// the variant quantity, recompute the aggregate and persist both
    /// fields in a single row update under the row lock.
    pub async fn set_stock(&self, item: &ItemRef, quantity: i32) -> ApiResult<StockWrite> {
        if quantity < 0 {
            return Err(ApiError::BadRequest(
                "La quantité doit être un nombre positif ou nul".to_string(),
            ));
        }

        let mut tx = self.pool.begin().await?;

        let mut row = Self::stock_row_for_update(&mut tx, &item.product_id)
            .await?
            .ok_or_else(ApiError::product_not_found)?;

        let write = row
            .set_units(item.variant_index, quantity)
            .ok_or_else(ApiError::variant_not_found)?;

        Self::store_stock_row(&mut tx, &item.product_id, &row).await?;

        tx.commit().await?;

        tracing::info!(
            product_id = %item.product_id,
            variant_index = ?item.variant_index,
            total_quantity = write.total_quantity,
            "Stock updated"
        );

        Ok(write)
    }

    /// Credit units back to a line item's stock (order cancellation).
    /// Fails with `NotFound` when the product or variant no longer
    /// resolves; callers treat that as a skippable condition.
    pub async fn credit_stock(&self, item: &ItemRef, amount: i32) -> ApiResult<StockWrite> {
        let mut tx = self.pool.begin().await?;

        let mut row = Self::stock_row_for_update(&mut tx, &item.product_id)
            .await?
            .ok_or_else(ApiError::product_not_found)?;

        let current = row
            .units(item.variant_index)
            .ok_or_else(ApiError::variant_not_found)?;

        let write = row
            .set_units(item.variant_index, current + amount)
            .ok_or_else(ApiError::variant_not_found)?;

        Self::store_stock_row(&mut tx, &item.product_id, &row).await?;

        tx.commit().await?;

        Ok(write)
    }

    /// Load the stock columns of a product row with a `FOR UPDATE` lock.
    /// The fulfillment path calls this for every affected product inside
    /// its own transaction.
    pub(crate) async fn stock_row_for_update(
        conn: &mut PgConnection,
        product_id: &str,
    ) -> sqlx::Result<Option<StockRow>> {
        sqlx::query_as::<_, StockRow>(
            "SELECT quantity, has_color_variants, color_variants FROM products WHERE id = $1 FOR UPDATE",
        )
        .bind(product_id)
        .fetch_optional(conn)
        .await
    }

    /// Persist the stock columns of a product row in one statement
    pub(crate) async fn store_stock_row(
        conn: &mut PgConnection,
        product_id: &str,
        row: &StockRow,
    ) -> sqlx::Result<()> {
        sqlx::query(
            "UPDATE products SET quantity = $2, color_variants = $3, updated_at = NOW() WHERE id = $1",
        )
        .bind(product_id)
        .bind(row.quantity)
        .bind(&row.color_variants)
        .execute(conn)
        .await?;

        Ok(())
    }
}

/// Derive the aggregate quantity and the stored variant list from an admin
/// product payload. With variants, the aggregate is always the variant sum.
fn resolve_quantities(
    has_color_variants: bool,
    quantity: Option<i32>,
    color_variants: Option<Vec<ColorVariant>>,
) -> ApiResult<(i32, Option<Json<Vec<ColorVariant>>>)> {
    if has_color_variants {
        let variants = color_variants.unwrap_or_default();
        if variants.is_empty() {
            return Err(ApiError::BadRequest(
                "color variants required when hasColorVariants is true".to_string(),
            ));
        }
        if variants.iter().any(|v| v.quantity < 0) {
            return Err(ApiError::BadRequest(
                "variant quantities must be non-negative".to_string(),
            ));
        }
        let total: i32 = variants.iter().map(|v| v.quantity).sum();
        Ok((total, Some(Json(variants))))
    } else {
        let quantity = quantity.unwrap_or(0);
        if quantity < 0 {
            return Err(ApiError::BadRequest(
                "quantity must be non-negative".to_string(),
            ));
        }
        Ok((quantity, None))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn variant(quantity: i32) -> ColorVariant {
        ColorVariant {
            name: "noir".to_string(),
            hex: Some("#000000".to_string()),
            image_url: None,
            quantity,
        }
    }

    #[test]
    fn test_resolve_quantities_sums_variants() {
        let (total, variants) =
            resolve_quantities(true, Some(99), Some(vec![variant(3), variant(2)])).unwrap();
        // The requested aggregate is ignored in favor of the variant sum
        assert_eq!(total, 5);
        assert_eq!(variants.unwrap().0.len(), 2);
    }

    #[test]
    fn test_resolve_quantities_without_variants() {
        let (total, variants) = resolve_quantities(false, Some(12), None).unwrap();
        assert_eq!(total, 12);
        assert!(variants.is_none());
    }

    #[test]
    fn test_resolve_quantities_rejects_empty_variant_list() {
        assert!(resolve_quantities(true, None, Some(vec![])).is_err());
        assert!(resolve_quantities(true, None, None).is_err());
    }

    #[test]
    fn test_resolve_quantities_rejects_negative() {
        assert!(resolve_quantities(false, Some(-1), None).is_err());
        assert!(resolve_quantities(true, None, Some(vec![variant(-2)])).is_err());
    }
}
