//! Product and stock models

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use validator::Validate;

/// Product model
///
/// When `has_color_variants` is true, `quantity` is the sum of all variant
/// quantities; otherwise `quantity` is authoritative on its own.
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: String,
    pub name: String,
    pub brand: Option<String>,
    pub price: Decimal,
    pub category: Option<String>,
    pub subcategory: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub quantity: i32,
    pub has_color_variants: bool,
    pub color_variants: Option<Json<Vec<ColorVariant>>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A color variant, addressed externally by its position in the owning
/// product's variant list (`"<productId>-<variantIndex>"`).
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ColorVariant {
    pub name: String,
    pub hex: Option<String>,
    pub image_url: Option<String>,
    pub quantity: i32,
}

/// Request DTO for creating a product
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductRequest {
    /// Optional explicit id (slug); generated when absent
    pub id: Option<String>,
    #[validate(length(min = 1, message = "name must not be empty"))]
    pub name: String,
    pub brand: Option<String>,
    pub price: Decimal,
    pub category: Option<String>,
    pub subcategory: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub quantity: Option<i32>,
    #[serde(default)]
    pub has_color_variants: bool,
    pub color_variants: Option<Vec<ColorVariant>>,
}

/// Request DTO for replacing a product (PUT semantics)
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProductRequest {
    #[validate(length(min = 1, message = "name must not be empty"))]
    pub name: String,
    pub brand: Option<String>,
    pub price: Decimal,
    pub category: Option<String>,
    pub subcategory: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub quantity: Option<i32>,
    #[serde(default)]
    pub has_color_variants: bool,
    pub color_variants: Option<Vec<ColorVariant>>,
}

/// Result of a stock read.
///
/// `Missing` covers both an absent product and an invalid variant index;
/// it counts as zero sellable units but stays distinguishable from a
/// confirmed zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StockLevel {
    Available(i32),
    Missing,
}

impl StockLevel {
    /// Sellable units, defaulting to 0 when the lookup failed
    pub fn units(self) -> i32 {
        match self {
            StockLevel::Available(n) => n,
            StockLevel::Missing => 0,
        }
    }

    pub fn is_missing(self) -> bool {
        matches!(self, StockLevel::Missing)
    }
}

/// Outcome of a stock write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StockWrite {
    /// New quantity of the addressed variant, when variant-scoped
    pub variant_quantity: Option<i32>,
    /// New aggregate quantity of the product
    pub total_quantity: i32,
}

/// The stock-bearing columns of a product row. Fulfillment transitions
/// operate on these while holding the row lock.
#[derive(Debug, sqlx::FromRow, Clone)]
pub struct StockRow {
    pub quantity: i32,
    pub has_color_variants: bool,
    pub color_variants: Option<Json<Vec<ColorVariant>>>,
}

impl StockRow {
    /// Sellable units for the given scope. `None` means the variant scope
    /// does not resolve (no variants, or index out of bounds).
    pub fn units(&self, variant_index: Option<usize>) -> Option<i32> {
        match variant_index {
            None => Some(self.quantity),
            Some(index) => {
                if !self.has_color_variants {
                    return None;
                }
                let variants = self.color_variants.as_ref()?;
                variants.0.get(index).map(|v| v.quantity)
            }
        }
    }

    /// Replace the quantity for the given scope. Variant-scoped writes
    /// recompute the aggregate as the sum of all variant quantities, so
    /// the variant-sum invariant holds after every write. Returns `None`
    /// when the variant scope does not resolve.
    pub fn set_units(&mut self, variant_index: Option<usize>, units: i32) -> Option<StockWrite> {
        match variant_index {
            None => {
                self.quantity = units;
                Some(StockWrite {
                    variant_quantity: None,
                    total_quantity: units,
                })
            }
            Some(index) => {
                if !self.has_color_variants {
                    return None;
                }
                let variants = &mut self.color_variants.as_mut()?.0;
                let variant = variants.get_mut(index)?;
                variant.quantity = units;
                let total: i32 = variants.iter().map(|v| v.quantity).sum();
                self.quantity = total;
                Some(StockWrite {
                    variant_quantity: Some(units),
                    total_quantity: total,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn variant(quantity: i32) -> ColorVariant {
        ColorVariant {
            name: format!("variant-{quantity}"),
            hex: None,
            image_url: None,
            quantity,
        }
    }

    fn row_with_variants(quantities: &[i32]) -> StockRow {
        StockRow {
            quantity: quantities.iter().sum(),
            has_color_variants: true,
            color_variants: Some(Json(quantities.iter().copied().map(variant).collect())),
        }
    }

    #[test]
    fn test_units_aggregate_scope() {
        let row = StockRow {
            quantity: 7,
            has_color_variants: false,
            color_variants: None,
        };
        assert_eq!(row.units(None), Some(7));
        assert_eq!(row.units(Some(0)), None);
    }

    #[test]
    fn test_units_variant_scope() {
        let row = row_with_variants(&[3, 2]);
        assert_eq!(row.units(Some(0)), Some(3));
        assert_eq!(row.units(Some(1)), Some(2));
        assert_eq!(row.units(Some(2)), None);
        assert_eq!(row.units(None), Some(5));
    }

    #[test]
    fn test_set_units_variant_recomputes_aggregate() {
        let mut row = row_with_variants(&[3, 2]);
        let write = row.set_units(Some(1), 0).unwrap();
        assert_eq!(write.variant_quantity, Some(0));
        assert_eq!(write.total_quantity, 3);
        assert_eq!(row.quantity, 3);
        assert_eq!(row.color_variants.as_ref().unwrap().0[0].quantity, 3);
        assert_eq!(row.color_variants.as_ref().unwrap().0[1].quantity, 0);
    }

    #[test]
    fn test_set_units_out_of_bounds_fails_closed() {
        let mut row = row_with_variants(&[3, 2]);
        assert!(row.set_units(Some(5), 1).is_none());
        // Nothing mutated on failure
        assert_eq!(row.quantity, 5);
    }

    #[test]
    fn test_set_units_aggregate_scope_is_direct() {
        let mut row = StockRow {
            quantity: 4,
            has_color_variants: false,
            color_variants: None,
        };
        let write = row.set_units(None, 10).unwrap();
        assert_eq!(write.variant_quantity, None);
        assert_eq!(write.total_quantity, 10);
        assert_eq!(row.quantity, 10);
    }

    #[test]
    fn test_stock_level_units_default() {
        assert_eq!(StockLevel::Available(4).units(), 4);
        assert_eq!(StockLevel::Missing.units(), 0);
        assert!(StockLevel::Missing.is_missing());
    }
}
