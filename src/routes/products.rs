//! Product and stock route definitions

use axum::{
    routing::{delete, get, patch, post, put},
    Router,
};

use crate::handlers::{
    create_product, delete_product, get_product, list_products, update_product,
    update_product_stock, update_variant_stock,
};
use crate::state::AppState;

pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/api/products", get(list_products))
        .route("/api/products", post(create_product))
        .route("/api/products/:id", get(get_product))
        .route("/api/products/:id", put(update_product))
        .route("/api/products/:id", delete(delete_product))
        .route("/api/products/:id/stock", patch(update_product_stock))
        .route(
            "/api/products/:id/variants/:index/stock",
            patch(update_variant_stock),
        )
}
