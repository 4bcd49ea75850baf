//! Order route definitions

use axum::{
    routing::{get, patch, post},
    Router,
};

use crate::handlers::{create_order, get_order, list_orders, update_order_status};
use crate::state::AppState;

pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/api/orders", post(create_order))
        .route("/api/orders", get(list_orders))
        .route("/api/orders/:id", get(get_order))
        .route("/api/orders/:id", patch(update_order_status))
}
