//! API handlers

pub mod orders;
pub mod products;
pub mod promo;

pub use orders::*;
pub use products::*;
pub use promo::*;

use axum::{extract::State, http::StatusCode, Json};
use serde_json::json;

use crate::state::AppState;

/// Liveness plus database reachability
pub async fn health(State(app_state): State<AppState>) -> (StatusCode, Json<serde_json::Value>) {
    match crate::db::check_health(&app_state.db_pool).await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({ "status": "ok", "database": "ok" })),
        ),
        Err(e) => {
            tracing::error!(error = %e, "Health check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({ "status": "degraded", "database": "unreachable" })),
            )
        }
    }
}
