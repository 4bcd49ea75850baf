//! Promo code route definitions

use axum::{
    routing::{delete, get, post, put},
    Router,
};

use crate::handlers::{
    create_promo_code, delete_promo_code, increment_promo_usage, list_promo_codes,
    update_promo_code, validate_promo_code,
};
use crate::state::AppState;

pub fn promo_routes() -> Router<AppState> {
    // Static segments win over :code in axum's router, so validate and
    // increment-usage never collide with the admin paths.
    Router::new()
        .route("/api/promo-codes", get(list_promo_codes))
        .route("/api/promo-codes", post(create_promo_code))
        .route("/api/promo-codes/validate", post(validate_promo_code))
        .route(
            "/api/promo-codes/increment-usage",
            post(increment_promo_usage),
        )
        .route("/api/promo-codes/:code", put(update_promo_code))
        .route("/api/promo-codes/:code", delete(delete_promo_code))
}
