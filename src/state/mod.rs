//! Application state shared across handlers

use std::sync::Arc;

use axum::extract::FromRef;
use sqlx::PgPool;

use crate::auth::AdminAuth;
use crate::catalog::CatalogService;
use crate::orders::OrderService;
use crate::promo::PromoService;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub catalog_service: Arc<CatalogService>,
    pub order_service: Arc<OrderService>,
    pub promo_service: Arc<PromoService>,
    pub admin_auth: AdminAuth,
    pub db_pool: PgPool,
}

impl AppState {
    pub fn new(
        catalog_service: Arc<CatalogService>,
        order_service: Arc<OrderService>,
        promo_service: Arc<PromoService>,
        admin_auth: AdminAuth,
        db_pool: PgPool,
    ) -> Self {
        Self {
            catalog_service,
            order_service,
            promo_service,
            admin_auth,
            db_pool,
        }
    }
}

impl FromRef<AppState> for AdminAuth {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.admin_auth.clone()
    }
}

impl FromRef<AppState> for Arc<CatalogService> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.catalog_service.clone()
    }
}

impl FromRef<AppState> for Arc<OrderService> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.order_service.clone()
    }
}

impl FromRef<AppState> for Arc<PromoService> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.promo_service.clone()
    }
}

impl FromRef<AppState> for PgPool {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.db_pool.clone()
    }
}
