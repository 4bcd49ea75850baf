//! Lueur Backend Server
//!
//! HTTP API for the Lueur storefront: catalog and stock, order lifecycle,
//! and promo codes.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use axum::http::{HeaderValue, Method};
use axum::{routing::get, Router};
use tokio::signal;
use tower_http::cors::{Any, CorsLayer};

use lueur_backend::auth::AdminAuth;
use lueur_backend::catalog::CatalogService;
use lueur_backend::config::Config;
use lueur_backend::mail::MailClient;
use lueur_backend::middleware::{quota_layer, request_log, security_headers, QuotaCounter};
use lueur_backend::orders::OrderService;
use lueur_backend::promo::PromoService;
use lueur_backend::state::AppState;
use lueur_backend::{db, handlers, routes};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env().context("Failed to load configuration")?;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_level)),
        )
        .with_target(true)
        .init();

    let db_pool = db::create_pool(&config)
        .await
        .context("Failed to connect to database")?;

    db::run_migrations(&db_pool)
        .await
        .context("Failed to run migrations")?;

    let catalog_service = Arc::new(CatalogService::new(db_pool.clone()));
    let promo_service = Arc::new(PromoService::new(db_pool.clone()));
    let mail_client = MailClient::new(config.mail_webhook_url.clone());
    let order_service = Arc::new(OrderService::new(
        db_pool.clone(),
        (*catalog_service).clone(),
        (*promo_service).clone(),
        mail_client,
    ));

    let admin_auth = AdminAuth::new(config.admin_jwt_secret.clone());

    let app_state = AppState::new(
        catalog_service,
        order_service,
        promo_service,
        admin_auth,
        db_pool,
    );

    let quota = QuotaCounter::new(config.quota_per_minute);

    // Periodic cleanup of idle quota windows
    let quota_pruner = quota.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(120));
        loop {
            interval.tick().await;
            quota_pruner.prune().await;
        }
    });

    let app = Router::new()
        .route("/health", get(handlers::health))
        .merge(routes::order_routes())
        .merge(routes::product_routes())
        .merge(routes::promo_routes())
        .with_state(app_state)
        .layer(axum::middleware::from_fn(security_headers))
        .layer(axum::middleware::from_fn(request_log))
        .layer(axum::middleware::from_fn(move |req, next| {
            let quota = quota.clone();
            quota_layer(quota)(req, next)
        }))
        .layer(configure_cors(&config));

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    tracing::info!("Server shutdown complete");

    Ok(())
}

fn configure_cors(config: &Config) -> CorsLayer {
    let Some(allowed) = config.cors_allowed_origins.as_deref() else {
        tracing::warn!("CORS_ALLOWED_ORIGINS not set, allowing all origins (permissive)");
        return CorsLayer::permissive();
    };

    let origins: Vec<HeaderValue> = allowed
        .split(',')
        .filter_map(|s| s.trim().parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_headers(Any)
}

/// Graceful shutdown on Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown...");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown...");
        }
    }
}
