//! Per-IP request quota middleware
//!
//! A fixed-window counter per client IP. The count is incremented exactly
//! once per allowed request, under the write lock, so concurrent requests
//! from the same client cannot slip past the limit together.

use axum::{
    body::Body,
    extract::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::{
    collections::HashMap,
    sync::Arc,
    time::{Duration, Instant},
};
use tokio::sync::RwLock;

use crate::error::ApiError;
use crate::middleware::request_log::client_ip;

const WINDOW: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, Copy)]
struct Window {
    started: Instant,
    count: u32,
}

/// Per-client request quota state
#[derive(Clone)]
pub struct QuotaCounter {
    windows: Arc<RwLock<HashMap<String, Window>>>,
    limit: u32,
}

impl QuotaCounter {
    /// Create a counter allowing `limit` requests per client per minute
    pub fn new(limit: u32) -> Self {
        Self {
            windows: Arc::new(RwLock::new(HashMap::new())),
            limit,
        }
    }

    /// Consume one unit of the client's quota. Returns false once the
    /// window is exhausted.
    pub async fn try_consume(&self, key: &str) -> bool {
        let mut windows = self.windows.write().await;
        let now = Instant::now();

        let window = windows.entry(key.to_string()).or_insert(Window {
            started: now,
            count: 0,
        });

        if now.duration_since(window.started) >= WINDOW {
            window.started = now;
            window.count = 0;
        }

        if window.count >= self.limit {
            return false;
        }

        window.count += 1;
        true
    }

    /// Drop windows idle for longer than two periods (call periodically)
    pub async fn prune(&self) {
        let mut windows = self.windows.write().await;
        let now = Instant::now();
        windows.retain(|_, window| now.duration_since(window.started) < WINDOW * 2);
    }
}

/// Create the quota middleware layer
pub fn quota_layer(
    counter: QuotaCounter,
) -> impl Fn(
    Request<Body>,
    Next,
) -> std::pin::Pin<Box<dyn std::future::Future<Output = Response> + Send>>
       + Clone
       + Send {
    move |request: Request<Body>, next: Next| {
        let counter = counter.clone();
        Box::pin(async move {
            let key = client_ip(&request);

            if !counter.try_consume(&key).await {
                tracing::warn!(client = %key, "Request quota exceeded");
                return ApiError::TooManyRequests.into_response();
            }

            next.run(request).await
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_quota_exhausted_within_window() {
        let counter = QuotaCounter::new(3);

        for _ in 0..3 {
            assert!(counter.try_consume("client-a").await);
        }
        assert!(!counter.try_consume("client-a").await);
    }

    #[tokio::test]
    async fn test_clients_have_independent_windows() {
        let counter = QuotaCounter::new(1);

        assert!(counter.try_consume("client-a").await);
        assert!(counter.try_consume("client-b").await);
        assert!(!counter.try_consume("client-a").await);
        assert!(!counter.try_consume("client-b").await);
    }

    #[tokio::test]
    async fn test_prune_keeps_recent_windows() {
        let counter = QuotaCounter::new(5);

        assert!(counter.try_consume("client-a").await);
        counter.prune().await;
        // The fresh window survives pruning and keeps its count
        assert!(counter.try_consume("client-a").await);
        assert_eq!(counter.windows.read().await.get("client-a").unwrap().count, 2);
    }
}
