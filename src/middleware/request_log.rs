//! Request logging middleware

use axum::{body::Body, extract::Request, middleware::Next, response::Response};
use std::time::Instant;

/// Log each request with method, path, client IP, status and timing
pub async fn request_log(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let client_ip = client_ip(&request);

    let start = Instant::now();
    let response = next.run(request).await;
    let duration_ms = start.elapsed().as_millis();

    let status = response.status();
    if status.is_server_error() {
        tracing::error!(%method, %path, %client_ip, status = %status.as_u16(), duration_ms,
            "Request failed");
    } else if status.is_client_error() {
        tracing::warn!(%method, %path, %client_ip, status = %status.as_u16(), duration_ms,
            "Request rejected");
    } else {
        tracing::info!(%method, %path, %client_ip, status = %status.as_u16(), duration_ms,
            "Request completed");
    }

    response
}

/// Client IP from proxy headers, falling back to "unknown"
pub(crate) fn client_ip(request: &Request<Body>) -> String {
    if let Some(forwarded) = request.headers().get("x-forwarded-for") {
        if let Ok(value) = forwarded.to_str() {
            if let Some(ip) = value.split(',').next() {
                return ip.trim().to_string();
            }
        }
    }

    if let Some(real_ip) = request.headers().get("x-real-ip") {
        if let Ok(value) = real_ip.to_str() {
            return value.to_string();
        }
    }

    "unknown".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request as HttpRequest;

    #[test]
    fn test_client_ip_prefers_forwarded_for() {
        let request = HttpRequest::builder()
            .header("x-forwarded-for", "203.0.113.7, 10.0.0.1")
            .header("x-real-ip", "198.51.100.2")
            .body(Body::empty())
            .unwrap();
        assert_eq!(client_ip(&request), "203.0.113.7");
    }

    #[test]
    fn test_client_ip_falls_back_to_real_ip() {
        let request = HttpRequest::builder()
            .header("x-real-ip", "198.51.100.2")
            .body(Body::empty())
            .unwrap();
        assert_eq!(client_ip(&request), "198.51.100.2");
    }

    #[test]
    fn test_client_ip_unknown_without_headers() {
        let request = HttpRequest::builder().body(Body::empty()).unwrap();
        assert_eq!(client_ip(&request), "unknown");
    }
}
