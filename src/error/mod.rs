//! Centralized API error handling
//!
//! A unified error type for API responses. Every error is rendered as a
//! JSON `{"error": "<message>"}` body with the matching HTTP status.
//! Storefront-facing stock and promo messages are in French to match the
//! shop's locale; operational messages stay technical.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// API error type with HTTP status code mapping
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    NotFound(String),

    #[error("Trop de requêtes, veuillez réessayer plus tard")]
    TooManyRequests,

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Database error: {0}")]
    Database(String),
}

/// JSON error response body
#[derive(Serialize)]
pub struct ErrorBody {
    pub error: String,
}

impl ApiError {
    /// Get the HTTP status code
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::TooManyRequests => StatusCode::TOO_MANY_REQUESTS,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Insufficient stock for an order line item, naming the item and the
    /// requested/available counts
    pub fn insufficient_stock(name: &str, requested: i32, available: i32) -> Self {
        ApiError::BadRequest(format!(
            "Stock insuffisant pour {name} : demandé {requested}, disponible {available}"
        ))
    }

    pub fn product_not_found() -> Self {
        ApiError::NotFound("Produit introuvable".to_string())
    }

    pub fn variant_not_found() -> Self {
        ApiError::NotFound("Variante de couleur introuvable".to_string())
    }

    pub fn order_not_found() -> Self {
        ApiError::NotFound("Commande introuvable".to_string())
    }

    pub fn promo_not_found() -> Self {
        ApiError::NotFound("Code promo invalide".to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = self.to_string();

        // Log server errors
        if status.is_server_error() {
            tracing::error!(error = %message, status = %status.as_u16(), "Server error occurred");
        } else {
            tracing::debug!(error = %message, status = %status.as_u16(), "Client error occurred");
        }

        (status, Json(ErrorBody { error: message })).into_response()
    }
}

// Convenience conversions from common error types

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => ApiError::NotFound("Ressource introuvable".to_string()),
            _ => ApiError::Database(err.to_string()),
        }
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(err: validator::ValidationErrors) -> Self {
        ApiError::BadRequest(err.to_string())
    }
}

/// Result type alias using ApiError
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            ApiError::BadRequest("test".to_string()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::order_not_found().status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::TooManyRequests.status_code(),
            StatusCode::TOO_MANY_REQUESTS
        );
        assert_eq!(
            ApiError::Internal("test".to_string()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_insufficient_stock_message_names_item_and_counts() {
        let err = ApiError::insufficient_stock("Rouge à lèvres", 6, 5);
        let message = err.to_string();
        assert!(message.contains("Rouge à lèvres"));
        assert!(message.contains("demandé 6"));
        assert!(message.contains("disponible 5"));
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_row_not_found_maps_to_404() {
        let err: ApiError = sqlx::Error::RowNotFound.into();
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
    }
}
