//! Admin authentication extractor
//!
//! Extracts and verifies the Bearer token on admin routes. Token issuance
//! belongs to the external identity provider.

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
    response::{IntoResponse, Response},
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};

use crate::auth::{AdminAuth, AdminClaims};
use crate::error::ApiError;

/// Verified admin identity for a request
///
/// # Example
///
/// ```rust,ignore
/// async fn admin_handler(AdminUser(claims): AdminUser) -> impl IntoResponse {
///     format!("hello {}", claims.sub)
/// }
/// ```
#[derive(Debug, Clone)]
pub struct AdminUser(pub AdminClaims);

#[async_trait]
impl<S> FromRequestParts<S> for AdminUser
where
    AdminAuth: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(bearer)) =
            TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state)
                .await
                .map_err(|_| {
                    ApiError::Unauthorized("Authentification requise".to_string()).into_response()
                })?;

        let auth = AdminAuth::from_ref(state);

        let claims = auth
            .verify(bearer.token())
            .map_err(|e| ApiError::Unauthorized(e.to_string()).into_response())?;

        Ok(AdminUser(claims))
    }
}
