//! Admin token verification
//!
//! Authentication itself lives with the external identity provider; this
//! module only verifies the HS256 tokens it issues and checks the admin
//! claim.

use jsonwebtoken::{decode, errors::ErrorKind, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

/// Token verification errors
#[derive(Debug, Error)]
pub enum AuthTokenError {
    #[error("Token expiré")]
    Expired,

    #[error("Token invalide")]
    Invalid,

    #[error("Droits administrateur requis")]
    NotAdmin,
}

/// Claims carried by an identity-provider token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminClaims {
    pub sub: String,
    #[serde(default)]
    pub admin: bool,
    pub exp: usize,
}

/// Verifier for admin tokens, shared across handlers
#[derive(Clone)]
pub struct AdminAuth {
    secret: Arc<String>,
}

impl AdminAuth {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: Arc::new(secret.into()),
        }
    }

    /// Verify a bearer token and require the admin claim
    pub fn verify(&self, token: &str) -> Result<AdminClaims, AuthTokenError> {
        let data = decode::<AdminClaims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &Validation::new(Algorithm::HS256),
        )
        .map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => AuthTokenError::Expired,
            _ => AuthTokenError::Invalid,
        })?;

        if !data.claims.admin {
            return Err(AuthTokenError::NotAdmin);
        }

        Ok(data.claims)
    }
}
