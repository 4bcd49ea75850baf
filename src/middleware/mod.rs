//! Middleware for the Lueur API
//!
//! Request logging, the per-IP request quota, security headers, and the
//! admin-token extractor.

pub mod auth;
mod quota;
mod request_log;
mod security;

pub use auth::AdminUser;
pub use quota::{quota_layer, QuotaCounter};
pub use request_log::request_log;
pub use security::security_headers;
