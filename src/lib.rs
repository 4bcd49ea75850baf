//! Lueur storefront backend
//!
//! HTTP JSON API for the Lueur cosmetics storefront: product catalog with
//! per-variant stock, order lifecycle with exactly-once stock debits and
//! credits, and promo code validation with usage accounting.

pub mod auth;
pub mod catalog;
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod mail;
pub mod middleware;
pub mod orders;
pub mod promo;
pub mod routes;
pub mod state;
