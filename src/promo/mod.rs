//! Promo codes: validation and usage accounting

mod model;
mod service;

pub use model::{
    normalize_code, CodeRequest, CreatePromoCodeRequest, DiscountType, PromoCode,
    PromoCodeSummary, PromoRejection, UpdatePromoCodeRequest,
};
pub use service::PromoService;
