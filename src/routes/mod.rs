//! Route definitions

mod orders;
mod products;
mod promo;

pub use orders::order_routes;
pub use products::product_routes;
pub use promo::promo_routes;
