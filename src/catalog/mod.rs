//! Product catalog: products, color variants and the stock ledger

mod item_ref;
mod model;
mod service;

pub use item_ref::ItemRef;
pub use model::{
    ColorVariant, CreateProductRequest, Product, StockLevel, StockRow, StockWrite,
    UpdateProductRequest,
};
pub use service::CatalogService;
