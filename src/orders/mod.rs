//! Orders: models and the order lifecycle state machine

mod model;
mod service;

pub use model::{
    stock_effect, CreateOrderRequest, Order, OrderItem, OrderStatus, StockEffect,
    UpdateStatusRequest,
};
pub use service::OrderService;
