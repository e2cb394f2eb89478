//! Order domain for the order-taking service.
//!
//! The interesting part is [`OrderService::create_order`]: one logical
//! unit of work spanning a local store transaction and a cross-service
//! notification, without an atomic commit across the two.

pub mod error;
pub mod order;
pub mod service;

pub use error::{OrderError, Result};
pub use order::Order;
pub use service::OrderService;
