//! Billing consumer for the order services.
//!
//! Receives order-created notifications from the broker, runs them
//! through the billing processor, and acknowledges each message. The
//! broker delivers at-least-once, so the processor may see duplicates.

pub mod consumer;
pub mod error;
pub mod processor;

pub use consumer::BillingConsumer;
pub use error::{BillingError, Result};
pub use processor::{BillingProcessor, InMemoryBillingProcessor};
