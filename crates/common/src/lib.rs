//! Shared types for the order services.
//!
//! Holds the typed identifiers and the wire contracts that cross service
//! boundaries, so the producing and consuming services agree on payload
//! shape without depending on each other.

pub mod contracts;
pub mod types;

pub use contracts::{CreateOrderRequest, OrderCreatedNotification};
pub use types::{IdentityId, OrderId};
