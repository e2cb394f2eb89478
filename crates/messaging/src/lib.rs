//! Message broker contract for the order services.
//!
//! Exposes the two messaging patterns the services rely on: request/reply
//! with correlation-id matching (used for remote token validation) and
//! fire-and-forget publish with manual per-message acknowledgement (used
//! for the order-created notification). The physical transport is an
//! external collaborator; [`InMemoryBus`] implements the same contract
//! in-process for tests and local runs.

pub mod bus;
pub mod error;
pub mod memory;

pub use bus::{BusRequest, Delivery, DeliveryStream, MessageBus, RequestStream};
pub use error::{BusError, Result};
pub use memory::InMemoryBus;
