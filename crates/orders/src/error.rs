use messaging::BusError;
use store::StoreError;
use thiserror::Error;

/// Errors that can occur during order operations.
#[derive(Debug, Error)]
pub enum OrderError {
    /// The store was unreachable or rejected a write.
    #[error("Persistence failure: {0}")]
    Persistence(#[from] StoreError),

    /// The broker rejected the order-created notification.
    #[error("Delivery failure: {0}")]
    Delivery(#[from] BusError),

    /// A serialization error occurred.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for order operations.
pub type Result<T> = std::result::Result<T, OrderError>;
