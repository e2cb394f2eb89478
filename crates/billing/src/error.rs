use thiserror::Error;

/// Errors that can occur while billing an order.
#[derive(Debug, Error)]
pub enum BillingError {
    /// The billing backend refused or failed to process the charge.
    #[error("Billing processing failed: {0}")]
    Processing(String),
}

/// Result type for billing operations.
pub type Result<T> = std::result::Result<T, BillingError>;
