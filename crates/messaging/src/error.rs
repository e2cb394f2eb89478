use thiserror::Error;

/// Errors that can occur when talking to the message broker.
#[derive(Debug, Error)]
pub enum BusError {
    /// No responder is registered for a request/reply pattern.
    #[error("No responder registered for pattern '{0}'")]
    NoResponder(String),

    /// The responder replied with an error instead of a reply payload.
    #[error("Request rejected by responder: {0}")]
    Rejected(String),

    /// The reply channel closed before a reply arrived.
    #[error("Reply channel closed before a reply arrived")]
    ChannelClosed,

    /// The broker refused to accept a published message.
    #[error("Publish failed: {0}")]
    Delivery(String),
}

/// Result type for broker operations.
pub type Result<T> = std::result::Result<T, BusError>;
