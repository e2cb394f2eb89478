use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::{mpsc, oneshot};
use uuid::Uuid;

use crate::Result;

/// Core trait for message broker clients.
///
/// Covers both patterns the services use: request/reply (one reply per
/// request, matched by correlation id) and fire-and-forget publish with
/// manual acknowledgement on the consuming side. All implementations must
/// be safe for concurrent use from many tasks.
#[async_trait]
pub trait MessageBus: Send + Sync {
    /// Sends a request and waits for the matching reply.
    ///
    /// The call itself has no deadline; callers that must not hang apply
    /// their own timeout around it.
    async fn request(&self, pattern: &str, payload: Value) -> Result<Value>;

    /// Publishes a message to a queue.
    ///
    /// Resolves once the broker accepted the message, not when a consumer
    /// processed it. Delivery to consumers is at-least-once.
    async fn publish(&self, pattern: &str, payload: Value) -> Result<()>;

    /// Registers the caller as the responder for a request/reply pattern.
    async fn serve(&self, pattern: &str) -> Result<RequestStream>;

    /// Subscribes to a queue of published messages.
    async fn subscribe(&self, pattern: &str) -> Result<DeliveryStream>;
}

/// An inbound request on a request/reply pattern.
///
/// Carries the correlation id that pairs it with its reply. Consuming the
/// request with [`BusRequest::respond`] sends exactly one reply; dropping
/// it unanswered leaves the requester to its own timeout.
pub struct BusRequest {
    pub correlation_id: Uuid,
    pub payload: Value,
    reply: oneshot::Sender<std::result::Result<Value, String>>,
}

impl BusRequest {
    pub(crate) fn new(
        payload: Value,
    ) -> (Self, oneshot::Receiver<std::result::Result<Value, String>>) {
        let (tx, rx) = oneshot::channel();
        (
            Self {
                correlation_id: Uuid::new_v4(),
                payload,
                reply: tx,
            },
            rx,
        )
    }

    /// Sends the reply for this request.
    ///
    /// An `Err` reply surfaces to the requester as [`crate::BusError::Rejected`].
    pub fn respond(self, reply: std::result::Result<Value, String>) {
        // The requester may have timed out and dropped its end already.
        let _ = self.reply.send(reply);
    }
}

/// Stream of inbound requests for a served pattern.
pub struct RequestStream {
    pub(crate) rx: mpsc::UnboundedReceiver<BusRequest>,
}

impl RequestStream {
    /// Receives the next request, or `None` once the bus is gone.
    pub async fn recv(&mut self) -> Option<BusRequest> {
        self.rx.recv().await
    }
}

/// A message delivered from a queue, awaiting acknowledgement.
pub struct Delivery {
    pub payload: Value,
    acker: Box<dyn Acknowledge>,
}

impl Delivery {
    pub(crate) fn new(payload: Value, acker: Box<dyn Acknowledge>) -> Self {
        Self { payload, acker }
    }

    /// Acknowledges the message so the broker removes it from the queue.
    pub async fn ack(self) {
        self.acker.ack().await;
    }
}

/// Stream of deliveries for a subscribed queue.
pub struct DeliveryStream {
    pub(crate) rx: mpsc::UnboundedReceiver<Delivery>,
}

impl DeliveryStream {
    /// Receives the next delivery, or `None` once the bus is gone.
    pub async fn recv(&mut self) -> Option<Delivery> {
        self.rx.recv().await
    }
}

/// Broker-side acknowledgement handle behind a [`Delivery`].
#[async_trait]
pub(crate) trait Acknowledge: Send {
    async fn ack(self: Box<Self>);
}
