use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::{Mutex, mpsc};

use crate::bus::{Acknowledge, BusRequest, Delivery, DeliveryStream, MessageBus, RequestStream};
use crate::{BusError, Result};

/// In-memory message bus implementation for testing and local runs.
///
/// Honours the broker contract: replies are matched to their own request,
/// publishes are buffered until a subscriber appears, and messages stay
/// accounted as pending until acknowledged.
#[derive(Clone, Default)]
pub struct InMemoryBus {
    state: Arc<Mutex<BusState>>,
}

#[derive(Default)]
struct BusState {
    responders: HashMap<String, mpsc::UnboundedSender<BusRequest>>,
    queues: HashMap<String, QueueState>,
    requests_sent: HashMap<String, usize>,
    fail_on_publish: bool,
}

#[derive(Default)]
struct QueueState {
    subscriber: Option<mpsc::UnboundedSender<Delivery>>,
    backlog: VecDeque<Delivery>,
    published: Vec<Value>,
    acked: usize,
}

impl InMemoryBus {
    /// Creates a new empty in-memory bus.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the bus to refuse publishes, simulating a broker outage.
    pub async fn set_fail_on_publish(&self, fail: bool) {
        self.state.lock().await.fail_on_publish = fail;
    }

    /// Returns the payloads published to a pattern, in publish order.
    pub async fn published(&self, pattern: &str) -> Vec<Value> {
        self.state
            .lock()
            .await
            .queues
            .get(pattern)
            .map(|q| q.published.clone())
            .unwrap_or_default()
    }

    /// Returns how many deliveries on a pattern have been acknowledged.
    pub async fn acked_count(&self, pattern: &str) -> usize {
        self.state
            .lock()
            .await
            .queues
            .get(pattern)
            .map(|q| q.acked)
            .unwrap_or(0)
    }

    /// Returns how many requests reached the responder for a pattern.
    pub async fn request_count(&self, pattern: &str) -> usize {
        self.state
            .lock()
            .await
            .requests_sent
            .get(pattern)
            .copied()
            .unwrap_or(0)
    }
}

struct InMemoryAcker {
    pattern: String,
    state: Arc<Mutex<BusState>>,
}

#[async_trait]
impl Acknowledge for InMemoryAcker {
    async fn ack(self: Box<Self>) {
        let mut state = self.state.lock().await;
        if let Some(queue) = state.queues.get_mut(&self.pattern) {
            queue.acked += 1;
        }
    }
}

#[async_trait]
impl MessageBus for InMemoryBus {
    async fn request(&self, pattern: &str, payload: Value) -> Result<Value> {
        let (request, reply_rx) = BusRequest::new(payload);

        {
            let mut state = self.state.lock().await;
            let Some(sender) = state.responders.get(pattern) else {
                return Err(BusError::NoResponder(pattern.to_string()));
            };
            if sender.send(request).is_err() {
                // Responder dropped its stream; unregister it.
                state.responders.remove(pattern);
                return Err(BusError::NoResponder(pattern.to_string()));
            }
            *state.requests_sent.entry(pattern.to_string()).or_default() += 1;
        }

        match reply_rx.await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(message)) => Err(BusError::Rejected(message)),
            Err(_) => Err(BusError::ChannelClosed),
        }
    }

    async fn publish(&self, pattern: &str, payload: Value) -> Result<()> {
        let mut state = self.state.lock().await;

        if state.fail_on_publish {
            return Err(BusError::Delivery("broker refused the publish".to_string()));
        }

        let acker = InMemoryAcker {
            pattern: pattern.to_string(),
            state: self.state.clone(),
        };
        let delivery = Delivery::new(payload.clone(), Box::new(acker));

        let queue = state.queues.entry(pattern.to_string()).or_default();
        queue.published.push(payload);

        if let Some(tx) = queue.subscriber.take() {
            match tx.send(delivery) {
                Ok(()) => queue.subscriber = Some(tx),
                Err(unsent) => {
                    // Subscriber went away; hold the message for the next one.
                    queue.backlog.push_back(unsent.0);
                }
            }
        } else {
            queue.backlog.push_back(delivery);
        }
        tracing::debug!(pattern, "publish accepted");

        Ok(())
    }

    async fn serve(&self, pattern: &str) -> Result<RequestStream> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.state
            .lock()
            .await
            .responders
            .insert(pattern.to_string(), tx);
        tracing::debug!(pattern, "responder registered");
        Ok(RequestStream { rx })
    }

    async fn subscribe(&self, pattern: &str) -> Result<DeliveryStream> {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut state = self.state.lock().await;
        let queue = state.queues.entry(pattern.to_string()).or_default();
        while let Some(delivery) = queue.backlog.pop_front() {
            // A freshly created channel cannot be closed yet.
            let _ = tx.send(delivery);
        }
        queue.subscriber = Some(tx);
        Ok(DeliveryStream { rx })
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[tokio::test]
    async fn request_reply_roundtrip() {
        let bus = InMemoryBus::new();
        let mut requests = bus.serve("echo").await.unwrap();

        tokio::spawn(async move {
            while let Some(request) = requests.recv().await {
                let payload = request.payload.clone();
                request.respond(Ok(payload));
            }
        });

        let reply = bus.request("echo", json!({"n": 1})).await.unwrap();
        assert_eq!(reply, json!({"n": 1}));
        assert_eq!(bus.request_count("echo").await, 1);
    }

    #[tokio::test]
    async fn concurrent_requests_get_their_own_replies() {
        let bus = InMemoryBus::new();
        let mut requests = bus.serve("square").await.unwrap();

        tokio::spawn(async move {
            while let Some(request) = requests.recv().await {
                let n = request.payload["n"].as_i64().unwrap();
                request.respond(Ok(json!({"n": n * n})));
            }
        });

        let first = bus.request("square", json!({"n": 3}));
        let second = bus.request("square", json!({"n": 5}));
        let (first, second) = tokio::join!(first, second);

        assert_eq!(first.unwrap(), json!({"n": 9}));
        assert_eq!(second.unwrap(), json!({"n": 25}));
    }

    #[tokio::test]
    async fn requests_carry_distinct_correlation_ids() {
        let bus = InMemoryBus::new();
        let mut requests = bus.serve("noop").await.unwrap();

        let handle = tokio::spawn(async move {
            let a = requests.recv().await.unwrap();
            let b = requests.recv().await.unwrap();
            let distinct = a.correlation_id != b.correlation_id;
            a.respond(Ok(json!(null)));
            b.respond(Ok(json!(null)));
            distinct
        });

        bus.request("noop", json!(1)).await.unwrap();
        bus.request("noop", json!(2)).await.unwrap();
        assert!(handle.await.unwrap());
    }

    #[tokio::test]
    async fn request_without_responder_fails() {
        let bus = InMemoryBus::new();
        let result = bus.request("nobody-home", json!({})).await;
        assert!(matches!(result, Err(BusError::NoResponder(_))));
    }

    #[tokio::test]
    async fn error_reply_surfaces_as_rejected() {
        let bus = InMemoryBus::new();
        let mut requests = bus.serve("deny").await.unwrap();

        tokio::spawn(async move {
            while let Some(request) = requests.recv().await {
                request.respond(Err("denied".to_string()));
            }
        });

        let result = bus.request("deny", json!({})).await;
        assert!(matches!(result, Err(BusError::Rejected(msg)) if msg == "denied"));
    }

    #[tokio::test]
    async fn dropped_request_closes_the_reply_channel() {
        let bus = InMemoryBus::new();
        let mut requests = bus.serve("drop").await.unwrap();

        tokio::spawn(async move {
            let request = requests.recv().await.unwrap();
            drop(request);
        });

        let result = bus.request("drop", json!({})).await;
        assert!(matches!(result, Err(BusError::ChannelClosed)));
    }

    #[tokio::test]
    async fn publish_before_subscribe_is_buffered() {
        let bus = InMemoryBus::new();
        bus.publish("billing", json!({"n": 1})).await.unwrap();
        bus.publish("billing", json!({"n": 2})).await.unwrap();

        let mut deliveries = bus.subscribe("billing").await.unwrap();
        let first = deliveries.recv().await.unwrap();
        let second = deliveries.recv().await.unwrap();

        assert_eq!(first.payload, json!({"n": 1}));
        assert_eq!(second.payload, json!({"n": 2}));
    }

    #[tokio::test]
    async fn ack_is_counted_per_pattern() {
        let bus = InMemoryBus::new();
        let mut deliveries = bus.subscribe("billing").await.unwrap();

        bus.publish("billing", json!({})).await.unwrap();
        bus.publish("billing", json!({})).await.unwrap();
        assert_eq!(bus.acked_count("billing").await, 0);

        deliveries.recv().await.unwrap().ack().await;
        assert_eq!(bus.acked_count("billing").await, 1);

        deliveries.recv().await.unwrap().ack().await;
        assert_eq!(bus.acked_count("billing").await, 2);
    }

    #[tokio::test]
    async fn failed_publish_reaches_no_subscriber() {
        let bus = InMemoryBus::new();
        bus.set_fail_on_publish(true).await;

        let result = bus.publish("billing", json!({})).await;
        assert!(matches!(result, Err(BusError::Delivery(_))));
        assert!(bus.published("billing").await.is_empty());
    }
}
