//! Billing processor trait and in-memory implementation.

use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use common::OrderCreatedNotification;

use crate::Result;
use crate::error::BillingError;

/// Trait for the billing backend.
#[async_trait]
pub trait BillingProcessor: Send + Sync {
    /// Bills the order described by the notification.
    async fn process(&self, notification: &OrderCreatedNotification) -> Result<()>;
}

#[derive(Debug, Default)]
struct InMemoryBillingState {
    processed: Vec<OrderCreatedNotification>,
    fail_on_process: bool,
}

/// In-memory billing processor for testing and local runs.
#[derive(Debug, Clone, Default)]
pub struct InMemoryBillingProcessor {
    state: Arc<RwLock<InMemoryBillingState>>,
}

impl InMemoryBillingProcessor {
    /// Creates a new in-memory billing processor.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the processor to fail on the next process calls.
    pub fn set_fail_on_process(&self, fail: bool) {
        self.state.write().unwrap().fail_on_process = fail;
    }

    /// Returns the number of notifications processed successfully.
    pub fn processed_count(&self) -> usize {
        self.state.read().unwrap().processed.len()
    }

    /// Returns the processed notifications, in arrival order.
    pub fn processed(&self) -> Vec<OrderCreatedNotification> {
        self.state.read().unwrap().processed.clone()
    }
}

#[async_trait]
impl BillingProcessor for InMemoryBillingProcessor {
    async fn process(&self, notification: &OrderCreatedNotification) -> Result<()> {
        let mut state = self.state.write().unwrap();

        if state.fail_on_process {
            return Err(BillingError::Processing("charge declined".to_string()));
        }

        state.processed.push(notification.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use common::CreateOrderRequest;

    use super::*;

    fn notification() -> OrderCreatedNotification {
        OrderCreatedNotification {
            request: CreateOrderRequest {
                name: "Laptop".to_string(),
                price: 1200,
                phone_number: "+15550000".to_string(),
            },
        }
    }

    #[tokio::test]
    async fn process_records_the_notification() {
        let processor = InMemoryBillingProcessor::new();

        processor.process(&notification()).await.unwrap();
        assert_eq!(processor.processed_count(), 1);
        assert_eq!(processor.processed()[0].request.name, "Laptop");
    }

    #[tokio::test]
    async fn failing_processor_records_nothing() {
        let processor = InMemoryBillingProcessor::new();
        processor.set_fail_on_process(true);

        let result = processor.process(&notification()).await;
        assert!(matches!(result, Err(BillingError::Processing(_))));
        assert_eq!(processor.processed_count(), 0);
    }
}
