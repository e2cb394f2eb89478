//! Consumes order-created notifications from the broker.

use common::OrderCreatedNotification;
use messaging::DeliveryStream;

use crate::processor::BillingProcessor;

/// Drains a billing queue, processing and acknowledging each message.
///
/// Acknowledgement is unconditional: processing failures and malformed
/// payloads are surfaced through logs and metrics only, never by failing
/// the ack. A crash mid-processing therefore loses that notification.
/// This mirrors the policy of the system this service cooperates with;
/// it is not an oversight.
pub struct BillingConsumer<P> {
    processor: P,
}

impl<P: BillingProcessor> BillingConsumer<P> {
    /// Creates a consumer over the given processor.
    pub fn new(processor: P) -> Self {
        Self { processor }
    }

    /// Consumes deliveries until the bus shuts down.
    pub async fn run(self, mut deliveries: DeliveryStream) {
        while let Some(delivery) = deliveries.recv().await {
            metrics::counter!("billing_notifications_total").increment(1);

            match serde_json::from_value::<OrderCreatedNotification>(delivery.payload.clone()) {
                Ok(notification) => {
                    if let Err(e) = self.processor.process(&notification).await {
                        metrics::counter!("billing_failures_total").increment(1);
                        tracing::error!(error = %e, order_name = %notification.request.name, "billing processing failed");
                    } else {
                        tracing::info!(order_name = %notification.request.name, "billed order");
                    }
                }
                Err(e) => {
                    metrics::counter!("billing_failures_total").increment(1);
                    tracing::error!(error = %e, "malformed order notification");
                }
            }

            delivery.ack().await;
        }
        tracing::info!("billing consumer stopped");
    }
}
