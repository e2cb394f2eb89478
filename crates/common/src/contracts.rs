//! Wire contracts shared between the order service and the billing consumer.

use serde::{Deserialize, Serialize};

/// Payload accepted by the order service when creating an order.
///
/// Also travels inside [`OrderCreatedNotification`], so billing sees the
/// exact request the order was created from. Field names are camelCase on
/// the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    pub name: String,
    pub price: i64,
    pub phone_number: String,
}

/// Notification published to the billing queue after an order insert.
///
/// Delivered at-least-once by the broker; consumers must tolerate
/// duplicates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderCreatedNotification {
    pub request: CreateOrderRequest,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_uses_camel_case_on_the_wire() {
        let request = CreateOrderRequest {
            name: "Laptop".to_string(),
            price: 1200,
            phone_number: "+15550000".to_string(),
        };

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["name"], "Laptop");
        assert_eq!(json["price"], 1200);
        assert_eq!(json["phoneNumber"], "+15550000");
    }

    #[test]
    fn notification_wraps_the_original_request() {
        let request = CreateOrderRequest {
            name: "Laptop".to_string(),
            price: 1200,
            phone_number: "+15550000".to_string(),
        };
        let notification = OrderCreatedNotification {
            request: request.clone(),
        };

        let json = serde_json::to_value(&notification).unwrap();
        assert_eq!(json["request"]["name"], "Laptop");

        let decoded: OrderCreatedNotification = serde_json::from_value(json).unwrap();
        assert_eq!(decoded.request, request);
    }
}
