//! The order record.

use common::{CreateOrderRequest, OrderId};
use serde::{Deserialize, Serialize};
use store::Document;
use uuid::Uuid;

/// A stored order.
///
/// Created exactly once inside a transaction; never updated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    pub name: String,
    pub price: i64,
    pub phone_number: String,
}

impl Order {
    /// Materializes a new order from a creation request with a fresh id.
    pub fn from_request(request: &CreateOrderRequest) -> Self {
        Self {
            id: OrderId::new(),
            name: request.name.clone(),
            price: request.price,
            phone_number: request.phone_number.clone(),
        }
    }
}

impl Document for Order {
    const COLLECTION: &'static str = "orders";

    fn id(&self) -> Uuid {
        self.id.as_uuid()
    }
}
