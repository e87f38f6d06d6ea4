use serde::Serialize;

use crate::db_types::{FulfillmentStatus, Order, PendingPayment};

/// A captured payment has been turned into a stored order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderCreatedEvent {
    pub order: Order,
}

impl OrderCreatedEvent {
    pub fn new(order: Order) -> Self {
        Self { order }
    }
}

/// A captured payment was parked because no shipping address could be found.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaymentDeferredEvent {
    pub pending: PendingPayment,
}

impl PaymentDeferredEvent {
    pub fn new(pending: PendingPayment) -> Self {
        Self { pending }
    }
}

/// An admin cancelled an order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderCancelledEvent {
    pub order: Order,
    pub previous_status: FulfillmentStatus,
    /// Number of line items whose stock could not be restored.
    pub restock_failures: usize,
}

impl OrderCancelledEvent {
    pub fn new(order: Order, previous_status: FulfillmentStatus, restock_failures: usize) -> Self {
        Self { order, previous_status, restock_failures }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum EventType {
    OrderCreated(OrderCreatedEvent),
    PaymentDeferred(PaymentDeferredEvent),
    OrderCancelled(OrderCancelledEvent),
}
