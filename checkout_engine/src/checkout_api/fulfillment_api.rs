use std::{fmt::Debug, time::Duration};

use log::*;

use crate::{
    checkout_api::{
        bounded::within,
        checkout_objects::{StatusChange, StockAdjustmentFailure},
        errors::FulfillmentError,
    },
    db_types::{FulfillmentStatus, Order},
    events::{EventProducers, OrderCancelledEvent},
    traits::{InventoryError, InventoryManagement, OrderManagement},
};

/// Admin-facing order lifecycle management.
///
/// Cancelling an order returns its items to stock. Because the status write is a compare-and-set on the status that
/// was read, two concurrent cancellations of the same order restock it exactly once.
pub struct FulfillmentApi<B> {
    db: B,
    producers: EventProducers,
    storage_timeout: Duration,
}

impl<B> Debug for FulfillmentApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "FulfillmentApi")
    }
}

impl<B> FulfillmentApi<B> {
    pub fn new(db: B, producers: EventProducers) -> Self {
        Self { db, producers, storage_timeout: Duration::from_secs(5) }
    }

    pub fn with_storage_timeout(mut self, timeout: Duration) -> Self {
        self.storage_timeout = timeout;
        self
    }

    pub fn db(&self) -> &B {
        &self.db
    }
}

impl<B> FulfillmentApi<B>
where B: OrderManagement + InventoryManagement
{
    /// Moves an order to `new_status`.
    ///
    /// * Only `processing`, `delivered` and `cancelled` may be set.
    /// * Setting the status an order already has changes nothing.
    /// * A cancelled order stays cancelled.
    /// * Entering `cancelled` restocks every line on its own. Lines that fail are listed in the result.
    pub async fn set_status(&self, order_id: i64, new_status: FulfillmentStatus) -> Result<StatusChange, FulfillmentError> {
        if !new_status.is_admin_assignable() {
            return Err(FulfillmentError::InvalidStatus(new_status.to_string()));
        }
        let order = within(self.storage_timeout, "Order lookup", self.db.fetch_order(order_id))
            .await??
            .ok_or(FulfillmentError::OrderNotFound(order_id))?;
        let previous_status = order.status;
        if previous_status == new_status {
            debug!("🚚️ Order #{order_id} is already {new_status}. Nothing to do.");
            return Ok(StatusChange { order, previous_status, changed: false, restock_failures: Vec::new() });
        }
        if previous_status == FulfillmentStatus::Cancelled {
            return Err(FulfillmentError::TransitionForbidden { from: previous_status, to: new_status });
        }
        let updated = within(
            self.storage_timeout,
            "Order status update",
            self.db.update_fulfillment_status(order_id, previous_status, new_status),
        )
        .await??
        .ok_or_else(|| {
            warn!("🚚️ Order #{order_id} changed while moving it from {previous_status} to {new_status}");
            FulfillmentError::ConcurrentModification(order_id)
        })?;
        info!("🚚️ Order #{order_id} moved from {previous_status} to {new_status}");

        let mut restock_failures = Vec::new();
        if new_status == FulfillmentStatus::Cancelled {
            restock_failures = self.restock(&updated).await;
            let event = OrderCancelledEvent::new(updated.clone(), previous_status, restock_failures.len());
            self.producers.order_cancelled(event).await;
        }
        Ok(StatusChange { order: updated, previous_status, changed: true, restock_failures })
    }

    async fn restock(&self, order: &Order) -> Vec<StockAdjustmentFailure> {
        let mut failures = Vec::new();
        for item in &order.items {
            let result = within(
                self.storage_timeout,
                "Stock increment",
                self.db.increment_stock(&item.product_id, item.quantity),
            )
            .await
            .unwrap_or_else(|e| Err(InventoryError::DatabaseError(e.to_string())));
            match result {
                Ok(stock) => debug!("🚚️ Restocked {} x {} from order #{}. Now {stock}", item.quantity, item.product_id, order.id),
                Err(e) => {
                    error!(
                        "🚚️ Could not restock {} x {} from cancelled order #{}. {e}",
                        item.quantity, item.product_id, order.id
                    );
                    failures.push(StockAdjustmentFailure::new(item, &e));
                },
            }
        }
        failures
    }
}
