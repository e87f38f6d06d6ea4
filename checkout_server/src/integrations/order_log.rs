use checkout_engine::events::{EventHandlers, EventHooks, OrderCancelledEvent};
use log::*;

pub const ORDER_LOG_BUFFER_SIZE: usize = 25;

/// Assigns event handlers that write the order lifecycle to the `checkout::orders` log target.
///
/// Downstream integrations (invoices, shipping labels, customer e-mail) hook in at the same points:
///
/// 1. OrderCreatedEvent - a captured payment became an order.
/// 2. PaymentDeferredEvent - a captured payment is waiting for a shipping address.
/// 3. OrderCancelledEvent - an admin cancelled an order and its stock was returned.
pub fn create_order_log_handlers() -> EventHandlers {
    let mut hooks = EventHooks::default();
    hooks.on_order_created(|ev| {
        let order = ev.order;
        Box::pin(async move {
            info!(
                target: "checkout::orders",
                "🧾️ Order #{} created. Payment {}, {} item(s), {} {}. Account: {:?}",
                order.id,
                order.gateway_payment_id,
                order.items.len(),
                order.total_amount,
                order.currency,
                order.account_id
            );
        })
    });
    hooks.on_payment_deferred(|ev| {
        let pending = ev.pending;
        Box::pin(async move {
            info!(
                target: "checkout::orders",
                "🧾️ Payment {} for gateway order {} is waiting for an address until {}",
                pending.gateway_payment_id,
                pending.gateway_order_id,
                pending.expires_at
            );
        })
    });
    hooks.on_order_cancelled(|ev| {
        let OrderCancelledEvent { order, previous_status, restock_failures } = ev;
        Box::pin(async move {
            if restock_failures > 0 {
                warn!(
                    target: "checkout::orders",
                    "🧾️ Order #{} cancelled (was {previous_status}). {restock_failures} line(s) could not be restocked.",
                    order.id
                );
            } else {
                info!(target: "checkout::orders", "🧾️ Order #{} cancelled (was {previous_status}).", order.id);
            }
        })
    });
    EventHandlers::new(ORDER_LOG_BUFFER_SIZE, hooks)
}
