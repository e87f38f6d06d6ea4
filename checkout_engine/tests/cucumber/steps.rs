use checkout_common::Paise;
use checkout_engine::{
    checkout_objects::{CartLine, ReconcileOutcome},
    db_types::{FulfillmentStatus, PendingPaymentStatus, ShippingAddress},
    events::EventProducers,
    AccountDirectory,
    FulfillmentApi,
    OrderManagement,
    PendingPaymentManagement,
    ReconcileError,
};
use chrono::Utc;
use cucumber::{then, when};

use crate::cucumber::CheckoutWorld;

#[when(expr = "'{word}' completes payment '{word}' for gateway order '{word}' with {int} x '{word}' at {int} paise")]
async fn complete_payment(
    world: &mut CheckoutWorld,
    name: String,
    payment_id: String,
    gateway_order_id: String,
    quantity: i64,
    product: String,
    price: i64,
) {
    let account_id = world.account(&name);
    let items = vec![CartLine::new(product, quantity, Paise::from(price))];
    let request = world.system().captured_request(&payment_id, &gateway_order_id, items).with_account_id(account_id);
    let outcome = world.system().api().reconcile(request).await;
    world.record(outcome);
}

#[when(expr = "'{word}' submits payment '{word}' for gateway order '{word}' with a forged signature")]
async fn forged_payment(world: &mut CheckoutWorld, name: String, payment_id: String, gateway_order_id: String) {
    let account_id = world.account(&name);
    let items = vec![CartLine::new("A", 1, Paise::from(100))];
    let mut request =
        world.system().captured_request(&payment_id, &gateway_order_id, items).with_account_id(account_id);
    request.signature = "00".repeat(32);
    let outcome = world.system().api().reconcile(request).await;
    world.record(outcome);
}

#[when(expr = "'{word}' resumes gateway order '{word}' with an address in '{word}'")]
async fn resume_with_address(world: &mut CheckoutWorld, name: String, gateway_order_id: String, city: String) {
    let account_id = world.account(&name);
    let address = ShippingAddress::new("1 Station Road", city.as_str(), "411001");
    let outcome =
        world.system().api().resume_pending_payment(&gateway_order_id, Some(account_id), Some(address)).await;
    world.record(outcome);
}

#[when(expr = "the admin marks the last order as '{word}'")]
async fn admin_sets_status(world: &mut CheckoutWorld, status: String) {
    let status = status.parse::<FulfillmentStatus>().expect("Not a valid status");
    let order_id = world.last_order_id.expect("No order has been created yet");
    let api = FulfillmentApi::new(world.system().db.clone(), EventProducers::default());
    api.set_status(order_id, status).await.expect("Error setting order status");
}

#[then(expr = "an order is created for '{word}' with total {int} paise")]
async fn order_created(world: &mut CheckoutWorld, name: String, total: i64) {
    let account_id = world.account(&name);
    match world.last_outcome.as_ref().expect("Nothing has been reconciled") {
        Ok(ReconcileOutcome::Created { order, .. }) => {
            assert_eq!(order.account_id, Some(account_id));
            assert_eq!(order.total_amount, Paise::from(total));
            assert_eq!(order.status, FulfillmentStatus::Processing);
        },
        other => panic!("Expected a new order, got {other:?}"),
    }
}

#[then("the payment was already processed")]
async fn already_processed(world: &mut CheckoutWorld) {
    let outcome = world.last_outcome.as_ref().expect("Nothing has been reconciled");
    assert!(matches!(outcome, Ok(ReconcileOutcome::AlreadyProcessed(_))), "Got {outcome:?}");
}

#[then("the payment needs an address")]
async fn needs_address(world: &mut CheckoutWorld) {
    let outcome = world.last_outcome.as_ref().expect("Nothing has been reconciled");
    assert!(matches!(outcome, Ok(ReconcileOutcome::NeedsAddress(_))), "Got {outcome:?}");
}

#[then("the payment is rejected with an invalid signature")]
async fn invalid_signature(world: &mut CheckoutWorld) {
    let outcome = world.last_outcome.as_ref().expect("Nothing has been reconciled");
    assert!(matches!(outcome, Err(ReconcileError::InvalidSignature)), "Got {outcome:?}");
}

#[then(expr = "no order exists for payment '{word}'")]
async fn no_order(world: &mut CheckoutWorld, payment_id: String) {
    let order = world.system().db.fetch_order_by_payment_id(&payment_id).await.expect("Error fetching order");
    assert!(order.is_none());
}

#[then(expr = "product '{word}' has {int} in stock")]
async fn stock_level(world: &mut CheckoutWorld, product: String, stock: i64) {
    assert_eq!(world.system().stock(&product).await, stock);
}

#[then(expr = "the cart of '{word}' is empty")]
async fn cart_is_empty(world: &mut CheckoutWorld, name: String) {
    let account_id = world.account(&name);
    let cart = world.system().db.fetch_cart(account_id).await.expect("Error fetching cart");
    assert!(cart.is_empty(), "Cart still has {} items", cart.len());
}

#[then(expr = "a pending payment exists for gateway order '{word}' with total {int} paise")]
async fn pending_exists(world: &mut CheckoutWorld, gateway_order_id: String, total: i64) {
    let pending = world
        .system()
        .db
        .fetch_pending_payment(&gateway_order_id, Utc::now())
        .await
        .expect("Error fetching pending payment")
        .expect("No pending payment");
    assert_eq!(pending.total_amount, Paise::from(total));
    assert_eq!(pending.status, PendingPaymentStatus::Pending);
}

#[then(expr = "the pending payment for gateway order '{word}' is completed")]
async fn pending_completed(world: &mut CheckoutWorld, gateway_order_id: String) {
    let pending = world
        .system()
        .db
        .fetch_pending_payment(&gateway_order_id, Utc::now())
        .await
        .expect("Error fetching pending payment")
        .expect("No pending payment");
    assert_eq!(pending.status, PendingPaymentStatus::Completed);
}
