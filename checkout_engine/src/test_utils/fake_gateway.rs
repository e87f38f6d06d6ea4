//! An in-memory [`PaymentGateway`] for tests. Payments are registered up front and looked up by id.
use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
    time::Duration,
};

use checkout_common::Paise;

use crate::traits::{GatewayError, GatewayOrder, GatewayPayment, GatewayPaymentStatus, PaymentGateway};

#[derive(Debug, Default)]
struct GatewayState {
    payments: HashMap<String, GatewayPayment>,
    orders: Vec<GatewayOrder>,
    lookups: usize,
    delay: Option<Duration>,
    failure: Option<GatewayError>,
}

#[derive(Debug, Clone, Default)]
pub struct FakeGateway {
    state: Arc<Mutex<GatewayState>>,
}

impl FakeGateway {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_state<T>(&self, f: impl FnOnce(&mut GatewayState) -> T) -> T {
        let mut state = self.state.lock().expect("Fake gateway state lock poisoned");
        f(&mut state)
    }

    /// Registers a payment with the given status.
    pub fn add_payment(&self, payment_id: &str, gateway_order_id: &str, amount: Paise, status: GatewayPaymentStatus) {
        let payment = GatewayPayment {
            id: payment_id.to_string(),
            order_id: Some(gateway_order_id.to_string()),
            amount,
            currency: "INR".to_string(),
            status,
        };
        self.with_state(|s| s.payments.insert(payment_id.to_string(), payment));
    }

    pub fn capture(&self, payment_id: &str, gateway_order_id: &str, amount: Paise) {
        self.add_payment(payment_id, gateway_order_id, amount, GatewayPaymentStatus::Captured);
    }

    /// Every call fails with `err` until cleared with `None`.
    pub fn set_failure(&self, err: Option<GatewayError>) {
        self.with_state(|s| s.failure = err);
    }

    /// Every call sleeps this long before answering.
    pub fn set_delay(&self, delay: Option<Duration>) {
        self.with_state(|s| s.delay = delay);
    }

    pub fn payment_lookups(&self) -> usize {
        self.with_state(|s| s.lookups)
    }

    pub fn created_orders(&self) -> Vec<GatewayOrder> {
        self.with_state(|s| s.orders.clone())
    }

    async fn pause(&self) -> Result<(), GatewayError> {
        let (delay, failure) = self.with_state(|s| (s.delay, s.failure.clone()));
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        failure.map_or(Ok(()), Err)
    }
}

impl PaymentGateway for FakeGateway {
    async fn create_order(&self, amount: Paise, currency: &str, receipt: &str) -> Result<GatewayOrder, GatewayError> {
        self.pause().await?;
        Ok(self.with_state(|s| {
            let order = GatewayOrder {
                id: format!("order_fake{:04}", s.orders.len() + 1),
                amount,
                currency: currency.to_string(),
                receipt: Some(receipt.to_string()),
                status: "created".to_string(),
            };
            s.orders.push(order.clone());
            order
        }))
    }

    async fn fetch_payment(&self, payment_id: &str) -> Result<GatewayPayment, GatewayError> {
        self.pause().await?;
        self.with_state(|s| {
            s.lookups += 1;
            s.payments
                .get(payment_id)
                .cloned()
                .ok_or_else(|| GatewayError::Rejected(format!("The id provided does not exist: {payment_id}")))
        })
    }
}
