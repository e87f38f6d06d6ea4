//! Adapts the Razorpay REST client to the engine's `PaymentGateway` seam.
use checkout_common::Paise;
use checkout_engine::{GatewayError, GatewayOrder, GatewayPayment, GatewayPaymentStatus, PaymentGateway};
use log::*;
use razorpay_tools::{RazorpayApi, RazorpayApiError, RazorpayOrder, RazorpayPayment, RazorpayPaymentStatus};

#[derive(Clone)]
pub struct RazorpayGateway {
    api: RazorpayApi,
}

impl RazorpayGateway {
    pub fn new(api: RazorpayApi) -> Self {
        Self { api }
    }

    /// The public key id that storefront clients need to open the payment widget.
    pub fn key_id(&self) -> &str {
        self.api.key_id()
    }
}

impl PaymentGateway for RazorpayGateway {
    async fn create_order(&self, amount: Paise, currency: &str, receipt: &str) -> Result<GatewayOrder, GatewayError> {
        let order = self.api.create_order(amount, currency, receipt).await.map_err(gateway_error)?;
        Ok(gateway_order(order))
    }

    async fn fetch_payment(&self, payment_id: &str) -> Result<GatewayPayment, GatewayError> {
        let payment = self.api.fetch_payment(payment_id).await.map_err(gateway_error)?;
        Ok(gateway_payment(payment))
    }
}

fn gateway_error(e: RazorpayApiError) -> GatewayError {
    if e.is_transient() {
        warn!("💳️ Razorpay is unavailable. {e}");
        GatewayError::Unavailable(e.to_string())
    } else {
        debug!("💳️ Razorpay rejected the request. {e}");
        GatewayError::Rejected(e.to_string())
    }
}

fn gateway_order(order: RazorpayOrder) -> GatewayOrder {
    GatewayOrder {
        id: order.id,
        amount: order.amount,
        currency: order.currency,
        receipt: order.receipt,
        status: order.status,
    }
}

fn gateway_payment(payment: RazorpayPayment) -> GatewayPayment {
    let status = match payment.status {
        RazorpayPaymentStatus::Captured => GatewayPaymentStatus::Captured,
        other => GatewayPaymentStatus::Other(other.to_string()),
    };
    GatewayPayment {
        id: payment.id,
        order_id: payment.order_id,
        amount: payment.amount,
        currency: payment.currency,
        status,
    }
}
