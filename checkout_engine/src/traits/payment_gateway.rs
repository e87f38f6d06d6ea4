use std::fmt::Display;

use checkout_common::Paise;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum GatewayError {
    /// The gateway could not be reached, timed out, or had an internal failure. The call may be retried.
    #[error("Payment gateway is unavailable: {0}")]
    Unavailable(String),
    /// The gateway understood the request and refused it.
    #[error("Payment gateway rejected the request: {0}")]
    Rejected(String),
}

impl GatewayError {
    pub fn is_transient(&self) -> bool {
        matches!(self, GatewayError::Unavailable(_))
    }
}

/// An order registered with the gateway, which the client completes payment against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewayOrder {
    pub id: String,
    pub amount: Paise,
    pub currency: String,
    pub receipt: Option<String>,
    pub status: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GatewayPaymentStatus {
    Captured,
    Other(String),
}

impl GatewayPaymentStatus {
    pub fn is_captured(&self) -> bool {
        matches!(self, GatewayPaymentStatus::Captured)
    }
}

impl Display for GatewayPaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GatewayPaymentStatus::Captured => write!(f, "captured"),
            GatewayPaymentStatus::Other(s) => write!(f, "{s}"),
        }
    }
}

/// The gateway's authoritative view of a payment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewayPayment {
    pub id: String,
    pub order_id: Option<String>,
    pub amount: Paise,
    pub currency: String,
    pub status: GatewayPaymentStatus,
}

/// The seam between the checkout engine and a hosted payment provider.
#[allow(async_fn_in_trait)]
pub trait PaymentGateway {
    /// Registers an order with the gateway for `amount` (in the smallest currency unit).
    async fn create_order(&self, amount: Paise, currency: &str, receipt: &str) -> Result<GatewayOrder, GatewayError>;

    /// Fetches the gateway's record of a payment.
    async fn fetch_payment(&self, payment_id: &str) -> Result<GatewayPayment, GatewayError>;
}
