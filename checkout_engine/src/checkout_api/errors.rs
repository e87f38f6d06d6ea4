use checkout_common::Paise;
use thiserror::Error;

use crate::{
    checkout_api::bounded::TimedOut,
    db_types::{FulfillmentStatus, ProductId},
    traits::{GatewayError, InventoryError, StoreError},
};

#[derive(Debug, Clone, Error)]
pub enum ReconcileError {
    #[error("Missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),
    #[error("Invalid line item. {0}")]
    InvalidLineItem(String),
    #[error("Invalid amount. {0}")]
    InvalidAmount(String),
    #[error("Invalid payment signature")]
    InvalidSignature,
    #[error("Payment has not been captured. Gateway status is '{0}'")]
    PaymentNotCaptured(String),
    #[error("Price of {product_id} is {catalog} but the cart says {snapshot}")]
    PriceMismatch { product_id: ProductId, catalog: Paise, snapshot: Paise },
    #[error("Timed out. {0}")]
    Timeout(String),
    #[error("Payment gateway error. {0}")]
    GatewayError(String),
    #[error("The payment gateway refused the request. {0}")]
    GatewayRejected(String),
    #[error("Storage failure. {0}")]
    StorageFailure(String),
    #[error("No pending payment exists for gateway order {0}")]
    PendingPaymentNotFound(String),
    #[error("Not allowed to access this payment")]
    Forbidden,
}

impl ReconcileError {
    /// True if the same call may succeed later. Retrying is always safe; reconciliation is idempotent.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Timeout(_) | Self::GatewayError(_) | Self::StorageFailure(_))
    }
}

impl From<TimedOut> for ReconcileError {
    fn from(e: TimedOut) -> Self {
        Self::Timeout(e.to_string())
    }
}

impl From<StoreError> for ReconcileError {
    fn from(e: StoreError) -> Self {
        Self::StorageFailure(e.to_string())
    }
}

impl From<GatewayError> for ReconcileError {
    fn from(e: GatewayError) -> Self {
        match e {
            GatewayError::Unavailable(s) => Self::GatewayError(s),
            GatewayError::Rejected(s) => Self::GatewayRejected(s),
        }
    }
}

impl From<InventoryError> for ReconcileError {
    fn from(e: InventoryError) -> Self {
        match e {
            InventoryError::DatabaseError(s) => Self::StorageFailure(s),
            other => Self::InvalidLineItem(other.to_string()),
        }
    }
}

#[derive(Debug, Clone, Error)]
pub enum FulfillmentError {
    #[error("'{0}' is not a status that can be set on an order")]
    InvalidStatus(String),
    #[error("Order #{0} does not exist")]
    OrderNotFound(i64),
    #[error("Order cannot move from {from} to {to}")]
    TransitionForbidden { from: FulfillmentStatus, to: FulfillmentStatus },
    #[error("Order #{0} was modified by another request. Try again")]
    ConcurrentModification(i64),
    #[error("Timed out. {0}")]
    Timeout(String),
    #[error("Storage failure. {0}")]
    StorageFailure(String),
}

impl FulfillmentError {
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::ConcurrentModification(_) | Self::Timeout(_) | Self::StorageFailure(_))
    }
}

impl From<TimedOut> for FulfillmentError {
    fn from(e: TimedOut) -> Self {
        Self::Timeout(e.to_string())
    }
}

impl From<StoreError> for FulfillmentError {
    fn from(e: StoreError) -> Self {
        Self::StorageFailure(e.to_string())
    }
}

#[derive(Debug, Clone, Error)]
pub enum OrdersApiError {
    #[error("Timed out. {0}")]
    Timeout(String),
    #[error("Storage failure. {0}")]
    StorageFailure(String),
}

impl From<TimedOut> for OrdersApiError {
    fn from(e: TimedOut) -> Self {
        Self::Timeout(e.to_string())
    }
}

impl From<StoreError> for OrdersApiError {
    fn from(e: StoreError) -> Self {
        Self::StorageFailure(e.to_string())
    }
}
