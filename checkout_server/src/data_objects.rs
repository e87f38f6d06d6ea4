//! Request and response bodies for the HTTP API. Field names follow what the storefront client sends and expects.
use checkout_common::Paise;
use checkout_engine::{
    checkout_objects::{CartLine, FollowUpReport, ReconcileOutcome, ReconcileRequest, StockAdjustmentFailure},
    db_types::{AppliedCoupon, FulfillmentStatus, Order, PendingPayment, ShippingAddress},
    GatewayOrder,
    OrderPage,
};
use serde::{Deserialize, Serialize};

use crate::errors::ServerError;

/// Amounts arrive as JSON numbers and are rounded to whole paise.
fn paise_from_json(amount: f64) -> Result<Paise, ServerError> {
    Paise::try_from(amount).map_err(|e| ServerError::InvalidRequestBody(e.to_string()))
}

//----------------------------------------------   Checkout  ----------------------------------------------------
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutSessionRequest {
    pub total_amount: f64,
    #[serde(default)]
    pub currency: Option<String>,
}

impl CheckoutSessionRequest {
    pub fn amount(&self) -> Result<Paise, ServerError> {
        paise_from_json(self.total_amount)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CheckoutSessionResponse {
    pub success: bool,
    pub order: GatewayOrder,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayKeyResponse {
    pub key: String,
}

//----------------------------------------------   Verify  ----------------------------------------------------
/// The client's report of a completed payment. The gateway's own field names are accepted as aliases.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyPaymentRequest {
    #[serde(rename = "payment_id", alias = "razorpay_payment_id", default)]
    pub payment_id: String,
    #[serde(rename = "order_id", alias = "razorpay_order_id", default)]
    pub order_id: String,
    #[serde(alias = "razorpay_signature", default)]
    pub signature: String,
    #[serde(default)]
    pub order_items: Vec<CartLine>,
    #[serde(default)]
    pub total_amount: f64,
    #[serde(default)]
    pub coupon_applied: Option<AppliedCoupon>,
    #[serde(default)]
    pub shipping_address: Option<ShippingAddress>,
}

impl VerifyPaymentRequest {
    pub fn into_reconcile_request(self, account_id: Option<i64>) -> Result<ReconcileRequest, ServerError> {
        let total_amount = paise_from_json(self.total_amount)?;
        Ok(ReconcileRequest {
            payment_id: self.payment_id,
            gateway_order_id: self.order_id,
            signature: self.signature,
            items: self.order_items,
            total_amount,
            coupon: self.coupon_applied,
            shipping_address: self.shipping_address,
            account_id,
        })
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResumePaymentRequest {
    #[serde(default)]
    pub shipping_address: Option<ShippingAddress>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyPaymentResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_id: Option<i64>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub already_processed: bool,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub needs_address: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub follow_up: Option<FollowUpReport>,
}

impl From<ReconcileOutcome> for VerifyPaymentResponse {
    fn from(outcome: ReconcileOutcome) -> Self {
        match outcome {
            ReconcileOutcome::Created { order, report } => Self {
                success: true,
                order_id: Some(order.id),
                already_processed: false,
                needs_address: false,
                message: "Order created".to_string(),
                follow_up: (!report.is_clean()).then_some(report),
            },
            ReconcileOutcome::AlreadyProcessed(order) => Self {
                success: true,
                order_id: Some(order.id),
                already_processed: true,
                needs_address: false,
                message: "Order already created".to_string(),
                follow_up: None,
            },
            ReconcileOutcome::NeedsAddress(_) => Self {
                success: false,
                order_id: None,
                already_processed: false,
                needs_address: true,
                message: "No address found. Please add an address before completing the order.".to_string(),
                follow_up: None,
            },
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingPaymentResponse {
    pub success: bool,
    pub pending: PendingPayment,
}

//----------------------------------------------   Orders  ----------------------------------------------------
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrderListParams {
    pub status: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

impl OrderListParams {
    /// An empty status means "any status".
    pub fn status(&self) -> Result<Option<FulfillmentStatus>, ServerError> {
        match self.status.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(s) => s.parse().map(Some).map_err(|e| ServerError::BadRequest(format!("{e}"))),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderListResponse {
    pub success: bool,
    #[serde(flatten)]
    pub page: OrderPage,
}

#[derive(Debug, Clone, Serialize)]
pub struct OrderResponse {
    pub success: bool,
    pub order: Order,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStatusResponse {
    pub success: bool,
    pub order: Order,
    pub changed: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub restock_failures: Vec<StockAdjustmentFailure>,
}
