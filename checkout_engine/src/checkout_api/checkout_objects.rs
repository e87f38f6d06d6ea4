use std::{str::FromStr, time::Duration};

use checkout_common::{rounded_paise, Paise, DEFAULT_CURRENCY_CODE};
use serde::{Deserialize, Serialize};

use crate::{
    checkout_api::errors::ReconcileError,
    db_types::{AppliedCoupon, FulfillmentStatus, LineItem, Order, PendingPayment, ProductId, ShippingAddress},
    traits::InventoryError,
};

//--------------------------------------     PricePolicy     ---------------------------------------------------------
/// How much to trust the unit prices in the client's cart snapshot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PricePolicy {
    /// Store the prices the client checked out with.
    #[default]
    TrustSnapshot,
    /// Compare every line with the catalog and refuse the order on any difference.
    Revalidate,
}

impl FromStr for PricePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "trust" | "trust_snapshot" => Ok(Self::TrustSnapshot),
            "revalidate" => Ok(Self::Revalidate),
            other => Err(format!("Unknown price policy: {other}")),
        }
    }
}

//--------------------------------------  ReconcileOptions   ---------------------------------------------------------
#[derive(Debug, Clone)]
pub struct ReconcileOptions {
    /// How long a parked payment waits for an address.
    pub pending_payment_ttl: chrono::Duration,
    pub gateway_timeout: Duration,
    pub storage_timeout: Duration,
    pub price_policy: PricePolicy,
    /// Currency for new orders and checkout sessions.
    pub currency: String,
}

impl Default for ReconcileOptions {
    fn default() -> Self {
        Self {
            pending_payment_ttl: chrono::Duration::hours(1),
            gateway_timeout: Duration::from_secs(10),
            storage_timeout: Duration::from_secs(5),
            price_policy: PricePolicy::default(),
            currency: DEFAULT_CURRENCY_CODE.to_string(),
        }
    }
}

//--------------------------------------      CartLine       ---------------------------------------------------------
/// A cart line as the storefront sends it. The product key goes by several names and quantity and price are optional.
///
/// Lines copied from a stored cart carry both the product reference and the line's own `_id`, so every key is read
/// separately and [`CartLine::product_key`] picks one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_id: Option<String>,
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub line_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub quantity: Option<i64>,
    #[serde(default, deserialize_with = "rounded_paise::deserialize_option")]
    pub price: Option<Paise>,
}

impl CartLine {
    pub fn new<S: Into<String>>(product_id: S, quantity: i64, price: Paise) -> Self {
        Self { product_id: Some(product_id.into()), quantity: Some(quantity), price: Some(price), ..Default::default() }
    }

    /// The first non-blank of `product`, `productId`, `_id` and `id`.
    pub fn product_key(&self) -> Option<&str> {
        [&self.product, &self.product_id, &self.line_id, &self.id]
            .into_iter()
            .filter_map(|k| k.as_deref().map(str::trim))
            .find(|k| !k.is_empty())
    }

    /// Applies the storefront defaults (quantity 1, price 0) and rejects lines that cannot be ordered.
    pub fn normalize(self) -> Result<LineItem, ReconcileError> {
        let product_id = self
            .product_key()
            .map(str::to_string)
            .ok_or_else(|| ReconcileError::InvalidLineItem("A line item has no product id".into()))?;
        let quantity = self.quantity.unwrap_or(1);
        if quantity < 1 {
            return Err(ReconcileError::InvalidLineItem(format!("{product_id} has quantity {quantity}")));
        }
        let price = self.price.unwrap_or_default();
        if price.is_negative() {
            return Err(ReconcileError::InvalidLineItem(format!("{product_id} has a negative price")));
        }
        Ok(LineItem::new(ProductId::from(product_id), quantity, price))
    }
}

impl From<LineItem> for CartLine {
    fn from(item: LineItem) -> Self {
        Self::new(item.product_id.0, item.quantity, item.unit_price)
    }
}

//--------------------------------------  ReconcileRequest   ---------------------------------------------------------
/// Everything the client reports after paying, plus the account making the call (if any).
#[derive(Debug, Clone, Default)]
pub struct ReconcileRequest {
    pub payment_id: String,
    pub gateway_order_id: String,
    pub signature: String,
    pub items: Vec<CartLine>,
    pub total_amount: Paise,
    pub coupon: Option<AppliedCoupon>,
    pub shipping_address: Option<ShippingAddress>,
    pub account_id: Option<i64>,
}

impl ReconcileRequest {
    pub fn new<S: Into<String>>(payment_id: S, gateway_order_id: S, signature: S) -> Self {
        Self {
            payment_id: payment_id.into(),
            gateway_order_id: gateway_order_id.into(),
            signature: signature.into(),
            ..Default::default()
        }
    }

    pub fn with_items(mut self, items: Vec<CartLine>, total_amount: Paise) -> Self {
        self.items = items;
        self.total_amount = total_amount;
        self
    }

    pub fn with_account_id(mut self, account_id: i64) -> Self {
        self.account_id = Some(account_id);
        self
    }

    pub fn with_shipping_address(mut self, address: ShippingAddress) -> Self {
        self.shipping_address = Some(address);
        self
    }

    pub fn with_coupon(mut self, coupon: AppliedCoupon) -> Self {
        self.coupon = Some(coupon);
        self
    }

    /// The wire names of the required fields that are blank.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        [("payment_id", &self.payment_id), ("order_id", &self.gateway_order_id), ("signature", &self.signature)]
            .into_iter()
            .filter(|(_, v)| v.trim().is_empty())
            .map(|(name, _)| name)
            .collect()
    }
}

//--------------------------------------  ReconcileOutcome   ---------------------------------------------------------
/// A line item whose stock could not be adjusted. The order it belongs to still stands.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StockAdjustmentFailure {
    pub product_id: ProductId,
    pub quantity: i64,
    pub reason: String,
}

impl StockAdjustmentFailure {
    pub fn new(item: &LineItem, reason: &InventoryError) -> Self {
        Self { product_id: item.product_id.clone(), quantity: item.quantity, reason: reason.to_string() }
    }
}

/// What happened after the order was committed. Nothing in here undoes the order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FollowUpReport {
    pub stock_failures: Vec<StockAdjustmentFailure>,
    pub cart_cleared: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cart_error: Option<String>,
}

impl FollowUpReport {
    pub fn is_clean(&self) -> bool {
        self.stock_failures.is_empty() && self.cart_error.is_none()
    }
}

#[derive(Debug, Clone)]
pub enum ReconcileOutcome {
    /// A new order was stored.
    Created { order: Order, report: FollowUpReport },
    /// The payment had already been turned into an order. Nothing was changed.
    AlreadyProcessed(Order),
    /// The payment is captured but parked until a shipping address is known.
    NeedsAddress(PendingPayment),
}

impl ReconcileOutcome {
    pub fn order(&self) -> Option<&Order> {
        match self {
            ReconcileOutcome::Created { order, .. } | ReconcileOutcome::AlreadyProcessed(order) => Some(order),
            ReconcileOutcome::NeedsAddress(_) => None,
        }
    }
}

//--------------------------------------    StatusChange     ---------------------------------------------------------
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusChange {
    pub order: Order,
    pub previous_status: FulfillmentStatus,
    /// False when the order already had the requested status.
    pub changed: bool,
    pub restock_failures: Vec<StockAdjustmentFailure>,
}
