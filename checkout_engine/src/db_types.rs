use std::{fmt::Display, str::FromStr};

use checkout_common::{rounded_paise, Paise};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{sqlite::SqliteRow, types::Json, FromRow, Row, Type};
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[error("Conversion error: {0}")]
pub struct ConversionError(String);

//--------------------------------------      ProductId      ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Type, Serialize, Deserialize)]
#[sqlx(transparent)]
#[serde(transparent)]
pub struct ProductId(pub String);

impl ProductId {
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl Display for ProductId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl<S: Into<String>> From<S> for ProductId {
    fn from(value: S) -> Self {
        Self(value.into())
    }
}

//--------------------------------------      LineItem       ---------------------------------------------------------
/// A single line of a cart or order. The unit price is a snapshot taken when the customer checked out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct LineItem {
    pub product_id: ProductId,
    pub quantity: i64,
    pub unit_price: Paise,
}

impl LineItem {
    pub fn new<P: Into<ProductId>>(product_id: P, quantity: i64, unit_price: Paise) -> Self {
        Self { product_id: product_id.into(), quantity, unit_price }
    }

    pub fn subtotal(&self) -> Paise {
        self.unit_price * self.quantity
    }
}

//--------------------------------------   ShippingAddress   ---------------------------------------------------------
fn default_country() -> String {
    "India".to_string()
}

/// A delivery address. Orders carry a copy of the address, so later edits to saved addresses do not change them.
///
/// Missing keys read as blank. [`ShippingAddress::is_complete`] decides whether the address can be used.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingAddress {
    #[serde(alias = "street", default)]
    pub address_line1: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address_line2: Option<String>,
    #[serde(default)]
    pub city: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(alias = "zipCode", default)]
    pub pincode: String,
    #[serde(default = "default_country")]
    pub country: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

impl ShippingAddress {
    pub fn new<S: Into<String>>(address_line1: S, city: S, pincode: S) -> Self {
        Self {
            address_line1: address_line1.into(),
            address_line2: None,
            city: city.into(),
            state: None,
            pincode: pincode.into(),
            country: default_country(),
            phone: None,
        }
    }

    pub fn with_state<S: Into<String>>(mut self, state: S) -> Self {
        self.state = Some(state.into());
        self
    }

    pub fn with_phone<S: Into<String>>(mut self, phone: S) -> Self {
        self.phone = Some(phone.into());
        self
    }

    /// An address is usable for delivery if its mandatory parts are not blank.
    pub fn is_complete(&self) -> bool {
        !self.address_line1.trim().is_empty() && !self.city.trim().is_empty() && !self.pincode.trim().is_empty()
    }
}

impl FromRow<'_, SqliteRow> for ShippingAddress {
    fn from_row(row: &SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            address_line1: row.try_get("address_line1")?,
            address_line2: row.try_get("address_line2")?,
            city: row.try_get("city")?,
            state: row.try_get("state")?,
            pincode: row.try_get("pincode")?,
            country: row.try_get("country")?,
            phone: row.try_get("phone")?,
        })
    }
}

//--------------------------------------    AppliedCoupon    ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppliedCoupon {
    pub code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discount_percentage: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "rounded_paise::deserialize_option")]
    pub discount_amount: Option<Paise>,
}

//--------------------------------------    PaymentStatus    ---------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Paid,
    Failed,
    Cancelled,
}

impl Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PaymentStatus::Pending => write!(f, "pending"),
            PaymentStatus::Paid => write!(f, "paid"),
            PaymentStatus::Failed => write!(f, "failed"),
            PaymentStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

//--------------------------------------  FulfillmentStatus  ---------------------------------------------------------
/// Where an order is in its delivery lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum FulfillmentStatus {
    /// Created but not yet paid. Reconciled orders never sit in this state.
    Pending,
    /// Paid and waiting to be shipped.
    Processing,
    Shipped,
    Delivered,
    /// Cancelled by an admin. Inventory is returned to stock on entry and the order cannot leave this state.
    Cancelled,
}

impl FulfillmentStatus {
    /// The statuses an admin may set through the fulfillment API.
    pub fn is_admin_assignable(&self) -> bool {
        matches!(self, Self::Processing | Self::Delivered | Self::Cancelled)
    }
}

impl Display for FulfillmentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FulfillmentStatus::Pending => write!(f, "pending"),
            FulfillmentStatus::Processing => write!(f, "processing"),
            FulfillmentStatus::Shipped => write!(f, "shipped"),
            FulfillmentStatus::Delivered => write!(f, "delivered"),
            FulfillmentStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

impl FromStr for FulfillmentStatus {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "processing" => Ok(Self::Processing),
            "shipped" => Ok(Self::Shipped),
            "delivered" => Ok(Self::Delivered),
            "cancelled" => Ok(Self::Cancelled),
            s => Err(ConversionError(format!("Invalid order status: {s}"))),
        }
    }
}

//-------------------------------------- PendingPaymentStatus ---------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PendingPaymentStatus {
    Pending,
    Completed,
    Cancelled,
}

impl Display for PendingPaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PendingPaymentStatus::Pending => write!(f, "pending"),
            PendingPaymentStatus::Completed => write!(f, "completed"),
            PendingPaymentStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

//--------------------------------------        Role         ---------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Type, Serialize, Deserialize)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Customer,
    Admin,
}

impl Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Customer => write!(f, "customer"),
            Role::Admin => write!(f, "admin"),
        }
    }
}

impl FromStr for Role {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "customer" => Ok(Self::Customer),
            "admin" => Ok(Self::Admin),
            s => Err(ConversionError(format!("Invalid role: {s}"))),
        }
    }
}

//--------------------------------------       Account       ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Account {
    pub id: i64,
    pub email: String,
    pub full_name: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct CartItem {
    pub product_id: ProductId,
    pub quantity: i64,
}

//--------------------------------------       Product       ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Product {
    pub product_id: ProductId,
    pub name: String,
    pub price: Paise,
    pub stock: i64,
    pub updated_at: DateTime<Utc>,
}

//--------------------------------------        Order        ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: i64,
    pub account_id: Option<i64>,
    pub items: Vec<LineItem>,
    pub total_amount: Paise,
    pub currency: String,
    pub gateway_order_id: String,
    pub gateway_payment_id: String,
    #[serde(skip_serializing)]
    pub gateway_signature: String,
    pub payment_status: PaymentStatus,
    pub status: FulfillmentStatus,
    pub shipping_address: ShippingAddress,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coupon: Option<AppliedCoupon>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    pub fn is_owned_by(&self, account_id: i64) -> bool {
        self.account_id == Some(account_id)
    }
}

/// Line items live in their own table, so rows decode with an empty item list that the caller fills in.
impl FromRow<'_, SqliteRow> for Order {
    fn from_row(row: &SqliteRow) -> Result<Self, sqlx::Error> {
        let shipping_address: Json<ShippingAddress> = row.try_get("shipping_address")?;
        let coupon: Option<Json<AppliedCoupon>> = row.try_get("coupon")?;
        Ok(Self {
            id: row.try_get("id")?,
            account_id: row.try_get("account_id")?,
            items: Vec::new(),
            total_amount: row.try_get("total_amount")?,
            currency: row.try_get("currency")?,
            gateway_order_id: row.try_get("gateway_order_id")?,
            gateway_payment_id: row.try_get("gateway_payment_id")?,
            gateway_signature: row.try_get("gateway_signature")?,
            payment_status: row.try_get("payment_status")?,
            status: row.try_get("status")?,
            shipping_address: shipping_address.0,
            coupon: coupon.map(|c| c.0),
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

//--------------------------------------      NewOrder       ---------------------------------------------------------
/// A paid order, ready to be written. Reconciled orders are always stored as `paid` / `processing`.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub account_id: Option<i64>,
    pub items: Vec<LineItem>,
    pub total_amount: Paise,
    pub currency: String,
    pub gateway_order_id: String,
    pub gateway_payment_id: String,
    pub gateway_signature: String,
    pub shipping_address: ShippingAddress,
    pub coupon: Option<AppliedCoupon>,
}

//--------------------------------------   PendingPayment    ---------------------------------------------------------
/// A captured payment that could not yet become an order, usually because no shipping address was known.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingPayment {
    pub id: i64,
    pub account_id: Option<i64>,
    pub gateway_order_id: String,
    pub gateway_payment_id: String,
    #[serde(skip_serializing)]
    pub signature: String,
    pub cart_snapshot: Vec<LineItem>,
    pub total_amount: Paise,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coupon: Option<AppliedCoupon>,
    pub status: PendingPaymentStatus,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl PendingPayment {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }

    /// Guest records (no account) are only reachable by whoever holds the gateway order id and signature, never
    /// through an account.
    pub fn is_owned_by(&self, account_id: Option<i64>) -> bool {
        self.account_id == account_id
    }
}

impl FromRow<'_, SqliteRow> for PendingPayment {
    fn from_row(row: &SqliteRow) -> Result<Self, sqlx::Error> {
        let cart_snapshot: Json<Vec<LineItem>> = row.try_get("cart_snapshot")?;
        let coupon: Option<Json<AppliedCoupon>> = row.try_get("coupon")?;
        Ok(Self {
            id: row.try_get("id")?,
            account_id: row.try_get("account_id")?,
            gateway_order_id: row.try_get("gateway_order_id")?,
            gateway_payment_id: row.try_get("gateway_payment_id")?,
            signature: row.try_get("signature")?,
            cart_snapshot: cart_snapshot.0,
            total_amount: row.try_get("total_amount")?,
            coupon: coupon.map(|c| c.0),
            status: row.try_get("status")?,
            created_at: row.try_get("created_at")?,
            expires_at: row.try_get("expires_at")?,
        })
    }
}

#[derive(Debug, Clone)]
pub struct NewPendingPayment {
    pub account_id: Option<i64>,
    pub gateway_order_id: String,
    pub gateway_payment_id: String,
    pub signature: String,
    pub cart_snapshot: Vec<LineItem>,
    pub total_amount: Paise,
    pub coupon: Option<AppliedCoupon>,
    pub expires_at: DateTime<Utc>,
}
