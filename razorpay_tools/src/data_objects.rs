use std::fmt::Display;

use checkout_common::Paise;
use serde::{Deserialize, Serialize};

/// Body for `POST /orders`.
#[derive(Debug, Clone, Serialize)]
pub struct NewRazorpayOrder {
    pub amount: Paise,
    pub currency: String,
    pub receipt: String,
    /// 1 asks the gateway to capture automatically once the customer authorises the payment.
    pub payment_capture: u8,
}

impl NewRazorpayOrder {
    pub fn new<S: Into<String>>(amount: Paise, currency: S, receipt: S) -> Self {
        Self { amount, currency: currency.into(), receipt: receipt.into(), payment_capture: 1 }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RazorpayOrder {
    pub id: String,
    pub amount: Paise,
    #[serde(default)]
    pub amount_paid: Paise,
    #[serde(default)]
    pub amount_due: Paise,
    pub currency: String,
    #[serde(default)]
    pub receipt: Option<String>,
    pub status: String,
    #[serde(default)]
    pub attempts: u32,
    pub created_at: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RazorpayPaymentStatus {
    Created,
    Authorized,
    Captured,
    Refunded,
    Failed,
    #[serde(other)]
    Unknown,
}

impl Display for RazorpayPaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Created => "created",
            Self::Authorized => "authorized",
            Self::Captured => "captured",
            Self::Refunded => "refunded",
            Self::Failed => "failed",
            Self::Unknown => "unknown",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RazorpayPayment {
    pub id: String,
    pub amount: Paise,
    pub currency: String,
    pub status: RazorpayPaymentStatus,
    #[serde(default)]
    pub order_id: Option<String>,
    #[serde(default)]
    pub method: Option<String>,
    #[serde(default)]
    pub captured: bool,
    #[serde(default)]
    pub email: Option<String>,
    pub created_at: i64,
}
