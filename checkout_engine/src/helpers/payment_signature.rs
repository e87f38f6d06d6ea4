//! Verification of the signature the payment gateway hands the client after a successful checkout.
//!
//! The gateway signs `"{gateway_order_id}|{gateway_payment_id}"` with HMAC-SHA256 under the merchant's API secret and
//! hex-encodes the result. Anyone holding the secret can reproduce it, so a matching signature proves that the payment
//! id really belongs to the gateway order.
use checkout_common::Secret;
use hmac::{Hmac, Mac};
use log::warn;
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// The three values the client reports back after paying.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentSignature<'a> {
    pub gateway_order_id: &'a str,
    pub gateway_payment_id: &'a str,
    pub signature: &'a str,
}

impl<'a> PaymentSignature<'a> {
    pub fn new(gateway_order_id: &'a str, gateway_payment_id: &'a str, signature: &'a str) -> Self {
        Self { gateway_order_id, gateway_payment_id, signature }
    }

    fn message(&self) -> String {
        format!("{}|{}", self.gateway_order_id, self.gateway_payment_id)
    }
}

#[derive(Clone)]
pub struct SignatureVerifier {
    secret: Secret<String>,
}

impl SignatureVerifier {
    pub fn new(secret: Secret<String>) -> Self {
        Self { secret }
    }

    /// Returns `true` only if the signature is well-formed hex and matches. The comparison runs in constant time.
    /// A blank secret never verifies anything.
    pub fn verify(&self, sig: &PaymentSignature<'_>) -> bool {
        if self.secret.is_empty() {
            warn!("🔏️ No gateway secret is configured. Refusing to verify payment signatures.");
            return false;
        }
        let Ok(expected) = hex::decode(sig.signature.trim()) else {
            return false;
        };
        let Ok(mut mac) = HmacSha256::new_from_slice(self.secret.reveal().as_bytes()) else {
            return false;
        };
        mac.update(sig.message().as_bytes());
        mac.verify_slice(&expected).is_ok()
    }

    /// Produces the hex signature the gateway would issue for this order and payment pair.
    pub fn sign(&self, gateway_order_id: &str, gateway_payment_id: &str) -> String {
        let message = PaymentSignature::new(gateway_order_id, gateway_payment_id, "").message();
        let Ok(mut mac) = HmacSha256::new_from_slice(self.secret.reveal().as_bytes()) else {
            return String::new();
        };
        mac.update(message.as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }
}
