use std::time::Duration;

use checkout_common::Secret;
use log::*;

const DEFAULT_API_URL: &str = "https://api.razorpay.com/v1";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone)]
pub struct RazorpayConfig {
    /// The public key id. This is also handed out to storefront clients so they can open the payment widget.
    pub key_id: String,
    pub key_secret: Secret<String>,
    pub api_url: String,
    /// Upper bound on any single request to the gateway.
    pub timeout: Duration,
}

impl Default for RazorpayConfig {
    fn default() -> Self {
        Self {
            key_id: String::default(),
            key_secret: Secret::default(),
            api_url: DEFAULT_API_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl RazorpayConfig {
    pub fn new_from_env_or_default() -> Self {
        let key_id = std::env::var("CHECKOUT_RAZORPAY_KEY_ID").unwrap_or_else(|_| {
            warn!("CHECKOUT_RAZORPAY_KEY_ID not set, gateway calls will be rejected");
            String::default()
        });
        let key_secret = Secret::new(std::env::var("CHECKOUT_RAZORPAY_KEY_SECRET").unwrap_or_else(|_| {
            warn!("CHECKOUT_RAZORPAY_KEY_SECRET not set. Payment signatures cannot be verified");
            String::default()
        }));
        let api_url = std::env::var("CHECKOUT_RAZORPAY_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string());
        let timeout = std::env::var("CHECKOUT_GATEWAY_TIMEOUT_SECS")
            .ok()
            .and_then(|s| {
                s.parse::<u64>()
                    .map_err(|e| warn!("Invalid value for CHECKOUT_GATEWAY_TIMEOUT_SECS ({s}). {e}"))
                    .ok()
            })
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_TIMEOUT);
        Self { key_id, key_secret, api_url, timeout }
    }

    pub fn with_api_url<S: Into<String>>(mut self, url: S) -> Self {
        self.api_url = url.into();
        self
    }
}
