use std::sync::Arc;

use checkout_common::Paise;
use log::*;
use reqwest::{Client, Method};
use serde::{de::DeserializeOwned, Serialize};

use crate::{
    config::RazorpayConfig,
    data_objects::{NewRazorpayOrder, RazorpayOrder, RazorpayPayment},
    RazorpayApiError,
};

#[derive(Clone)]
pub struct RazorpayApi {
    config: RazorpayConfig,
    client: Arc<Client>,
}

impl RazorpayApi {
    pub fn new(config: RazorpayConfig) -> Result<Self, RazorpayApiError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| RazorpayApiError::Initialization(e.to_string()))?;
        Ok(Self { config, client: Arc::new(client) })
    }

    /// The public key id, which the storefront needs to open the checkout widget.
    pub fn key_id(&self) -> &str {
        self.config.key_id.as_str()
    }

    pub async fn rest_query<T: DeserializeOwned, B: Serialize>(
        &self,
        method: Method,
        path: &str,
        body: Option<B>,
    ) -> Result<T, RazorpayApiError> {
        let url = self.url(path);
        trace!("Sending REST query: {method} {url}");
        let mut req = self
            .client
            .request(method, url)
            .basic_auth(&self.config.key_id, Some(self.config.key_secret.reveal()));
        if let Some(body) = body {
            req = req.json(&body);
        }
        let response = req.send().await.map_err(|e| {
            if e.is_timeout() {
                RazorpayApiError::Timeout(e.to_string())
            } else {
                RazorpayApiError::RestResponseError(e.to_string())
            }
        })?;
        if response.status().is_success() {
            trace!("REST query successful. {}", response.status());
            response.json::<T>().await.map_err(|e| RazorpayApiError::JsonError(e.to_string()))
        } else {
            let status = response.status().as_u16();
            let message = response.text().await.map_err(|e| RazorpayApiError::RestResponseError(e.to_string()))?;
            Err(RazorpayApiError::QueryError { status, message })
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.config.api_url.trim_end_matches('/'))
    }

    pub async fn create_order(
        &self,
        amount: Paise,
        currency: &str,
        receipt: &str,
    ) -> Result<RazorpayOrder, RazorpayApiError> {
        if !amount.is_positive() {
            return Err(RazorpayApiError::InvalidAmount(format!("{amount} must be greater than zero")));
        }
        let body = NewRazorpayOrder::new(amount, currency, receipt);
        debug!("Creating gateway order for {amount} ({receipt})");
        let order = self.rest_query::<RazorpayOrder, _>(Method::POST, "/orders", Some(body)).await?;
        info!("Created gateway order {} for {amount}", order.id);
        Ok(order)
    }

    pub async fn fetch_payment(&self, payment_id: &str) -> Result<RazorpayPayment, RazorpayApiError> {
        let path = format!("/payments/{payment_id}");
        debug!("Fetching payment {payment_id}");
        let payment = self.rest_query::<RazorpayPayment, ()>(Method::GET, &path, None).await?;
        debug!("Payment {payment_id} has status {}", payment.status);
        Ok(payment)
    }
}
