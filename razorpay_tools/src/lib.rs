//! A thin client for the two Razorpay REST calls the checkout service needs:
//!
//! * `POST /orders` creates the gateway order that the storefront hands to the payment widget.
//! * `GET /payments/{id}` reports whether a payment has actually been captured.
//!
//! Everything else about the gateway (refunds, settlements, webhooks) is out of scope.
mod api;
mod config;
mod data_objects;
mod error;

pub use api::RazorpayApi;
pub use config::RazorpayConfig;
pub use data_objects::{NewRazorpayOrder, RazorpayOrder, RazorpayPayment, RazorpayPaymentStatus};
pub use error::RazorpayApiError;
