//! Checkout Engine
//!
//! The checkout engine reconciles payments taken by a hosted payment gateway with the store's orders. It is provider
//! agnostic: the gateway sits behind the [`PaymentGateway`] trait.
//!
//! The library is divided into these sections:
//! 1. Storage ([`mod@traits`] and [`SqliteDatabase`]). The traits describe what a backend must provide. SQLite is the
//!    supported backend. The data types stored in the database live in [`mod@db_types`].
//! 2. The public API ([`mod@checkout_api`]). [`ReconciliationApi`] turns verified, captured payments into orders,
//!    exactly once per payment. [`FulfillmentApi`], [`OrdersApi`] and [`PendingPaymentApi`] cover the rest of the
//!    order lifecycle.
//!
//! The engine also emits events ([`mod@events`]) when orders are created or cancelled and when a payment has to wait for
//! a shipping address. Hooks can subscribe to these to drive invoicing, emails and the like.
pub mod checkout_api;
pub mod db_types;
pub mod events;
pub mod helpers;
pub mod traits;

#[cfg(feature = "sqlite")]
pub mod sqlite;

#[cfg(any(feature = "test_utils", test))]
pub mod test_utils;

pub use checkout_api::{
    checkout_objects,
    errors::{FulfillmentError, OrdersApiError, ReconcileError},
    fulfillment_api::FulfillmentApi,
    order_objects,
    orders_api::OrdersApi,
    pending_payment_api::PendingPaymentApi,
    reconciliation_api::ReconciliationApi,
};
pub use helpers::{PaymentSignature, SignatureVerifier};
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteDatabase;
pub use traits::{
    AccountDirectory,
    CheckoutDatabase,
    GatewayError,
    GatewayOrder,
    GatewayPayment,
    GatewayPaymentStatus,
    InsertOrderResult,
    InventoryError,
    InventoryManagement,
    OrderManagement,
    OrderPage,
    PaymentGateway,
    PendingPaymentManagement,
    StoreError,
};
