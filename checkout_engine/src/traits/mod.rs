//! # Backend contracts
//!
//! The traits in this module define what a storage backend (and a payment gateway client) must provide so that the
//! checkout APIs can run on top of it.
//!
//! * [`OrderManagement`] stores and queries orders. Inserting a paid order is idempotent per gateway payment id.
//! * [`PendingPaymentManagement`] holds captured payments that are waiting for a shipping address.
//! * [`InventoryManagement`] is the stock ledger. Decrements never take stock below zero.
//! * [`AccountDirectory`] resolves accounts, their saved addresses and live carts.
//! * [`CheckoutDatabase`] bundles all the storage traits for backends that provide everything.
//! * [`PaymentGateway`] is the seam to the external payment provider.
mod account_directory;
mod checkout_database;
mod data_objects;
mod inventory;
mod order_management;
mod payment_gateway;
mod pending_payments;

pub use account_directory::AccountDirectory;
pub use checkout_database::CheckoutDatabase;
pub use data_objects::{InsertOrderResult, OrderPage, StoreError};
pub use inventory::{InventoryError, InventoryManagement};
pub use order_management::OrderManagement;
pub use payment_gateway::{GatewayError, GatewayOrder, GatewayPayment, GatewayPaymentStatus, PaymentGateway};
pub use pending_payments::PendingPaymentManagement;
