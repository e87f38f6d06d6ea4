//! # Checkout engine public API
//!
//! The `checkout_api` module exposes the programmatic API of the checkout engine. Each API wraps a storage backend
//! that implements the traits it needs, so an API can be built on any backend that provides them.
//!
//! * [`reconciliation_api`] turns verified gateway payments into orders. It is the heart of the engine.
//! * [`fulfillment_api`] moves orders through their delivery lifecycle and restocks on cancellation.
//! * [`orders_api`] lists and looks up orders for their owners and for admins.
//! * [`pending_payment_api`] reads parked payments for their owner and sweeps expired ones.
//!
//! ```rust,ignore
//! use checkout_engine::{ReconciliationApi, SqliteDatabase, SignatureVerifier};
//! let db = SqliteDatabase::new_with_url(...).await?;
//! let api = ReconciliationApi::new(db, gateway, SignatureVerifier::new(secret));
//! let outcome = api.reconcile(request).await?;
//! ```
pub mod checkout_objects;
pub mod errors;
pub mod fulfillment_api;
pub mod order_objects;
pub mod orders_api;
pub mod pending_payment_api;
pub mod reconciliation_api;

mod bounded;
