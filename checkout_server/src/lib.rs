//! # Checkout server
//! This crate hosts the HTTP server for the checkout service. It is responsible for:
//! * Opening checkout sessions with the payment gateway.
//! * Accepting the client's report of a completed payment and handing it to the reconciliation engine.
//! * Letting customers read their orders and resume payments that were parked for want of an address.
//! * Letting admins list orders and move them through fulfillment.
//!
//! ## Configuration
//! The server is configured via environment variables. See [config](config/index.html) for more information.
//!
//! ## Routes
//! * `/health`: A health check route that returns a 200 OK response.
//! * `/api/payments/...`: Checkout sessions, payment verification and pending payments.
//! * `/api/orders/...`: Order listings and fulfillment updates.

pub mod auth;
pub mod cli;
pub mod config;
pub mod data_objects;
pub mod errors;
pub mod expiry_worker;
pub mod integrations;
pub mod middleware;
pub mod routes;
pub mod server;

#[cfg(test)]
mod endpoint_tests;
