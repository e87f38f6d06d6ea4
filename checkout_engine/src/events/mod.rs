//! Checkout lifecycle events.
//!
//! Other parts of the system (invoicing, notification mailers and the like) can hook into these events without the
//! checkout APIs knowing about them.
mod channel;
mod event_types;
mod hooks;

pub use channel::{EventHandler, EventProducer, Handler};
pub use event_types::*;
pub use hooks::{EventHandlers, EventHooks, EventProducers};
