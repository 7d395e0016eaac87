//! Pushover notification delivery.
//!
//! ## Dispatch Flow
//!
//! ```text
//! [DomainEvent] → dispatch_batch() → Dispatcher::dispatch() per event → BatchReport
//! ```

pub mod batch;
pub mod payload;
pub mod pushover;

#[cfg(test)]
pub(crate) mod mock;

pub use batch::{dispatch_batch, BatchReport, EventOutcome};
pub use payload::{NotificationPayload, PushoverCredentials};
pub use pushover::{DispatchError, Dispatcher, PUSHOVER_MESSAGES_PATH};
