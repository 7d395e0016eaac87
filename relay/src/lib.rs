//! Tailpush - Tailscale webhook to Pushover relay.
//!
//! ## Architecture
//!
//! ```text
//! Tailscale → Web Server → verify signature → parse events → Pushover (one message per event)
//! ```

pub mod config;
pub mod event;
pub mod notify;
pub mod web;

// Re-export commonly used types
pub use config::{Config, ConfigError};
pub use event::{parse_events, DomainEvent, EventData, ParseError};
pub use notify::{dispatch_batch, BatchReport, DispatchError, Dispatcher, PushoverCredentials};
pub use web::{router, verify_tailscale_signature, AppState};
