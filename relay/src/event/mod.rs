//! Tailscale webhook events.
//!
//! ## Processing Flow
//!
//! ```text
//! verified body → parse_events() → Vec<DomainEvent>
//! ```

pub mod parser;
pub mod types;

pub use parser::{parse_events, ParseError};
pub use types::{DomainEvent, EventData};
