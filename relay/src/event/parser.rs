//! Webhook body decoding.

use thiserror::Error;
use tracing::{info, warn};

use super::types::DomainEvent;

/// The body did not decode to an array of events.
#[derive(Error, Debug)]
#[error("failed to parse webhook body: {0}")]
pub struct ParseError(#[from] serde_json::Error);

/// Decode a verified webhook body into its events.
///
/// Every event must carry `timestamp`, `version`, `type`, `tailnet` and
/// `message`; a missing field fails the whole body.
pub fn parse_events(body: &str) -> Result<Vec<DomainEvent>, ParseError> {
    let events: Vec<DomainEvent> = serde_json::from_str(body).map_err(|e| {
        warn!(
            error = %e,
            line = e.line(),
            column = e.column(),
            body_length = body.len(),
            "webhook_body_parse_failed"
        );
        ParseError(e)
    })?;

    info!(event_count = events.len(), "webhook_body_parsed");

    Ok(events)
}
