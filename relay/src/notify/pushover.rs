//! Sending a single event to the Pushover messages API.

use std::time::Duration;

use reqwest::Client;
use thiserror::Error;
use tracing::{error, info};

use super::payload::{NotificationPayload, PushoverCredentials};
use crate::config::Config;
use crate::event::DomainEvent;

/// Path of the Pushover message endpoint, relative to the API base URL.
pub const PUSHOVER_MESSAGES_PATH: &str = "/1/messages.json";

/// Longest prefix of a rejection body kept for logs and errors.
const MAX_ERROR_BODY_LEN: usize = 512;

/// Failure to deliver one notification.
#[derive(Error, Debug)]
pub enum DispatchError {
    #[error("Pushover API returned {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("request to Pushover failed: {0}")]
    Transport(#[from] reqwest::Error),
}

impl DispatchError {
    /// HTTP status returned by Pushover, if it answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            DispatchError::Rejected { status, .. } => Some(*status),
            DispatchError::Transport(e) => e.status().map(|s| s.as_u16()),
        }
    }
}

/// Delivers events to Pushover.
///
/// Cheap to clone; the underlying `reqwest::Client` shares its connection pool.
#[derive(Clone, Debug)]
pub struct Dispatcher {
    client: Client,
    endpoint: String,
    credentials: PushoverCredentials,
    timeout: Duration,
}

impl Dispatcher {
    pub fn new(
        client: Client,
        base_url: &str,
        credentials: PushoverCredentials,
        timeout: Duration,
    ) -> Self {
        Self {
            client,
            endpoint: format!("{}{}", base_url.trim_end_matches('/'), PUSHOVER_MESSAGES_PATH),
            credentials,
            timeout,
        }
    }

    /// Build a dispatcher with its own HTTP client from the loaded configuration.
    pub fn from_config(config: &Config) -> Result<Self, reqwest::Error> {
        let client = Client::builder().build()?;

        Ok(Self::new(
            client,
            config.pushover_api_url.as_str(),
            config.credentials(),
            Duration::from_millis(config.request_timeout_ms),
        ))
    }

    /// Full URL messages are posted to.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Send one event as a Pushover notification.
    ///
    /// Any non-2xx answer is a [`DispatchError::Rejected`] carrying the status
    /// and response text.
    pub async fn dispatch(&self, event: &DomainEvent) -> Result<(), DispatchError> {
        let payload = NotificationPayload::from_event(event, &self.credentials);

        info!(
            event_type = %event.event_type,
            tailnet = %event.tailnet,
            has_url = payload.url.is_some(),
            "pushover_send_starting"
        );

        let response = match self
            .client
            .post(&self.endpoint)
            .timeout(self.timeout)
            .json(&payload)
            .send()
            .await
        {
            Ok(resp) => resp,
            Err(e) => {
                if e.is_timeout() {
                    error!(
                        event_type = %event.event_type,
                        timeout_seconds = self.timeout.as_secs_f64(),
                        error = %e,
                        "pushover_send_timeout"
                    );
                } else {
                    error!(
                        event_type = %event.event_type,
                        error = %e,
                        "pushover_send_error"
                    );
                }
                return Err(DispatchError::Transport(e));
            }
        };

        let status = response.status();
        if !status.is_success() {
            let mut body = response.text().await.unwrap_or_default();
            truncate_at_char_boundary(&mut body, MAX_ERROR_BODY_LEN);

            error!(
                event_type = %event.event_type,
                status_code = status.as_u16(),
                response_body = %body,
                "pushover_send_rejected"
            );

            return Err(DispatchError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        info!(
            event_type = %event.event_type,
            tailnet = %event.tailnet,
            status_code = status.as_u16(),
            "pushover_send_complete"
        );

        Ok(())
    }
}

fn truncate_at_char_boundary(s: &mut String, max: usize) {
    if s.len() <= max {
        return;
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    s.truncate(end);
}
