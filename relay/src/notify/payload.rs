//! Pushover message body built from a Tailscale event.

use std::fmt;

use serde::Serialize;

use crate::event::DomainEvent;

/// Credentials sent with every Pushover message.
#[derive(Clone)]
pub struct PushoverCredentials {
    api_token: String,
    user_key: String,
}

impl PushoverCredentials {
    pub fn new(api_token: String, user_key: String) -> Self {
        Self { api_token, user_key }
    }
}

impl fmt::Debug for PushoverCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PushoverCredentials")
            .field("api_token", &"<redacted>")
            .field("user_key", &"<redacted>")
            .finish()
    }
}

/// JSON body of a `POST /1/messages.json` request.
///
/// Holds credentials, so it has no `Debug` impl and is never logged.
#[derive(Serialize)]
pub struct NotificationPayload<'a> {
    pub token: &'a str,
    pub title: String,
    pub message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<&'a str>,
    pub user: &'a str,
}

impl<'a> NotificationPayload<'a> {
    /// Build the notification for one event.
    ///
    /// The title is `"{tailnet} - {type}"` and the url is the event's
    /// admin console link, when there is one.
    pub fn from_event(event: &'a DomainEvent, credentials: &'a PushoverCredentials) -> Self {
        Self {
            token: &credentials.api_token,
            title: format!("{} - {}", event.tailnet, event.event_type),
            message: &event.message,
            url: event.url(),
            user: &credentials.user_key,
        }
    }
}
