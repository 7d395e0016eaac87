//! Event types sent by Tailscale webhooks.
//!
//! A webhook body is a JSON array of [`DomainEvent`]s. Fields Tailscale adds
//! later are ignored on decode.

use serde::{Deserialize, Serialize};

/// A single Tailscale event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainEvent {
    /// When the event happened, as sent (RFC 3339)
    pub timestamp: String,
    /// Event schema version
    pub version: u32,
    /// Event category, e.g. `nodeCreated` or `policyUpdate`
    #[serde(rename = "type")]
    pub event_type: String,
    /// Tailnet the event belongs to
    pub tailnet: String,
    /// Human-readable description
    pub message: String,
    /// Category-specific details
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<EventData>,
}

impl DomainEvent {
    /// Deep link into the admin console, when the event carries one.
    pub fn url(&self) -> Option<&str> {
        self.data.as_ref().and_then(|d| d.url.as_deref())
    }
}

/// Category-specific event details.
///
/// Which fields are present depends on the event type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actor: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old_roles: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_roles: Option<Vec<String>>,
    #[serde(default, rename = "nodeID", skip_serializing_if = "Option::is_none")]
    pub node_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub managed_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiration: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_policy: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old_policy: Option<String>,
}
