//! Configuration module for environment variable parsing.
//!
//! Everything the relay needs is read once at start-up into [`Config`] and
//! handed to the web layer explicitly.

use std::env;
use std::fmt;

use thiserror::Error;
use tracing::warn;
use url::Url;

use crate::notify::PushoverCredentials;

/// Default Pushover API base URL.
pub const DEFAULT_PUSHOVER_API_URL: &str = "https://api.pushover.net";

/// Errors raised while loading configuration.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("required environment variable {0} is not set")]
    Missing(&'static str),

    #[error("environment variable {name} is not a valid http(s) URL: {value}")]
    InvalidUrl { name: &'static str, value: String },
}

/// Application configuration loaded from environment variables.
#[derive(Clone)]
pub struct Config {
    /// Port for the web server to listen on
    pub port: u16,

    /// Base URL of the Pushover API, e.g. https://api.pushover.net
    pub pushover_api_url: Url,

    /// Pushover application token
    pub pushover_api_token: String,

    /// Pushover user (recipient) key
    pub pushover_user_key: String,

    /// Shared secret Tailscale signs webhooks with
    pub tailscale_webhook_secret: String,

    /// Timeout for each outbound notification request in milliseconds
    pub request_timeout_ms: u64,

    /// Maximum number of notifications sent concurrently for one webhook
    pub max_in_flight_notifications: usize,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |name: &'static str| {
            lookup(name)
                .filter(|v| !v.trim().is_empty())
                .ok_or(ConfigError::Missing(name))
        };

        let raw_url = lookup("PUSHOVER_API_URL")
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_PUSHOVER_API_URL.to_string());
        let pushover_api_url = parse_http_url("PUSHOVER_API_URL", &raw_url)?;

        Ok(Config {
            port: parse_or("PORT", lookup("PORT"), 8080),

            pushover_api_url,

            pushover_api_token: required("PUSHOVER_API_TOKEN")?,

            pushover_user_key: required("PUSHOVER_USER_KEY")?,

            tailscale_webhook_secret: required("TAILSCALE_WEBHOOK_SECRET")?,

            request_timeout_ms: parse_or("REQUEST_TIMEOUT_MS", lookup("REQUEST_TIMEOUT_MS"), 10_000),

            max_in_flight_notifications: parse_or::<usize>(
                "MAX_IN_FLIGHT_NOTIFICATIONS",
                lookup("MAX_IN_FLIGHT_NOTIFICATIONS"),
                8,
            )
            .max(1),
        })
    }

    /// Pushover credentials carried on every outbound notification.
    pub fn credentials(&self) -> PushoverCredentials {
        PushoverCredentials::new(
            self.pushover_api_token.clone(),
            self.pushover_user_key.clone(),
        )
    }
}

// Secrets stay out of logs even when the whole config is printed.
impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("port", &self.port)
            .field("pushover_api_url", &self.pushover_api_url.as_str())
            .field("pushover_api_token", &"<redacted>")
            .field("pushover_user_key", &"<redacted>")
            .field("tailscale_webhook_secret", &"<redacted>")
            .field("request_timeout_ms", &self.request_timeout_ms)
            .field("max_in_flight_notifications", &self.max_in_flight_notifications)
            .finish()
    }
}

/// Parse an optional numeric value, falling back to the default when unset or invalid.
fn parse_or<T: std::str::FromStr>(name: &str, raw: Option<String>, default: T) -> T {
    let Some(raw) = raw else {
        return default;
    };

    match raw.trim().parse() {
        Ok(v) => v,
        Err(_) => {
            warn!(env_var = name, value = %raw, "Invalid numeric value, using default");
            default
        }
    }
}

fn parse_http_url(name: &'static str, raw: &str) -> Result<Url, ConfigError> {
    match Url::parse(raw.trim()) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => Ok(url),
        _ => Err(ConfigError::InvalidUrl {
            name,
            value: raw.to_string(),
        }),
    }
}
