//! Web server module for handling inbound webhooks.
//!
//! This module provides a small web server that:
//! - Receives Tailscale webhooks
//! - Verifies their signatures
//! - Relays each event to Pushover before answering
//!
//! `GET /health` reports liveness.

pub mod handlers;
pub mod signature;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

pub use handlers::{health, tailscale_webhook, AppState, HealthResponse, WebhookResponse};
pub use signature::{
    verify_tailscale_signature, verify_tailscale_signature_at, SignatureHeader,
    SIGNATURE_HEADER, SIGNATURE_MAX_AGE_SECS,
};

/// Build the application router.
///
/// The webhook is served on `/` and on `/webhooks/tailscale`.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/", post(tailscale_webhook))
        .route("/webhooks/tailscale", post(tailscale_webhook))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
