//! Webhook endpoint handlers.
//!
//! The Tailscale handler runs the whole pipeline inline:
//! 1. Check the content type
//! 2. Verify the signature
//! 3. Parse the events
//! 4. Send one Pushover notification per event
//!
//! Callers only get a coarse status; the details go to the logs.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::{header::CONTENT_TYPE, HeaderMap, StatusCode},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::event::parse_events;
use crate::notify::{dispatch_batch, BatchReport, Dispatcher};
use crate::web::signature::{verify_tailscale_signature, SIGNATURE_HEADER};
use crate::Config;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub dispatcher: Dispatcher,
}

impl AppState {
    pub fn new(config: Config, dispatcher: Dispatcher) -> Self {
        Self {
            config: Arc::new(config),
            dispatcher,
        }
    }
}

// =============================================================================
// Health Check
// =============================================================================

/// Health check response.
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// Health check endpoint.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

// =============================================================================
// Tailscale Webhook
// =============================================================================

/// Webhook response.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct WebhookResponse {
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub handled: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failed: Option<usize>,
}

impl WebhookResponse {
    fn rejected(status: &str) -> Self {
        Self {
            status: status.to_string(),
            message: None,
            handled: None,
            failed: None,
        }
    }

    fn from_report(report: &BatchReport) -> (StatusCode, Self) {
        let handled = report.succeeded();
        let failed = report.failed();

        let (code, status, message) = if report.all_succeeded() {
            (
                StatusCode::OK,
                "ok",
                format!("{} events handled successfully.", handled),
            )
        } else if handled > 0 {
            (
                StatusCode::MULTI_STATUS,
                "partial",
                format!("{} of {} events handled, {} failed.", handled, report.total(), failed),
            )
        } else {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "error",
                format!("0 of {} events handled, {} failed.", report.total(), failed),
            )
        };

        (
            code,
            Self {
                status: status.to_string(),
                message: Some(message),
                handled: Some(handled),
                failed: Some(failed),
            },
        )
    }
}

/// Whether the request declares a JSON body. Media type parameters are ignored.
fn is_json_content_type(headers: &HeaderMap) -> bool {
    headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .map(|media_type| media_type.trim().eq_ignore_ascii_case("application/json"))
        .unwrap_or(false)
}

/// Tailscale webhook endpoint.
///
/// Only routed for `POST`; axum answers other methods with 405.
pub async fn tailscale_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> (StatusCode, Json<WebhookResponse>) {
    info!(
        body_length = body.len(),
        has_signature = headers.contains_key(SIGNATURE_HEADER),
        "tailscale_webhook_received"
    );

    if !is_json_content_type(&headers) {
        warn!(
            content_type = ?headers.get(CONTENT_TYPE),
            "tailscale_webhook_bad_content_type"
        );
        return (
            StatusCode::BAD_REQUEST,
            Json(WebhookResponse::rejected("bad_request")),
        );
    }

    let Some(signature_header) = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
    else {
        warn!("tailscale_webhook_signature_missing");
        return (
            StatusCode::UNAUTHORIZED,
            Json(WebhookResponse::rejected("unauthorized")),
        );
    };

    let Ok(body) = std::str::from_utf8(&body) else {
        warn!("tailscale_webhook_body_not_utf8");
        return (
            StatusCode::BAD_REQUEST,
            Json(WebhookResponse::rejected("bad_request")),
        );
    };

    if !verify_tailscale_signature(&state.config.tailscale_webhook_secret, signature_header, body) {
        warn!("tailscale_webhook_signature_invalid");
        return (
            StatusCode::UNAUTHORIZED,
            Json(WebhookResponse::rejected("unauthorized")),
        );
    }

    let events = match parse_events(body) {
        Ok(events) => events,
        Err(e) => {
            error!(error = %e, "tailscale_webhook_parse_failed");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(WebhookResponse::rejected("error")),
            );
        }
    };

    let report = dispatch_batch(
        &state.dispatcher,
        &events,
        state.config.max_in_flight_notifications,
    )
    .await;

    let (code, response) = WebhookResponse::from_report(&report);

    if report.all_succeeded() {
        info!(event_count = report.total(), "tailscale_webhook_handled");
    } else {
        error!(
            event_count = report.total(),
            failed = report.failed(),
            "tailscale_webhook_partially_failed"
        );
    }

    (code, Json(response))
}
