//! Tailscale webhook signature verification.
//!
//! Tailscale signs each webhook with HMAC-SHA256 and sends the result in the
//! `Tailscale-Webhook-Signature` header as `t=<unix seconds>,v1=<hex digest>`.
//! The signed message is `"<t>.<body>"`.
//! Reference: https://tailscale.com/kb/1213/webhooks#verifying-an-event-signature

use std::time::{SystemTime, UNIX_EPOCH};

use hmac::{Hmac, Mac};
use sha2::Sha256;
use tracing::warn;

type HmacSha256 = Hmac<Sha256>;

/// Header carrying the webhook signature.
pub const SIGNATURE_HEADER: &str = "tailscale-webhook-signature";

/// Maximum age in seconds of a signed timestamp before it is treated as a replay.
pub const SIGNATURE_MAX_AGE_SECS: i64 = 300;

/// Fields parsed out of the signature header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureHeader {
    /// The `t` field: seconds since the Unix epoch, as sent.
    pub timestamp: String,
    /// The `v1` field: hex-encoded HMAC-SHA256 digest.
    pub signature: String,
}

impl SignatureHeader {
    /// Parse a `t=...,v1=...` header.
    ///
    /// Fields may come in any order and unknown keys are skipped. When a key
    /// repeats, the last value wins. Returns `None` unless both `t` and `v1`
    /// are present and non-empty.
    pub fn parse(header: &str) -> Option<Self> {
        let mut timestamp = "";
        let mut signature = "";

        for part in header.split(',') {
            match part.trim().split_once('=') {
                Some(("t", value)) => timestamp = value.trim(),
                Some(("v1", value)) => signature = value.trim(),
                _ => {}
            }
        }

        if timestamp.is_empty() || signature.is_empty() {
            return None;
        }

        Some(Self {
            timestamp: timestamp.to_string(),
            signature: signature.to_string(),
        })
    }
}

/// Verify a Tailscale webhook signature against the current clock.
///
/// Returns `true` only if the header is well formed, its timestamp lies within
/// [`SIGNATURE_MAX_AGE_SECS`] of now, and the HMAC matches. Any malformed
/// input yields `false`.
pub fn verify_tailscale_signature(secret: &str, signature_header: &str, body: &str) -> bool {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or_default();

    verify_tailscale_signature_at(secret, signature_header, body, now)
}

/// Verify a Tailscale webhook signature as of `now` (Unix seconds).
pub fn verify_tailscale_signature_at(
    secret: &str,
    signature_header: &str,
    body: &str,
    now: i64,
) -> bool {
    if secret.is_empty() {
        warn!("tailscale_signature_secret_missing");
        return false;
    }

    let Some(header) = SignatureHeader::parse(signature_header) else {
        warn!(
            header_length = signature_header.len(),
            "tailscale_signature_missing_fields"
        );
        return false;
    };

    // An unparsable timestamp is treated as already expired.
    let event_time: i64 = match header.timestamp.parse() {
        Ok(t) => t,
        Err(_) => {
            warn!(timestamp = %header.timestamp, "tailscale_signature_invalid_timestamp");
            return false;
        }
    };

    let age = now.saturating_sub(event_time);
    if age > SIGNATURE_MAX_AGE_SECS || age < -SIGNATURE_MAX_AGE_SECS {
        warn!(
            event_time = event_time,
            current_time = now,
            age_seconds = age,
            max_age_seconds = SIGNATURE_MAX_AGE_SECS,
            "tailscale_signature_stale"
        );
        return false;
    }

    let Some(expected) = decode_hex_signature(&header.signature) else {
        warn!(
            signature_length = header.signature.len(),
            "tailscale_signature_invalid_hex"
        );
        return false;
    };

    if has_malformed_escape(body) {
        warn!(body_length = body.len(), "tailscale_signature_body_not_decodable");
        return false;
    }

    let decoded_body = match urlencoding::decode(body) {
        Ok(b) => b,
        Err(_) => {
            warn!(body_length = body.len(), "tailscale_signature_body_not_decodable");
            return false;
        }
    };

    let mut mac = match HmacSha256::new_from_slice(secret.as_bytes()) {
        Ok(m) => m,
        Err(_) => {
            warn!("tailscale_signature_invalid_key");
            return false;
        }
    };

    mac.update(header.timestamp.as_bytes());
    mac.update(b".");
    mac.update(decoded_body.as_bytes());

    // verify_slice compares in constant time
    let valid = mac.verify_slice(&expected).is_ok();

    if !valid {
        warn!(
            signature_bytes = expected.len(),
            "tailscale_signature_mismatch"
        );
    }

    valid
}

/// Decode a hex signature, allowing an optional `0x` prefix.
///
/// Rejects odd lengths and any non-hex character.
fn decode_hex_signature(signature: &str) -> Option<Vec<u8>> {
    let digits = signature.strip_prefix("0x").unwrap_or(signature);

    hex::decode(digits).ok()
}

/// True when some `%` is not followed by two hex digits.
fn has_malformed_escape(body: &str) -> bool {
    let bytes = body.as_bytes();
    bytes.iter().enumerate().any(|(i, &b)| {
        b == b'%'
            && !matches!(
                bytes.get(i + 1..i + 3),
                Some([hi, lo]) if hi.is_ascii_hexdigit() && lo.is_ascii_hexdigit()
            )
    })
}
