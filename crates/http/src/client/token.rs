//! Access token expiry inspection
//!
//! Tokens are JWT-shaped: the middle dot-delimited segment is base64url JSON
//! carrying an `exp` claim in seconds since the epoch. Signatures are never
//! checked here, the server remains the authority on validity.

use base64::Engine;
use base64::engine::general_purpose::{STANDARD_NO_PAD, URL_SAFE_NO_PAD};
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::time::Duration;

/// Refresh this long before the embedded expiry to cover in-flight latency
pub const DEFAULT_EXPIRY_BUFFER: Duration = Duration::from_secs(30);

/// Buffer used when validating a persisted token at startup
pub const STARTUP_EXPIRY_BUFFER: Duration = Duration::ZERO;

/// Where a token stands relative to its embedded expiry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpiryStatus {
    /// Valid for longer than the buffer
    Fresh,
    /// Still valid, but inside the buffer window
    ExpiringSoon,
    /// Past its expiry
    Expired,
    /// No decodable `exp` claim. Treated as valid: an unreadable token must
    /// not stop a request the server might still accept.
    Unknown,
}

impl ExpiryStatus {
    /// Whether a refresh should be attempted before using the token
    pub fn needs_refresh(self) -> bool {
        matches!(self, Self::ExpiringSoon | Self::Expired)
    }
}

/// Expiry of a token in milliseconds since the epoch
fn expiry_millis(token: &str) -> Option<i64> {
    let payload = token.split('.').nth(1)?.trim_end_matches('=');
    let bytes = URL_SAFE_NO_PAD
        .decode(payload)
        .or_else(|_| STANDARD_NO_PAD.decode(payload))
        .ok()?;
    let claims: Value = serde_json::from_slice(&bytes).ok()?;
    let exp = claim_seconds(claims.get("exp")?)?;

    #[allow(clippy::cast_possible_truncation)]
    Some((exp * 1000.0) as i64)
}

/// Numeric value of a seconds claim. Numeric strings count; zero does not,
/// since issuers use it as "no expiry".
fn claim_seconds(value: &Value) -> Option<f64> {
    let seconds = match value {
        Value::Number(number) => number.as_f64()?,
        Value::String(text) => text.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    (seconds.is_finite() && seconds != 0.0).then_some(seconds)
}

/// Decode the embedded expiry, if any
pub fn token_expiry(token: &str) -> Option<DateTime<Utc>> {
    expiry_millis(token).and_then(DateTime::from_timestamp_millis)
}

/// Classify a token against an explicit point in time
pub fn expiry_status_at(token: &str, buffer: Duration, now: DateTime<Utc>) -> ExpiryStatus {
    let Some(exp) = expiry_millis(token) else {
        return ExpiryStatus::Unknown;
    };

    let now = now.timestamp_millis();
    let buffer = i64::try_from(buffer.as_millis()).unwrap_or(i64::MAX);

    if now >= exp {
        ExpiryStatus::Expired
    } else if now >= exp.saturating_sub(buffer) {
        ExpiryStatus::ExpiringSoon
    } else {
        ExpiryStatus::Fresh
    }
}

/// Classify a token against the current time
pub fn expiry_status(token: &str, buffer: Duration) -> ExpiryStatus {
    expiry_status_at(token, buffer, Utc::now())
}

/// True when the token has expired or will within `buffer`.
///
/// Returns false when the expiry cannot be determined.
pub fn is_expired_or_expiring_soon(token: &str, buffer: Duration) -> bool {
    expiry_status(token, buffer).needs_refresh()
}
