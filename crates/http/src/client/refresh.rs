//! Access token refresh
//!
//! The refresh credential is an httpOnly cookie held by the client's cookie
//! jar; it is never read or attached explicitly. Every failure mode ends in
//! `None` so callers only ever see whether a new token arrived.

use super::session::SessionStore;
use reqwest::Client;
use serde_json::Value;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::Mutex;
use tracing::{debug, warn};

type TokenExtractor = fn(&Value) -> Option<&str>;

fn top_level_access_token(body: &Value) -> Option<&str> {
    body.get("accessToken")?.as_str()
}

fn top_level_token(body: &Value) -> Option<&str> {
    body.get("token")?.as_str()
}

fn nested_access_token(body: &Value) -> Option<&str> {
    body.get("token")?.get("accessToken")?.as_str()
}

/// Response shapes the backend has used for issued tokens, in priority order.
///
/// Older and newer backend builds disagree on the envelope; all three are
/// accepted until the API settles on one.
const TOKEN_EXTRACTORS: [(&str, TokenExtractor); 3] = [
    ("accessToken", top_level_access_token),
    ("token", top_level_token),
    ("token.accessToken", nested_access_token),
];

/// Find the access token in a login or refresh response body
pub fn extract_access_token(body: &Value) -> Option<String> {
    TOKEN_EXTRACTORS.iter().find_map(|(shape, extract)| {
        let token = extract(body).filter(|token| !token.is_empty())?;
        debug!(shape, "Found access token in response");
        Some(token.to_string())
    })
}

/// Exchanges the refresh cookie for a new access token.
///
/// Overlapping calls are coalesced: a caller that starts waiting while a
/// refresh is in flight gets that refresh's outcome.
pub struct RefreshClient {
    client: Client,
    endpoint: String,
    session: Arc<SessionStore>,
    last_outcome: Mutex<Option<String>>,
    completed: AtomicU64,
}

impl RefreshClient {
    pub fn new(client: Client, endpoint: impl Into<String>, session: Arc<SessionStore>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
            session,
            last_outcome: Mutex::new(None),
            completed: AtomicU64::new(0),
        }
    }

    /// Obtain a new access token, or `None` if the session cannot be renewed.
    ///
    /// On success the token is persisted and made current before returning.
    pub async fn refresh(&self) -> Option<String> {
        let observed = self.completed.load(Ordering::Acquire);
        let mut last_outcome = self.last_outcome.lock().await;

        if self.completed.load(Ordering::Acquire) != observed {
            debug!("Reusing outcome of a refresh that finished while waiting");
            return last_outcome.clone();
        }

        let outcome = self.request_token().await;
        if let Some(token) = &outcome {
            self.session.adopt_token(token);
        }

        last_outcome.clone_from(&outcome);
        self.completed.fetch_add(1, Ordering::AcqRel);
        outcome
    }

    async fn request_token(&self) -> Option<String> {
        let request = super::include_credentials(self.client.post(&self.endpoint));

        let response = match request.send().await {
            Ok(response) => response,
            Err(err) => {
                warn!("Error refreshing access token: {err}");
                return None;
            }
        };

        let status = response.status();
        if !status.is_success() {
            warn!(status = status.as_u16(), "Token refresh failed");
            return None;
        }

        let body: Value = match response.json().await {
            Ok(body) => body,
            Err(err) => {
                warn!("Token refresh response was not JSON: {err}");
                return None;
            }
        };

        let token = extract_access_token(&body);
        if token.is_none() {
            warn!("Token refresh response did not contain a recognised token field");
        }
        token
    }
}
