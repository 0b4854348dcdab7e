//! Authenticated request dispatch
//!
//! Every backend call goes through [`MovieClient::send`]. For authenticated
//! calls it refreshes an expiring token before sending, retries once with a
//! new token when the server answers 401, and ends the session when no new
//! token can be obtained. Auth failures never surface as errors: callers get
//! the response and check its status. Only transport failures are `Err`.

use super::{ClientError, MovieClient, token};
use reqwest::header::{AUTHORIZATION, HeaderValue};
use reqwest::{Response, StatusCode};
use tracing::{debug, info, warn};

/// Per-request authentication behavior
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthOptions {
    /// Attach the session's bearer token, refreshing it when needed
    pub requires_auth: bool,
    /// On 401, refresh once and replay the request
    pub retry_on_auth_error: bool,
}

impl Default for AuthOptions {
    fn default() -> Self {
        Self::public()
    }
}

impl AuthOptions {
    /// No token handling; cookies are still sent
    pub const fn public() -> Self {
        Self {
            requires_auth: false,
            retry_on_auth_error: true,
        }
    }

    /// Bearer token with proactive and reactive refresh
    pub const fn authenticated() -> Self {
        Self {
            requires_auth: true,
            retry_on_auth_error: true,
        }
    }

    /// Keep the bearer token but return 401 responses as-is
    #[must_use]
    pub const fn without_retry(mut self) -> Self {
        self.retry_on_auth_error = false;
        self
    }
}

fn bearer(token: &str) -> Result<HeaderValue, ClientError> {
    let mut value = HeaderValue::from_str(&format!("Bearer {token}")).map_err(|_| {
        ClientError::Configuration("access token is not a valid header value".into())
    })?;
    value.set_sensitive(true);
    Ok(value)
}

impl MovieClient {
    /// Send a request, handling the access token according to `options`
    pub async fn send(
        &self,
        request: reqwest::RequestBuilder,
        options: AuthOptions,
    ) -> Result<Response, ClientError> {
        let mut request = super::include_credentials(request).build()?;

        if !options.requires_auth {
            debug!(method = %request.method(), url = %request.url(), "Sending public request");
            return Ok(self.client.execute(request).await?);
        }

        let mut access_token = self.session.access_token();

        if let Some(current) = access_token.as_deref() {
            if token::is_expired_or_expiring_soon(current, self.expiry_buffer) {
                debug!("Access token expired or expiring soon, refreshing before request");
                match self.refresher.refresh().await {
                    Some(fresh) => access_token = Some(fresh),
                    // Keep the old token: the server may still accept it,
                    // while sending none is certain to fail
                    None => warn!("Proactive token refresh failed, sending current token"),
                }
            }
        }

        if let Some(current) = access_token.as_deref() {
            if !request.headers().contains_key(AUTHORIZATION) {
                request.headers_mut().insert(AUTHORIZATION, bearer(current)?);
            }
        }

        let replay = if options.retry_on_auth_error {
            request.try_clone()
        } else {
            None
        };

        debug!(method = %request.method(), url = %request.url(), "Sending authenticated request");
        let response = self.client.execute(request).await?;

        if !options.retry_on_auth_error || response.status() != StatusCode::UNAUTHORIZED {
            return Ok(response);
        }

        debug!("Request rejected with 401, attempting token refresh");
        match self.refresher.refresh().await {
            Some(fresh) => {
                let Some(mut replay) = replay else {
                    warn!("Request body cannot be replayed, returning original 401");
                    return Ok(response);
                };
                replay.headers_mut().insert(AUTHORIZATION, bearer(&fresh)?);
                debug!("Retrying request with refreshed token");
                Ok(self.client.execute(replay).await?)
            }
            None => {
                info!("Session could not be renewed, signing out");
                self.end_session(true);
                Ok(response)
            }
        }
    }
}
