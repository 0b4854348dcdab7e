//! Movie Checker HTTP client

pub mod account;
pub mod auth;
pub mod collection;
pub mod config;
pub mod error;
pub mod fetch;
pub mod movies;
pub mod refresh;
pub mod session;
pub mod token;

#[cfg(test)]
pub(crate) mod test_support;

use config::{ClientDefaults, Endpoints};
use error::extract_error_message;
use movie_checker_core::{MemoryTokenStorage, TokenStorage};
use refresh::RefreshClient;
use reqwest::{Client, ClientBuilder, Response, header};
use std::sync::Arc;
use std::time::Duration;

pub use error::ClientError;
pub use fetch::AuthOptions;
pub use movies::SuggestionFetcher;
pub use session::{NoopListener, SessionListener, SessionStore};

/// Movie Checker API client.
///
/// Clones share the same session, cookie jar and refresh state.
#[derive(Clone)]
pub struct MovieClient {
    client: Client,
    base_url: String,
    session: Arc<SessionStore>,
    refresher: Arc<RefreshClient>,
    listener: Arc<dyn SessionListener>,
    expiry_buffer: Duration,
}

impl MovieClient {
    /// Create a new client with default configuration
    pub fn new(base_url: impl Into<String>) -> Result<Self, ClientError> {
        Self::builder().base_url(base_url).build()
    }

    /// Create a new client builder
    pub fn builder() -> MovieClientBuilder {
        MovieClientBuilder::default()
    }

    /// Get the base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Current session state
    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    /// Exchange the refresh cookie for a new access token
    pub async fn refresh_access_token(&self) -> Option<String> {
        self.refresher.refresh().await
    }

    /// Create a request builder for a backend path.
    ///
    /// Authentication is decided when the request is sent, see [`Self::send`].
    pub fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        self.client.request(method, url)
    }

    /// Send a request and decode a successful JSON response
    pub async fn execute<T: serde::de::DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
        options: AuthOptions,
    ) -> Result<T, ClientError> {
        let response = self.send(request, options).await?;
        if response.status().is_success() {
            decode_json(response).await
        } else {
            Err(error_from_response(response).await)
        }
    }

    /// Send a request whose successful response carries no interesting body
    pub async fn execute_empty(
        &self,
        request: reqwest::RequestBuilder,
        options: AuthOptions,
    ) -> Result<(), ClientError> {
        let response = self.send(request, options).await?;
        if response.status().is_success() {
            Ok(())
        } else {
            Err(error_from_response(response).await)
        }
    }

    /// Tear the session down and tell the listener
    fn end_session(&self, guard: bool) {
        self.session.end();
        self.listener.on_auth_state_changed(false);
        if guard {
            self.listener.guard_protected_page();
        }
    }
}

/// Send cookies with every request so the refresh credential reaches the
/// backend. Native clients get this from the cookie jar configured at build
/// time; browsers need it per request.
pub(crate) fn include_credentials(request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
    #[cfg(target_arch = "wasm32")]
    {
        request.fetch_credentials_include()
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        request
    }
}

/// Decode a JSON body, reporting malformed payloads as serialization errors
pub(crate) async fn decode_json<T: serde::de::DeserializeOwned>(
    response: Response,
) -> Result<T, ClientError> {
    let body = response.text().await?;
    Ok(serde_json::from_str(&body)?)
}

/// Turn a non-success response into a typed error with the server's message
pub(crate) async fn error_from_response(response: Response) -> ClientError {
    let status = response.status();
    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);
    let body = response.text().await.unwrap_or_default();

    let message = extract_error_message(content_type.as_deref(), &body)
        .unwrap_or_else(|| status.to_string());
    ClientError::from_status(status, message)
}

/// Builder for MovieClient
#[derive(Default)]
pub struct MovieClientBuilder {
    base_url: Option<String>,
    timeout: Option<Duration>,
    user_agent: Option<String>,
    expiry_buffer: Option<Duration>,
    storage: Option<Arc<dyn TokenStorage>>,
    listener: Option<Arc<dyn SessionListener>>,
}

impl MovieClientBuilder {
    /// Set the base URL
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Set the request timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set the user agent
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    /// How long before expiry a token is refreshed proactively
    pub fn expiry_buffer(mut self, buffer: Duration) -> Self {
        self.expiry_buffer = Some(buffer);
        self
    }

    /// Where the access token is persisted (in memory by default)
    pub fn storage(mut self, storage: Arc<dyn TokenStorage>) -> Self {
        self.storage = Some(storage);
        self
    }

    /// Who is told about session changes
    pub fn listener(mut self, listener: Arc<dyn SessionListener>) -> Self {
        self.listener = Some(listener);
        self
    }

    /// Build the client
    pub fn build(self) -> Result<MovieClient, ClientError> {
        let base_url = self
            .base_url
            .ok_or_else(|| ClientError::Configuration("base_url is required".into()))?;

        // Ensure base_url ends without a trailing slash
        let base_url = base_url.trim_end_matches('/').to_string();

        let mut client_builder = ClientBuilder::new();

        #[cfg(not(target_arch = "wasm32"))]
        {
            client_builder = client_builder.cookie_store(true);
            if let Some(timeout) = self.timeout {
                client_builder = client_builder.timeout(timeout);
            }
        }

        #[cfg(target_arch = "wasm32")]
        let _ = self.timeout; // Timeouts not supported on WASM

        client_builder = client_builder.user_agent(
            self.user_agent
                .unwrap_or_else(|| ClientDefaults::USER_AGENT.to_string()),
        );

        let client = client_builder.build()?;

        let storage = self
            .storage
            .unwrap_or_else(|| Arc::new(MemoryTokenStorage::new()));
        let session = Arc::new(SessionStore::new(storage));
        let refresher = Arc::new(RefreshClient::new(
            client.clone(),
            format!("{base_url}{}", Endpoints::REFRESH),
            session.clone(),
        ));

        Ok(MovieClient {
            client,
            base_url,
            session,
            refresher,
            listener: self.listener.unwrap_or_else(|| Arc::new(NoopListener)),
            expiry_buffer: self.expiry_buffer.unwrap_or(token::DEFAULT_EXPIRY_BUFFER),
        })
    }
}
