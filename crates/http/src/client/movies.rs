//! Catalog browsing and search

use super::config::{ClientDefaults, Endpoints};
use super::{AuthOptions, ClientError, MovieClient, decode_json, error_from_response};
use arc_swap::ArcSwapOption;
use movie_checker_core::MovieDetails;
use reqwest::{Method, StatusCode};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::debug;

impl MovieClient {
    /// Full catalog
    pub async fn list_movies(&self) -> Result<Vec<MovieDetails>, ClientError> {
        let request = self.request(Method::GET, Endpoints::MOVIES);
        self.execute(request, AuthOptions::public()).await
    }

    /// Search the catalog. A blank query lists everything; no match is an
    /// empty list rather than an error.
    pub async fn search_movies(&self, query: &str) -> Result<Vec<MovieDetails>, ClientError> {
        let query = query.trim();
        if query.is_empty() {
            return self.list_movies().await;
        }

        let request = self
            .request(Method::GET, Endpoints::SEARCH_MOVIES)
            .query(&[("q", query)]);
        let response = self.send(request, AuthOptions::public()).await?;

        match response.status() {
            StatusCode::NOT_FOUND => {
                debug!(query, "No movies matched search");
                Ok(Vec::new())
            }
            status if status.is_success() => decode_json(response).await,
            _ => Err(error_from_response(response).await),
        }
    }

    /// Title completions for a partial query
    pub async fn suggest_movies(&self, query: &str) -> Result<Vec<String>, ClientError> {
        let query = query.trim();
        if query.chars().count() < ClientDefaults::MIN_SUGGESTION_QUERY_LEN {
            return Ok(Vec::new());
        }

        let request = self
            .request(Method::GET, Endpoints::SUGGEST_MOVIES)
            .query(&[("q", query)]);
        self.execute(request, AuthOptions::public()).await
    }
}

/// Fetches suggestions as the user types.
///
/// Each call waits out the debounce delay first; a newer call cancels an
/// older one whether it is still waiting or already talking to the backend.
pub struct SuggestionFetcher {
    client: MovieClient,
    debounce: Duration,
    in_flight: ArcSwapOption<CancellationToken>,
}

impl SuggestionFetcher {
    pub fn new(client: MovieClient) -> Self {
        Self {
            client,
            debounce: ClientDefaults::SUGGESTION_DEBOUNCE,
            in_flight: ArcSwapOption::empty(),
        }
    }

    /// Change the debounce delay (zero fetches immediately)
    #[must_use]
    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    /// Suggestions for `query`, or `Ok(None)` if a later call superseded this one
    pub async fn fetch(&self, query: &str) -> Result<Option<Vec<String>>, ClientError> {
        let token = CancellationToken::new();
        if let Some(previous) = self.in_flight.swap(Some(Arc::new(token.clone()))) {
            previous.cancel();
        }

        let request = async {
            if !self.debounce.is_zero() {
                tokio::time::sleep(self.debounce).await;
            }
            self.client.suggest_movies(query).await
        };

        tokio::select! {
            _ = token.cancelled() => {
                debug!(query, "Suggestion request superseded");
                Ok(None)
            }
            result = request => result.map(Some),
        }
    }

    /// Abandon the in-flight request, if any
    pub fn cancel(&self) {
        if let Some(previous) = self.in_flight.swap(None) {
            previous.cancel();
        }
    }
}
