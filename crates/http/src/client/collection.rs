//! The signed-in user's movie collection

use super::config::{ClientDefaults, Endpoints};
use super::{AuthOptions, ClientError, MovieClient};
use crate::types::{ChangeFavoriteRequest, ChangeRateRequest, ChangeStatusRequest};
use movie_checker_core::{CollectionFilter, MovieStatus, UserMovie};
use reqwest::Method;
use tracing::debug;

/// Round a rating to one decimal and check it is on the ten point scale
pub fn normalize_rate(rate: f64) -> Result<f64, ClientError> {
    let rounded = (rate * 10.0).round() / 10.0;
    if !rounded.is_finite() || !(0.0..=ClientDefaults::MAX_RATE).contains(&rounded) {
        return Err(ClientError::Validation(format!(
            "rate must be between 0 and {}",
            ClientDefaults::MAX_RATE
        )));
    }
    Ok(rounded)
}

impl MovieClient {
    /// Every movie in the collection
    pub async fn user_movies(&self) -> Result<Vec<UserMovie>, ClientError> {
        let request = self.request(Method::GET, Endpoints::USER_MOVIES);
        self.execute(request, AuthOptions::authenticated()).await
    }

    /// Collection narrowed to one view
    pub async fn filtered_user_movies(
        &self,
        filter: CollectionFilter,
    ) -> Result<Vec<UserMovie>, ClientError> {
        let movies = self.user_movies().await?;
        Ok(movies.into_iter().filter(|movie| filter.matches(movie)).collect())
    }

    /// Put a movie on the watched list or the watchlist, or take it off
    /// both with `None`
    pub async fn update_movie_status(
        &self,
        title: &str,
        status: Option<MovieStatus>,
    ) -> Result<(), ClientError> {
        debug!(title, ?status, "Updating movie status");
        let request = self
            .request(Method::PATCH, Endpoints::MOVIE_STATUS)
            .json(&ChangeStatusRequest { title, status });
        self.execute_empty(request, AuthOptions::authenticated())
            .await
    }

    pub async fn update_movie_favorite(
        &self,
        title: &str,
        is_favorite: bool,
    ) -> Result<(), ClientError> {
        debug!(title, is_favorite, "Updating favorite");
        let request = self
            .request(Method::PATCH, Endpoints::MOVIE_FAVORITE)
            .json(&ChangeFavoriteRequest { title, is_favorite });
        self.execute_empty(request, AuthOptions::authenticated())
            .await
    }

    /// Rate a movie. Returns the rating as stored, rounded to one decimal.
    pub async fn update_movie_rate(&self, title: &str, rate: f64) -> Result<f64, ClientError> {
        let rate = normalize_rate(rate)?;
        debug!(title, rate, "Updating rating");
        let request = self
            .request(Method::PATCH, Endpoints::MOVIE_RATE)
            .json(&ChangeRateRequest { title, rate });
        self.execute_empty(request, AuthOptions::authenticated())
            .await?;
        Ok(rate)
    }
}
