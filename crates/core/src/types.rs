use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;

/// Profile of the signed-in user as returned by `/auth/me`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: i64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub join_date: Option<NaiveDate>,
}

impl UserProfile {
    /// Name used when greeting the user
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .filter(|name| !name.is_empty())
            .or(self.email.as_deref())
            .unwrap_or("User")
    }
}

/// A catalog entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MovieDetails {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub imdb_id: Option<String>,
    #[serde(default)]
    pub year: Option<i32>,
    #[serde(default)]
    pub poster_url: Option<String>,
    #[serde(default)]
    pub genre: Option<String>,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub runtime: Option<String>,
    #[serde(default)]
    pub imdb_rate: Option<f64>,
}

impl MovieDetails {
    /// Poster URL, ignoring the placeholders the catalog stores for missing posters
    pub fn poster(&self) -> Option<&str> {
        self.poster_url.as_deref().map(str::trim).filter(|url| {
            !url.is_empty() && !url.eq_ignore_ascii_case("n/a") && !url.eq_ignore_ascii_case("null")
        })
    }
}

/// Watch state of a movie in the user's collection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MovieStatus {
    Watched,
    WatchList,
}

impl MovieStatus {
    pub fn label(self) -> &'static str {
        match self {
            Self::Watched => "Watched",
            Self::WatchList => "Watchlist",
        }
    }
}

impl fmt::Display for MovieStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for MovieStatus {
    type Err = CoreError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().replace(['_', '-'], "").as_str() {
            "watched" => Ok(Self::Watched),
            "watchlist" => Ok(Self::WatchList),
            other => Err(CoreError::invalid_value(format!(
                "unknown movie status '{other}'"
            ))),
        }
    }
}

/// A movie in the user's collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserMovie {
    pub id: i64,
    #[serde(default)]
    pub user_rate: Option<f64>,
    #[serde(default)]
    pub status: Option<MovieStatus>,
    #[serde(default)]
    pub is_favorite: Option<bool>,
    #[serde(default)]
    pub added_at: Option<NaiveDate>,
    pub movie_details: MovieDetails,
}

impl UserMovie {
    pub fn is_favorite(&self) -> bool {
        self.is_favorite.unwrap_or(false)
    }
}

/// Client-side view over a collection listing
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CollectionFilter {
    #[default]
    All,
    Watched,
    Watchlist,
    Favorites,
}

impl CollectionFilter {
    pub fn matches(self, movie: &UserMovie) -> bool {
        match self {
            Self::All => true,
            Self::Watched => movie.status == Some(MovieStatus::Watched),
            Self::Watchlist => movie.status == Some(MovieStatus::WatchList),
            Self::Favorites => movie.is_favorite(),
        }
    }

    /// Keep only the movies this filter selects
    pub fn apply<'a>(self, movies: &'a [UserMovie]) -> Vec<&'a UserMovie> {
        movies.iter().filter(|movie| self.matches(movie)).collect()
    }
}

impl FromStr for CollectionFilter {
    type Err = CoreError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().replace(['_', '-'], "").as_str() {
            "all" => Ok(Self::All),
            "watched" => Ok(Self::Watched),
            "watchlist" | "wanttowatch" => Ok(Self::Watchlist),
            "favorites" | "favourites" => Ok(Self::Favorites),
            other => Err(CoreError::invalid_value(format!(
                "unknown collection filter '{other}'"
            ))),
        }
    }
}
