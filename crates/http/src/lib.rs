//! Movie Checker HTTP client
//!
//! Talks to the Movie Checker REST backend and owns the session: the access
//! token is refreshed before it expires, a rejected request is retried once
//! with a new token, and the session is torn down when the backend will not
//! issue one.

pub mod client;
pub mod types;

pub use client::{
    AuthOptions, ClientError, MovieClient, MovieClientBuilder, NoopListener, SessionListener,
    SessionStore, SuggestionFetcher,
};
