//! Movie Checker core types and utilities

pub mod error;
pub mod storage;
pub mod types;

pub use error::{CoreError, CoreResult};
pub use storage::{ACCESS_TOKEN_KEY, FileTokenStorage, MemoryTokenStorage, TokenStorage};
pub use types::{CollectionFilter, MovieDetails, MovieStatus, UserMovie, UserProfile};
