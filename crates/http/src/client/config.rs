//! Backend endpoint paths and client constants

use std::time::Duration;

/// REST endpoints of the Movie Checker backend
pub struct Endpoints;

impl Endpoints {
    pub const LOGIN: &'static str = "/auth/login";
    pub const LOGOUT: &'static str = "/auth/logout";
    pub const REFRESH: &'static str = "/auth/refresh";
    pub const ME: &'static str = "/auth/me";

    pub const USERS: &'static str = "/users";
    pub const CHANGE_NAME: &'static str = "/users/change-name";
    pub const RESET_PASSWORD_REQUEST: &'static str = "/users/reset-password/request";
    pub const RESET_PASSWORD_VERIFY: &'static str = "/users/reset-password/verify";
    pub const RESET_PASSWORD_CONFIRM: &'static str = "/users/password-reset/confirm";

    pub const MOVIES: &'static str = "/movies";
    pub const SEARCH_MOVIES: &'static str = "/movies/search";
    pub const SUGGEST_MOVIES: &'static str = "/movies/search/suggest";

    pub const USER_MOVIES: &'static str = "/user-movies";
    pub const MOVIE_STATUS: &'static str = "/user-movies/status";
    pub const MOVIE_FAVORITE: &'static str = "/user-movies/favorite";
    pub const MOVIE_RATE: &'static str = "/user-movies/user-rate";

    /// Password change still addresses the user by id
    pub fn change_password(user_id: i64) -> String {
        format!("/users/change-password/{user_id}")
    }
}

/// Client defaults
pub struct ClientDefaults;

impl ClientDefaults {
    pub const USER_AGENT: &'static str = "movie-checker-client/0.1.0";

    /// Shortest query worth asking for suggestions
    pub const MIN_SUGGESTION_QUERY_LEN: usize = 2;

    /// Pause before asking for suggestions while the user is still typing
    pub const SUGGESTION_DEBOUNCE: Duration = Duration::from_millis(300);

    /// Ratings are on a ten point scale
    pub const MAX_RATE: f64 = 10.0;

    /// Length of the emailed password reset code
    pub const RESET_CODE_LEN: usize = 6;
}
