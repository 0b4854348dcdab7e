//! Request bodies sent to the backend

use movie_checker_core::MovieStatus;
use serde::Serialize;

/// Credentials for `POST /auth/login`
#[derive(Debug, Serialize)]
pub struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

/// New account for `POST /users`
#[derive(Debug, Serialize)]
pub struct RegisterRequest<'a> {
    pub name: &'a str,
    pub email: &'a str,
    pub password: &'a str,
}

/// Move a movie between watched and watchlist, or out of both with `None`
#[derive(Debug, Serialize)]
pub struct ChangeStatusRequest<'a> {
    pub title: &'a str,
    pub status: Option<MovieStatus>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeFavoriteRequest<'a> {
    pub title: &'a str,
    pub is_favorite: bool,
}

#[derive(Debug, Serialize)]
pub struct ChangeRateRequest<'a> {
    pub title: &'a str,
    pub rate: f64,
}

#[derive(Debug, Serialize)]
pub struct ChangeNameRequest<'a> {
    pub name: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest<'a> {
    pub old_password: &'a str,
    pub new_password: &'a str,
}

/// Body of the password reset request, addressed by account email
#[derive(Debug, Serialize)]
pub struct UserEmailRequest<'a> {
    pub email: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordRequest<'a> {
    pub new_password: &'a str,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_wire_field_names() {
        let favorite = ChangeFavoriteRequest {
            title: "Heat",
            is_favorite: true,
        };
        assert_eq!(
            serde_json::to_value(&favorite).unwrap(),
            json!({ "title": "Heat", "isFavorite": true })
        );

        let password = ChangePasswordRequest {
            old_password: "old",
            new_password: "new",
        };
        assert_eq!(
            serde_json::to_value(&password).unwrap(),
            json!({ "oldPassword": "old", "newPassword": "new" })
        );
    }

    #[test]
    fn test_status_serializes_as_backend_enum_or_null() {
        let watchlist = ChangeStatusRequest {
            title: "Heat",
            status: Some(MovieStatus::WatchList),
        };
        assert_eq!(
            serde_json::to_value(&watchlist).unwrap(),
            json!({ "title": "Heat", "status": "WATCH_LIST" })
        );

        let cleared = ChangeStatusRequest {
            title: "Heat",
            status: None,
        };
        assert_eq!(
            serde_json::to_value(&cleared).unwrap(),
            json!({ "title": "Heat", "status": null })
        );
    }
}
