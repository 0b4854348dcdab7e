//! Client error types

use serde_json::Value;
use thiserror::Error;

/// Client error types
#[derive(Debug, Error)]
pub enum ClientError {
    /// Network or request error
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Server returned an error status
    #[error("Server error {status}: {message}")]
    ServerError { status: u16, message: String },

    /// Authentication failed
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    /// Resource not found
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Bad request
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Forbidden
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    Configuration(String),

    /// Input rejected before any request was sent
    #[error("Invalid input: {0}")]
    Validation(String),

    /// The server accepted the credentials but returned no usable token
    #[error("Login succeeded but no access token was returned")]
    MissingToken,
}

impl ClientError {
    /// Create error from HTTP status code
    pub fn from_status(status: reqwest::StatusCode, message: String) -> Self {
        match status.as_u16() {
            400 => Self::BadRequest(message),
            401 => Self::AuthenticationFailed(message),
            403 => Self::Forbidden(message),
            404 => Self::NotFound(message),
            _ => Self::ServerError {
                status: status.as_u16(),
                message,
            },
        }
    }

    /// Whether the server rejected the session credentials
    pub fn is_auth_expired(&self) -> bool {
        matches!(self, Self::AuthenticationFailed(_))
    }
}

/// Pull a human readable message out of an error response body.
///
/// JSON bodies are searched for `message`, `error` and `detail`, then a
/// validation list under `errors`, then the first string value. Other bodies
/// are used verbatim once trimmed.
pub fn extract_error_message(content_type: Option<&str>, body: &str) -> Option<String> {
    let is_json = content_type.is_some_and(|ct| ct.contains("application/json"));
    if !is_json {
        let text = body.trim();
        return (!text.is_empty()).then(|| text.to_string());
    }

    let data: Value = serde_json::from_str(body).ok()?;
    let object = data.as_object()?;

    for field in ["message", "error", "detail"] {
        if let Some(message) = object.get(field).and_then(non_empty_str) {
            return Some(message.to_string());
        }
    }

    if let Some(first) = object
        .get("errors")
        .and_then(Value::as_array)
        .and_then(|errors| errors.first())
    {
        if let Some(message) = first.get("defaultMessage").and_then(non_empty_str) {
            return Some(message.to_string());
        }
        if let Some(message) = non_empty_str(first) {
            return Some(message.to_string());
        }
    }

    object
        .values()
        .find_map(non_empty_str)
        .map(str::to_string)
}

fn non_empty_str(value: &Value) -> Option<&str> {
    value.as_str().filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    const JSON: Option<&str> = Some("application/json;charset=UTF-8");

    #[test]
    fn test_from_status() {
        assert!(matches!(
            ClientError::from_status(StatusCode::UNAUTHORIZED, "nope".into()),
            ClientError::AuthenticationFailed(_)
        ));
        assert!(matches!(
            ClientError::from_status(StatusCode::FORBIDDEN, "nope".into()),
            ClientError::Forbidden(_)
        ));
        assert!(matches!(
            ClientError::from_status(StatusCode::BAD_GATEWAY, "down".into()),
            ClientError::ServerError { status: 502, .. }
        ));
        assert!(ClientError::from_status(StatusCode::UNAUTHORIZED, String::new()).is_auth_expired());
    }

    #[test]
    fn test_message_field_priority() {
        let body = r#"{"detail":"d","error":"e","message":"m"}"#;
        assert_eq!(extract_error_message(JSON, body).as_deref(), Some("m"));

        let body = r#"{"detail":"d","error":"e"}"#;
        assert_eq!(extract_error_message(JSON, body).as_deref(), Some("e"));
    }

    #[test]
    fn test_validation_errors_list() {
        let body = r#"{"errors":[{"field":"email","defaultMessage":"must be a well-formed email address"}]}"#;
        assert_eq!(
            extract_error_message(JSON, body).as_deref(),
            Some("must be a well-formed email address")
        );

        let body = r#"{"errors":["password too short"]}"#;
        assert_eq!(
            extract_error_message(JSON, body).as_deref(),
            Some("password too short")
        );
    }

    #[test]
    fn test_validation_map_uses_first_string() {
        let body = r#"{"status":400,"name":"must not be blank"}"#;
        assert_eq!(
            extract_error_message(JSON, body).as_deref(),
            Some("must not be blank")
        );
    }

    #[test]
    fn test_plain_text_and_empty_bodies() {
        assert_eq!(
            extract_error_message(Some("text/plain"), "  Email already used \n").as_deref(),
            Some("Email already used")
        );
        assert_eq!(extract_error_message(None, "   "), None);
        assert_eq!(extract_error_message(JSON, "not json"), None);
        assert_eq!(extract_error_message(JSON, r#"{"status":500}"#), None);
    }
}
