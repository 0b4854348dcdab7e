//! Authentication and session lifecycle

use super::config::Endpoints;
use super::refresh::extract_access_token;
use super::token::{self, STARTUP_EXPIRY_BUFFER};
use super::{AuthOptions, ClientError, MovieClient, decode_json, error_from_response};
use crate::types::{LoginRequest, RegisterRequest};
use movie_checker_core::UserProfile;
use reqwest::{Method, StatusCode};
use serde_json::Value;
use tracing::{debug, info, warn};

impl MovieClient {
    /// Sign in with email and password.
    ///
    /// The returned profile is `None` when the token was accepted but the
    /// profile could not be loaded, in which case the session has already
    /// been torn down again.
    pub async fn login(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Option<UserProfile>, ClientError> {
        let request = self
            .request(Method::POST, Endpoints::LOGIN)
            .json(&LoginRequest { email, password });

        let response = self.send(request, AuthOptions::public()).await?;
        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }

        let body: Value = decode_json(response).await?;
        let token = extract_access_token(&body).ok_or(ClientError::MissingToken)?;
        self.session.adopt_token(&token);
        info!("Logged in");

        self.fetch_current_user().await
    }

    /// Create an account. The backend emails a verification link before the
    /// account can sign in.
    pub async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<(), ClientError> {
        let request = self
            .request(Method::POST, Endpoints::USERS)
            .json(&RegisterRequest {
                name,
                email,
                password,
            });

        let response = self.send(request, AuthOptions::public()).await?;
        match response.status() {
            StatusCode::OK | StatusCode::CREATED => {
                info!("Registered account, awaiting email verification");
                Ok(())
            }
            _ => Err(error_from_response(response).await),
        }
    }

    /// Load the signed-in user's profile into the session.
    ///
    /// Any non-success answer ends the session and yields `None`. Transport
    /// errors leave the stored token alone but still report the session as
    /// unavailable before propagating.
    pub async fn fetch_current_user(&self) -> Result<Option<UserProfile>, ClientError> {
        let request = self.request(Method::GET, Endpoints::ME);
        let response = match self.send(request, AuthOptions::authenticated()).await {
            Ok(response) => response,
            Err(err) => {
                self.listener.on_auth_state_changed(false);
                self.listener.guard_protected_page();
                return Err(err);
            }
        };

        if !response.status().is_success() {
            warn!(status = response.status().as_u16(), "Could not load current user");
            // A terminal 401 has already ended the session inside send()
            if self.session.is_authenticated() {
                self.end_session(true);
            }
            return Ok(None);
        }

        let user: UserProfile = decode_json(response).await?;
        debug!(user_id = user.id, "Loaded current user");
        self.session.set_user(user.clone());
        self.listener.on_auth_state_changed(true);
        Ok(Some(user))
    }

    /// Resume the persisted session at startup.
    ///
    /// A token that has already expired gets one refresh attempt; if that
    /// fails the token is discarded and the client stays logged out.
    pub async fn restore_session(&self) -> Result<Option<UserProfile>, ClientError> {
        let Some(persisted) = self.session.load_persisted() else {
            debug!("No persisted session");
            self.listener.on_auth_state_changed(false);
            self.listener.guard_protected_page();
            return Ok(None);
        };

        if token::is_expired_or_expiring_soon(&persisted, STARTUP_EXPIRY_BUFFER) {
            info!("Persisted access token has expired, refreshing");
            if self.refresher.refresh().await.is_none() {
                info!("Persisted session could not be renewed");
                self.end_session(true);
                return Ok(None);
            }
        }

        self.fetch_current_user().await
    }

    /// Sign out. The local session is cleared whatever the backend says.
    pub async fn logout(&self) {
        let request = self.request(Method::POST, Endpoints::LOGOUT);
        match self.send(request, AuthOptions::public()).await {
            Ok(response) if !response.status().is_success() => {
                warn!(status = response.status().as_u16(), "Backend logout failed");
            }
            Ok(_) => {}
            Err(err) => warn!("Backend logout failed: {err}"),
        }

        self.end_session(false);
        info!("Logged out");
    }

    /// Permanently delete the signed-in account and end the session
    pub async fn delete_account(&self) -> Result<(), ClientError> {
        let request = self.request(Method::DELETE, Endpoints::USERS);
        self.execute_empty(request, AuthOptions::authenticated())
            .await?;

        self.end_session(false);
        info!("Account deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::client::test_support::{
        RecordingListener, client_with_listener, client_with_storage, token_expiring_in,
    };
    use crate::client::ClientError;
    use movie_checker_core::{MemoryTokenStorage, TokenStorage};
    use serde_json::json;
    use std::sync::Arc;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn profile_body() -> serde_json::Value {
        json!({ "id": 7, "name": "Ann", "email": "ann@example.com", "joinDate": "2024-03-01" })
    }

    #[tokio::test]
    async fn test_login_stores_token_and_loads_profile() {
        let server = MockServer::start().await;
        let token = token_expiring_in(900);
        Mock::given(method("POST"))
            .and(path("/auth/login"))
            .and(body_json(json!({ "email": "ann@example.com", "password": "pw" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "token": token })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/auth/me"))
            .and(header("authorization", format!("Bearer {token}").as_str()))
            .respond_with(ResponseTemplate::new(200).set_body_json(profile_body()))
            .expect(1)
            .mount(&server)
            .await;

        let listener = RecordingListener::new();
        let (client, storage) = client_with_listener(&server, listener.clone());

        let user = client.login("ann@example.com", "pw").await.unwrap().unwrap();

        assert_eq!(user.display_name(), "Ann");
        assert_eq!(client.session().user(), Some(user));
        assert_eq!(storage.load().unwrap(), Some(token));
        assert_eq!(listener.auth_states(), vec![true]);
    }

    #[tokio::test]
    async fn test_login_rejection_carries_server_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/login"))
            .respond_with(
                ResponseTemplate::new(401).set_body_json(json!({ "message": "Bad credentials" })),
            )
            .mount(&server)
            .await;

        let (client, _) = client_with_listener(&server, RecordingListener::new());
        let err = client.login("ann@example.com", "nope").await.unwrap_err();

        match err {
            ClientError::AuthenticationFailed(message) => assert_eq!(message, "Bad credentials"),
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(!client.session().is_authenticated());
    }

    #[tokio::test]
    async fn test_login_without_token_in_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/login"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ok": true })))
            .mount(&server)
            .await;

        let (client, _) = client_with_listener(&server, RecordingListener::new());
        let err = client.login("ann@example.com", "pw").await.unwrap_err();
        assert!(matches!(err, ClientError::MissingToken));
    }

    #[tokio::test]
    async fn test_register_accepts_created() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/users"))
            .and(body_json(json!({ "name": "Ann", "email": "ann@example.com", "password": "pw" })))
            .respond_with(ResponseTemplate::new(201))
            .expect(1)
            .mount(&server)
            .await;

        let (client, _) = client_with_listener(&server, RecordingListener::new());
        client.register("Ann", "ann@example.com", "pw").await.unwrap();
    }

    #[tokio::test]
    async fn test_restore_without_persisted_token() {
        let server = MockServer::start().await;
        let listener = RecordingListener::new();
        let (client, _) = client_with_listener(&server, listener.clone());

        assert_eq!(client.restore_session().await.unwrap(), None);
        assert_eq!(listener.auth_states(), vec![false]);
        assert_eq!(listener.guard_calls(), 1);
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_restore_expired_token_with_failed_refresh_discards_it() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/refresh"))
            .respond_with(ResponseTemplate::new(401))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/auth/me"))
            .respond_with(ResponseTemplate::new(200).set_body_json(profile_body()))
            .expect(0)
            .mount(&server)
            .await;

        let storage = Arc::new(MemoryTokenStorage::with_token(token_expiring_in(-60)));
        let listener = RecordingListener::new();
        let (client, storage) = client_with_storage(&server, storage, listener.clone());

        assert_eq!(client.restore_session().await.unwrap(), None);
        assert_eq!(storage.load().unwrap(), None);
        assert!(!client.session().is_authenticated());
        assert_eq!(listener.auth_states(), vec![false]);
        assert_eq!(listener.guard_calls(), 1);
    }

    #[tokio::test]
    async fn test_restore_expired_token_refreshes_then_loads_profile() {
        let server = MockServer::start().await;
        let renewed = token_expiring_in(900);
        Mock::given(method("POST"))
            .and(path("/auth/refresh"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "accessToken": renewed })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/auth/me"))
            .and(header("authorization", format!("Bearer {renewed}").as_str()))
            .respond_with(ResponseTemplate::new(200).set_body_json(profile_body()))
            .expect(1)
            .mount(&server)
            .await;

        let storage = Arc::new(MemoryTokenStorage::with_token(token_expiring_in(-60)));
        let listener = RecordingListener::new();
        let (client, storage) = client_with_storage(&server, storage, listener.clone());

        let user = client.restore_session().await.unwrap().unwrap();
        assert_eq!(user.id, 7);
        assert_eq!(storage.load().unwrap(), Some(renewed));
        assert_eq!(listener.auth_states(), vec![true]);
    }

    #[tokio::test]
    async fn test_restore_with_undecodable_token_skips_refresh() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/refresh"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/auth/me"))
            .and(header("authorization", "Bearer opaque-token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(profile_body()))
            .expect(1)
            .mount(&server)
            .await;

        let storage = Arc::new(MemoryTokenStorage::with_token("opaque-token"));
        let (client, _) = client_with_storage(&server, storage, RecordingListener::new());

        assert!(client.restore_session().await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_profile_failure_ends_session() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/auth/me"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let storage = Arc::new(MemoryTokenStorage::with_token(token_expiring_in(900)));
        let listener = RecordingListener::new();
        let (client, storage) = client_with_storage(&server, storage, listener.clone());

        assert_eq!(client.restore_session().await.unwrap(), None);
        assert_eq!(storage.load().unwrap(), None);
        assert_eq!(listener.auth_states(), vec![false]);
        assert_eq!(listener.guard_calls(), 1);
    }

    #[tokio::test]
    async fn test_logout_clears_session_even_when_backend_fails() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/logout"))
            .respond_with(ResponseTemplate::new(500))
            .expect(1)
            .mount(&server)
            .await;

        let storage = Arc::new(MemoryTokenStorage::new());
        let listener = RecordingListener::new();
        let (client, storage) = client_with_storage(&server, storage, listener.clone());
        client.session.adopt_token(&token_expiring_in(900));

        client.logout().await;

        assert!(!client.session().is_authenticated());
        assert_eq!(storage.load().unwrap(), None);
        assert_eq!(listener.auth_states(), vec![false]);
        assert_eq!(listener.guard_calls(), 0);
    }

    #[tokio::test]
    async fn test_delete_account_failure_keeps_session() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/users"))
            .respond_with(ResponseTemplate::new(403).set_body_string("not allowed"))
            .mount(&server)
            .await;

        let (client, _) = client_with_listener(&server, RecordingListener::new());
        client.session.adopt_token(&token_expiring_in(900));

        let err = client.delete_account().await.unwrap_err();
        assert!(matches!(err, ClientError::Forbidden(message) if message == "not allowed"));
        assert!(client.session().is_authenticated());
    }
}
