//! Session state shared by everything that talks to the backend

use arc_swap::ArcSwapOption;
use movie_checker_core::{TokenStorage, UserProfile};
use std::sync::Arc;
use tracing::warn;

/// Receives session transitions, typically the UI layer
pub trait SessionListener: Send + Sync {
    /// Called when the session is established or torn down
    fn on_auth_state_changed(&self, _is_authenticated: bool) {}

    /// Called after a session ends involuntarily, to move the user away
    /// from screens that need one
    fn guard_protected_page(&self) {}
}

/// Listener that ignores every notification
pub struct NoopListener;

impl SessionListener for NoopListener {}

/// Current access token and user profile.
///
/// Reads are public; every mutation goes through the client so the persisted
/// token and the in-memory state never drift apart.
pub struct SessionStore {
    access_token: ArcSwapOption<String>,
    user: ArcSwapOption<UserProfile>,
    storage: Arc<dyn TokenStorage>,
}

impl SessionStore {
    /// Create an empty (logged out) session over the given storage
    pub fn new(storage: Arc<dyn TokenStorage>) -> Self {
        Self {
            access_token: ArcSwapOption::empty(),
            user: ArcSwapOption::empty(),
            storage,
        }
    }

    /// Current access token
    pub fn access_token(&self) -> Option<String> {
        self.access_token.load_full().map(|token| token.as_ref().clone())
    }

    /// Current user profile
    pub fn user(&self) -> Option<UserProfile> {
        self.user.load_full().map(|user| user.as_ref().clone())
    }

    /// Whether an access token is held
    pub fn is_authenticated(&self) -> bool {
        self.access_token.load().is_some()
    }

    /// Adopt a token: persist it, then make it current
    pub(crate) fn adopt_token(&self, token: &str) {
        if let Err(err) = self.storage.store(token) {
            warn!("Failed to persist access token: {err}");
        }
        self.access_token.store(Some(Arc::new(token.to_string())));
    }

    /// Load the persisted token into memory without touching storage
    pub(crate) fn load_persisted(&self) -> Option<String> {
        let token = match self.storage.load() {
            Ok(token) => token,
            Err(err) => {
                warn!("Failed to read persisted access token: {err}");
                None
            }
        };
        self.access_token.store(token.clone().map(Arc::new));
        token
    }

    pub(crate) fn set_user(&self, user: UserProfile) {
        self.user.store(Some(Arc::new(user)));
    }

    /// Apply an edit to the current profile, if there is one
    pub(crate) fn update_user(&self, edit: impl Fn(&mut UserProfile)) {
        self.user.rcu(|current| {
            current.as_ref().map(|user| {
                let mut user = user.as_ref().clone();
                edit(&mut user);
                Arc::new(user)
            })
        });
    }

    /// Forget the token and user, including the persisted copy
    pub(crate) fn end(&self) {
        if let Err(err) = self.storage.clear() {
            warn!("Failed to clear persisted access token: {err}");
        }
        self.access_token.store(None);
        self.user.store(None);
    }
}
