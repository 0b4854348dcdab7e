//! Helpers shared by the client's unit tests

use super::MovieClient;
use super::session::SessionListener;
use movie_checker_core::MemoryTokenStorage;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use wiremock::MockServer;

pub(crate) use super::token::tests::token_expiring_in;

/// Listener that remembers every notification it receives
#[derive(Default)]
pub(crate) struct RecordingListener {
    states: Mutex<Vec<bool>>,
    guards: AtomicUsize,
}

impl RecordingListener {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub(crate) fn auth_states(&self) -> Vec<bool> {
        self.states.lock().unwrap().clone()
    }

    pub(crate) fn guard_calls(&self) -> usize {
        self.guards.load(Ordering::SeqCst)
    }
}

impl SessionListener for RecordingListener {
    fn on_auth_state_changed(&self, is_authenticated: bool) {
        self.states.lock().unwrap().push(is_authenticated);
    }

    fn guard_protected_page(&self) {
        self.guards.fetch_add(1, Ordering::SeqCst);
    }
}

/// Route client logs to the test harness; `RUST_LOG` overrides the default filter
pub(crate) fn init_test_logging() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("movie_checker_http=debug"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .try_init();
}

pub(crate) fn client_for(server: &MockServer) -> (MovieClient, Arc<MemoryTokenStorage>) {
    client_with_listener(server, RecordingListener::new())
}

pub(crate) fn client_with_listener(
    server: &MockServer,
    listener: Arc<RecordingListener>,
) -> (MovieClient, Arc<MemoryTokenStorage>) {
    client_with_storage(server, Arc::new(MemoryTokenStorage::new()), listener)
}

pub(crate) fn client_with_storage(
    server: &MockServer,
    storage: Arc<MemoryTokenStorage>,
    listener: Arc<RecordingListener>,
) -> (MovieClient, Arc<MemoryTokenStorage>) {
    init_test_logging();
    let client = MovieClient::builder()
        .base_url(server.uri())
        .storage(storage.clone())
        .listener(listener)
        .build()
        .unwrap();
    (client, storage)
}
