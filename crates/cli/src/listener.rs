//! Session notifications for the terminal

use movie_checker_http::SessionListener;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, info};

/// Tracks whether the session was lost while a command ran
#[derive(Default)]
pub struct CliListener {
    session_lost: AtomicBool,
}

impl CliListener {
    /// Whether the client gave up on the session at some point
    pub fn session_lost(&self) -> bool {
        self.session_lost.load(Ordering::SeqCst)
    }
}

impl SessionListener for CliListener {
    fn on_auth_state_changed(&self, is_authenticated: bool) {
        debug!(is_authenticated, "Session state changed");
    }

    fn guard_protected_page(&self) {
        if !self.session_lost.swap(true, Ordering::SeqCst) {
            info!("No active session");
        }
    }
}
