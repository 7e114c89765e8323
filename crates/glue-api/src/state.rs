//! Application state for API handlers

use chrono::Duration;
use glue_identity::AuthFlow;

/// Default lifetime of sessions issued after a sign-in
pub const DEFAULT_SESSION_TTL_SECS: i64 = 7 * 24 * 60 * 60;

#[derive(Clone)]
pub struct AppState {
    pub flow: AuthFlow,
    /// Lifetime of sessions created on a successful callback
    pub session_ttl: Duration,
}

impl AppState {
    pub fn new(flow: AuthFlow) -> Self {
        Self {
            flow,
            session_ttl: Duration::seconds(DEFAULT_SESSION_TTL_SECS),
        }
    }

    pub fn with_session_ttl(mut self, ttl: Duration) -> Self {
        self.session_ttl = ttl;
        self
    }
}
