use std::sync::Arc;

use bookline_core::{LogoutNotice, LogoutNotifier, SessionStore};
use tracing::info;

/// Forced-logout fan-out: drops the in-memory session, then hands the
/// notice to the host (toast and redirect in a browser).
pub struct ForcedLogout {
    session: SessionStore,
    host: Arc<dyn LogoutNotifier>,
}

impl ForcedLogout {
    pub fn new(session: SessionStore, host: Arc<dyn LogoutNotifier>) -> Self {
        Self { session, host }
    }
}

impl LogoutNotifier for ForcedLogout {
    fn session_expired(&self, notice: &LogoutNotice) {
        self.session.session_expired(notice);
        info!(redirect_to = %notice.redirect_to, "forced logout");
        self.host.session_expired(notice);
    }
}
