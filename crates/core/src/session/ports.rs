//! Port interfaces for session handling

use async_trait::async_trait;
use bookline_domain::{ApiFailure, UserRecord};

/// Source of the current user's identity
#[async_trait]
pub trait IdentityApi: Send + Sync {
    /// `GET /accounts/users/me/`; any failure means "not authenticated"
    async fn current_user(&self) -> Result<UserRecord, ApiFailure>;
}

/// What the UI is told when the session is forcibly ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogoutNotice {
    pub message: String,
    /// Route to send the user to
    pub redirect_to: String,
}

/// Receives forced-logout signals (toast plus redirect in a browser host)
pub trait LogoutNotifier: Send + Sync {
    fn session_expired(&self, notice: &LogoutNotice);
}
