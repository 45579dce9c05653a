//! Password login, registration and logout

use std::sync::Arc;

use bookline_domain::{ApiFailure, AuthSuccess, Session};
use serde_json::Value;
use tracing::{info, warn};

use super::store::SessionStore;
use super::token_store::TokenStore;
use crate::login::AuthBackend;

/// Session operations that go through the backend
#[derive(Clone)]
pub struct SessionService {
    backend: Arc<dyn AuthBackend>,
    tokens: TokenStore,
    session: SessionStore,
}

impl SessionService {
    pub fn new(backend: Arc<dyn AuthBackend>, tokens: TokenStore, session: SessionStore) -> Self {
        Self { backend, tokens, session }
    }

    /// Sign in with credentials and seed the session from the response
    ///
    /// # Errors
    /// The backend's normalized failure; the session is left unchanged
    pub async fn login(&self, credentials: &Value) -> Result<AuthSuccess, ApiFailure> {
        let success = self.backend.login(credentials).await?;
        info!(user_id = success.user.id, "signed in");
        self.session.set_user(Some(success.user.clone()));
        Ok(success)
    }

    /// Create an account and seed the session from the response
    ///
    /// # Errors
    /// The backend's normalized failure; the session is left unchanged
    pub async fn register(&self, user_data: &Value) -> Result<AuthSuccess, ApiFailure> {
        let success = self.backend.register(user_data).await?;
        info!(user_id = success.user.id, "registered");
        self.session.set_user(Some(success.user.clone()));
        Ok(success)
    }

    /// Drop credentials and settle on the signed-out state
    pub async fn logout(&self) -> Session {
        self.backend.logout().await;
        if let Err(e) = self.tokens.clear() {
            warn!(error = %e, "failed to clear tokens on logout");
        }
        self.session.clear();
        self.session.snapshot()
    }

    #[must_use]
    pub fn session(&self) -> &SessionStore {
        &self.session
    }
}
