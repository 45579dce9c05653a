//! OAuth `state` guard
//!
//! Issues one nonce per redirect/popup attempt and checks it exactly once.
//! The stored value is deleted on every validation, matched or not, so a
//! captured callback URL cannot be replayed.

use std::sync::Arc;

use bookline_common::{constant_time_eq, generate_state, PersistentStore};
use bookline_domain::constants::{AUTHORIZATION_PATH, OAUTH_STATE_KEY};
use bookline_domain::{AppConfig, AuthError};
use tracing::warn;
use url::Url;

/// Issues and checks the single-use OAuth `state` nonce
#[derive(Clone)]
pub struct StateGuard {
    store: Arc<dyn PersistentStore>,
}

impl StateGuard {
    pub fn new(store: Arc<dyn PersistentStore>) -> Self {
        Self { store }
    }

    /// Generate and store a fresh nonce, replacing any previous one
    pub fn issue(&self) -> String {
        let state = generate_state();
        if let Err(e) = self.store.set(OAUTH_STATE_KEY, &state) {
            // Validation of this nonce will fail closed
            warn!(error = %e, "failed to persist OAuth state");
        }
        state
    }

    /// Check `received` against the stored nonce and consume it.
    ///
    /// A missing stored value and a mismatch both return `false`.
    pub fn validate(&self, received: &str) -> bool {
        let stored = match self.store.get(OAUTH_STATE_KEY) {
            Ok(value) => value,
            Err(e) => {
                warn!(error = %e, "failed to read OAuth state");
                None
            }
        };
        self.clear();

        stored.is_some_and(|expected| constant_time_eq(&expected, received))
    }

    /// Drop any outstanding nonce
    pub fn clear(&self) {
        if let Err(e) = self.store.remove(OAUTH_STATE_KEY) {
            warn!(error = %e, "failed to clear OAuth state");
        }
    }

    /// Issue a nonce and build the provider authorization URL embedding it
    ///
    /// # Errors
    /// Returns `AuthError::Config` if the client id is missing or the
    /// provider host does not form a valid URL
    pub fn authorization_url(&self, config: &AppConfig) -> Result<String, AuthError> {
        let client_id = config
            .oauth
            .client_id
            .as_deref()
            .ok_or_else(|| AuthError::Config("Google Client ID is not configured".to_string()))?;

        let base = format!("https://{}{}", config.oauth.provider_host, AUTHORIZATION_PATH);
        let redirect_uri = config.redirect_uri();
        let scope = config.oauth.scope();
        let state = self.issue();

        let url = Url::parse_with_params(
            &base,
            &[
                ("client_id", client_id),
                ("redirect_uri", redirect_uri.as_str()),
                ("response_type", "code"),
                ("scope", scope.as_str()),
                ("access_type", "online"),
                ("prompt", "select_account"),
                ("state", state.as_str()),
                ("include_granted_scopes", "true"),
            ],
        )
        .map_err(|e| AuthError::Config(format!("Invalid authorization URL: {e}")))?;

        Ok(url.into())
    }
}

#[cfg(test)]
mod tests {
    use bookline_common::MemoryStore;

    use super::*;

    fn guard() -> (StateGuard, MemoryStore) {
        let store = MemoryStore::new();
        (StateGuard::new(Arc::new(store.clone())), store)
    }

    #[test]
    fn test_nonce_validates_exactly_once() {
        let (guard, _) = guard();
        let state = guard.issue();

        assert!(guard.validate(&state));
        assert!(!guard.validate(&state));
    }

    #[test]
    fn test_mismatch_still_consumes() {
        let (guard, store) = guard();
        let state = guard.issue();

        assert!(!guard.validate("forged"));
        assert!(!store.contains(OAUTH_STATE_KEY));
        assert!(!guard.validate(&state));
    }

    #[test]
    fn test_missing_nonce_is_rejected() {
        let (guard, _) = guard();
        assert!(!guard.validate(""));
        assert!(!guard.validate("anything"));
    }

    #[test]
    fn test_authorization_url_embeds_stored_state() {
        let (guard, store) = guard();
        let mut config = AppConfig::default();
        config.app_origin = "https://book.example".to_string();
        config.oauth.client_id = Some("client-123".to_string());

        let url = Url::parse(&guard.authorization_url(&config).unwrap()).unwrap();
        let params: std::collections::HashMap<_, _> = url.query_pairs().into_owned().collect();

        assert_eq!(url.host_str(), Some("accounts.google.com"));
        assert_eq!(url.path(), "/o/oauth2/v2/auth");
        assert_eq!(params["client_id"], "client-123");
        assert_eq!(params["redirect_uri"], "https://book.example/auth/google/callback");
        assert_eq!(params["response_type"], "code");
        assert_eq!(params["scope"], "openid profile email");
        assert_eq!(params["access_type"], "online");
        assert_eq!(params["prompt"], "select_account");
        assert_eq!(params["include_granted_scopes"], "true");
        assert_eq!(Some(params["state"].clone()), store.get(OAUTH_STATE_KEY).unwrap());
    }

    #[test]
    fn test_authorization_url_requires_client_id() {
        let (guard, store) = guard();
        let err = guard.authorization_url(&AppConfig::default()).unwrap_err();

        assert!(matches!(err, AuthError::Config(_)));
        assert!(store.is_empty());
    }
}
