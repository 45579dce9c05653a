//! Popup-side handler for the authorization redirect
//!
//! The popup lands on `<origin>/auth/google/callback?code=..&state=..`.
//! The handler checks `state`, exchanges the code with the backend and
//! posts the outcome to the opener.

use std::sync::Arc;

use bookline_domain::{AuthError, InboundMessage, PopupMessage};
use tracing::{info, warn};
use url::form_urlencoded;

use super::ports::{AuthBackend, MessageBus};
use super::state_guard::StateGuard;

/// Query parameters of the redirect back from the provider
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
}

impl CallbackParams {
    /// Parse a raw query string (with or without the leading `?`)
    #[must_use]
    pub fn from_query(query: &str) -> Self {
        let mut params = Self::default();
        for (key, value) in form_urlencoded::parse(query.trim_start_matches('?').as_bytes()) {
            match key.as_ref() {
                "code" => params.code = Some(value.into_owned()),
                "state" => params.state = Some(value.into_owned()),
                "error" => params.error = Some(value.into_owned()),
                _ => {}
            }
        }
        params
    }
}

/// Popup-side end of the redirect: exchanges the code and posts the result
pub struct CallbackHandler {
    guard: StateGuard,
    backend: Arc<dyn AuthBackend>,
    bus: Arc<dyn MessageBus>,
    app_origin: String,
}

impl CallbackHandler {
    pub fn new(
        guard: StateGuard,
        backend: Arc<dyn AuthBackend>,
        bus: Arc<dyn MessageBus>,
        app_origin: impl Into<String>,
    ) -> Self {
        Self { guard, backend, bus, app_origin: app_origin.into() }
    }

    /// Resolve the redirect and post the result to the opener
    pub async fn handle(&self, params: &CallbackParams) -> PopupMessage {
        let message = self.resolve(params).await;

        match serde_json::to_value(&message) {
            Ok(data) => self.bus.post_to_opener(InboundMessage::new(self.app_origin.clone(), data)),
            Err(e) => warn!(error = %e, "failed to encode popup message"),
        }
        message
    }

    async fn resolve(&self, params: &CallbackParams) -> PopupMessage {
        if let Some(error) = &params.error {
            self.guard.clear();
            warn!(error = %error, "provider reported an authorization error");
            return PopupMessage::error(error.clone());
        }

        if !self.guard.validate(params.state.as_deref().unwrap_or_default()) {
            warn!("authorization callback failed state validation");
            return PopupMessage::error(AuthError::StateMismatch.to_string());
        }

        let Some(code) = params.code.as_deref().filter(|c| !c.is_empty()) else {
            return PopupMessage::error("No authorization code received");
        };

        match self.backend.google_callback(code).await {
            Ok(data) => {
                info!(user_id = data.user.id, "authorization code exchanged");
                PopupMessage::Success { data }
            }
            Err(failure) => PopupMessage::error(failure.message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_query() {
        let params = CallbackParams::from_query("?code=4%2F0Ab&state=xyz&scope=email");
        assert_eq!(params.code.as_deref(), Some("4/0Ab"));
        assert_eq!(params.state.as_deref(), Some("xyz"));
        assert_eq!(params.error, None);

        let denied = CallbackParams::from_query("error=access_denied");
        assert_eq!(denied.error.as_deref(), Some("access_denied"));
    }
}
