//! Typed account endpoints
//!
//! Every endpoint that issues tokens persists them before returning, so
//! callers only deal with the user payload.

use async_trait::async_trait;
use bookline_core::{AuthBackend, IdentityApi};
use bookline_domain::constants::{
    CHANGE_PASSWORD_PATH, CURRENT_USER_PATH, GOOGLE_CALLBACK_PATH, GOOGLE_LOGIN_PATH, LOGIN_PATH,
    REGISTER_PATH, TOKEN_REFRESH_PATH,
};
use bookline_domain::{ApiFailure, AuthSuccess, UserRecord};
use serde_json::{json, Value};
use tracing::{info, warn};

use super::client::ApiGateway;

/// Account endpoints on top of the gateway
#[derive(Clone)]
pub struct AuthApi {
    gateway: ApiGateway,
}

impl AuthApi {
    pub fn new(gateway: ApiGateway) -> Self {
        Self { gateway }
    }

    pub fn gateway(&self) -> &ApiGateway {
        &self.gateway
    }

    /// `POST /accounts/users/change_password/`
    ///
    /// # Errors
    /// Returns the gateway failure
    pub async fn change_password(&self, password_data: &Value) -> Result<Value, ApiFailure> {
        self.gateway.post(CHANGE_PASSWORD_PATH, password_data).await
    }

    /// Explicit `POST /accounts/token/refresh/`; the gateway refreshes on
    /// its own, this is for callers that hold a refresh token themselves.
    ///
    /// # Errors
    /// Returns the gateway failure
    pub async fn refresh_token(&self, refresh: &str) -> Result<Value, ApiFailure> {
        self.gateway.post(TOKEN_REFRESH_PATH, &json!({ "refresh": refresh })).await
    }

    async fn exchange(&self, endpoint: &str, body: &Value) -> Result<AuthSuccess, ApiFailure> {
        let success: AuthSuccess = self.gateway.post(endpoint, body).await?;
        match success.grant() {
            Some(grant) => {
                if let Err(e) = self.gateway.tokens().store(&grant) {
                    warn!(endpoint, error = %e, "failed to persist issued tokens");
                }
            }
            None => warn!(endpoint, "authentication response carried no access token"),
        }
        info!(endpoint, user_id = success.user.id, "authenticated");
        Ok(success)
    }
}

#[async_trait]
impl AuthBackend for AuthApi {
    async fn login(&self, credentials: &Value) -> Result<AuthSuccess, ApiFailure> {
        self.exchange(LOGIN_PATH, credentials).await
    }

    async fn register(&self, user_data: &Value) -> Result<AuthSuccess, ApiFailure> {
        self.exchange(REGISTER_PATH, user_data).await
    }

    async fn google_login(&self, credential: &str) -> Result<AuthSuccess, ApiFailure> {
        self.exchange(GOOGLE_LOGIN_PATH, &json!({ "access_token": credential })).await
    }

    async fn google_callback(&self, code: &str) -> Result<AuthSuccess, ApiFailure> {
        self.exchange(GOOGLE_CALLBACK_PATH, &json!({ "code": code })).await
    }

    async fn logout(&self) {
        if let Err(e) = self.gateway.tokens().clear() {
            warn!(error = %e, "failed to clear tokens on logout");
        }
        info!("logged out");
    }
}

#[async_trait]
impl IdentityApi for AuthApi {
    async fn current_user(&self) -> Result<UserRecord, ApiFailure> {
        self.gateway.get(CURRENT_USER_PATH, &[]).await
    }
}
