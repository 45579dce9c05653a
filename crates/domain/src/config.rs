//! Configuration structures
//!
//! Every field has a default equal to the design value in
//! [`crate::constants`]; files and environment variables only need to name
//! what they override.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_API_TIMEOUT_SECS, DEFAULT_API_URL, DEFAULT_PROVIDER_HOST, DEFAULT_REDIRECT_PATH,
    DEFAULT_SCOPES, POPUP_HEIGHT, POPUP_TIMEOUT_MS, POPUP_WIDTH, SCRIPT_LOAD_INITIAL_BACKOFF_MS,
    SCRIPT_LOAD_MAX_ATTEMPTS, SCRIPT_MAX_WAIT_MS, SCRIPT_POLL_INTERVAL_MS,
    SCRIPT_SETTLE_DELAY_MS, SIGN_IN_ROUTE, SILENT_PROMPT_TIMEOUT_MS,
};
use crate::utils::serde::duration_millis;

/// Top-level application configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Origin the application is served from; cross-window messages from
    /// any other origin are dropped
    pub app_origin: String,
    pub api: ApiConfig,
    pub oauth: OAuthConfig,
    pub login: LoginConfig,
    pub loader: LoaderConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            app_origin: "http://localhost:5173".to_string(),
            api: ApiConfig::default(),
            oauth: OAuthConfig::default(),
            login: LoginConfig::default(),
            loader: LoaderConfig::default(),
        }
    }
}

impl AppConfig {
    /// Absolute redirect URI registered with the identity provider
    #[must_use]
    pub fn redirect_uri(&self) -> String {
        format!("{}{}", self.app_origin.trim_end_matches('/'), self.oauth.redirect_path)
    }
}

/// Backend API settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    pub timeout_secs: u64,
    /// Route the UI is sent to after a forced logout
    pub sign_in_route: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_URL.to_string(),
            timeout_secs: DEFAULT_API_TIMEOUT_SECS,
            sign_in_route: SIGN_IN_ROUTE.to_string(),
        }
    }
}

impl ApiConfig {
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Identity provider settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OAuthConfig {
    /// Google client id; login fails with a configuration error without it
    pub client_id: Option<String>,
    pub provider_host: String,
    pub redirect_path: String,
    pub scopes: Vec<String>,
}

impl Default for OAuthConfig {
    fn default() -> Self {
        Self {
            client_id: None,
            provider_host: DEFAULT_PROVIDER_HOST.to_string(),
            redirect_path: DEFAULT_REDIRECT_PATH.to_string(),
            scopes: DEFAULT_SCOPES.iter().map(ToString::to_string).collect(),
        }
    }
}

impl OAuthConfig {
    /// Scopes in the space-separated form the provider expects
    #[must_use]
    pub fn scope(&self) -> String {
        self.scopes.join(" ")
    }
}

/// Login flow timers and popup geometry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoginConfig {
    /// Soft timeout: silent prompt falls back to the popup flow
    #[serde(with = "duration_millis")]
    pub silent_timeout: Duration,
    /// Hard timeout: popup flow fails with `AuthenticationTimeout`
    #[serde(with = "duration_millis")]
    pub popup_timeout: Duration,
    pub popup_width: u32,
    pub popup_height: u32,
}

impl Default for LoginConfig {
    fn default() -> Self {
        Self {
            silent_timeout: Duration::from_millis(SILENT_PROMPT_TIMEOUT_MS),
            popup_timeout: Duration::from_millis(POPUP_TIMEOUT_MS),
            popup_width: POPUP_WIDTH,
            popup_height: POPUP_HEIGHT,
        }
    }
}

/// Identity SDK script loading
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoaderConfig {
    pub max_attempts: u32,
    #[serde(with = "duration_millis")]
    pub initial_backoff: Duration,
    #[serde(with = "duration_millis")]
    pub poll_interval: Duration,
    #[serde(with = "duration_millis")]
    pub max_wait: Duration,
    #[serde(with = "duration_millis")]
    pub settle_delay: Duration,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            max_attempts: SCRIPT_LOAD_MAX_ATTEMPTS,
            initial_backoff: Duration::from_millis(SCRIPT_LOAD_INITIAL_BACKOFF_MS),
            poll_interval: Duration::from_millis(SCRIPT_POLL_INTERVAL_MS),
            max_wait: Duration::from_millis(SCRIPT_MAX_WAIT_MS),
            settle_delay: Duration::from_millis(SCRIPT_SETTLE_DELAY_MS),
        }
    }
}
