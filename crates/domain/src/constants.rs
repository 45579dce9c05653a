//! Application constants
//!
//! Centralized location for storage keys, endpoint paths, wire identifiers
//! and the design values of every timer in the login flow.

// Client-persisted storage keys (cleared together, never independently)
pub const ACCESS_TOKEN_KEY: &str = "access_token";
pub const REFRESH_TOKEN_KEY: &str = "refresh_token";
pub const OAUTH_STATE_KEY: &str = "google_oauth_state";

// Backend endpoints, relative to the API base URL
pub const TOKEN_REFRESH_PATH: &str = "/accounts/token/refresh/";
pub const CURRENT_USER_PATH: &str = "/accounts/users/me/";
pub const LOGIN_PATH: &str = "/accounts/login/";
pub const REGISTER_PATH: &str = "/accounts/register/";
pub const GOOGLE_LOGIN_PATH: &str = "/accounts/google-login/";
pub const GOOGLE_CALLBACK_PATH: &str = "/accounts/google-callback/";
pub const CHANGE_PASSWORD_PATH: &str = "/accounts/users/change_password/";

// Identity provider
pub const DEFAULT_PROVIDER_HOST: &str = "accounts.google.com";
pub const AUTHORIZATION_PATH: &str = "/o/oauth2/v2/auth";
pub const DEFAULT_REDIRECT_PATH: &str = "/auth/google/callback";
pub const DEFAULT_SCOPES: &[&str] = &["openid", "profile", "email"];
pub const SDK_SCRIPT_URL: &str = "https://accounts.google.com/gsi/client";
pub const SDK_SCRIPT_MARKER: &str = "gsi/client";
pub const POPUP_WINDOW_NAME: &str = "google-oauth";

// Cross-window message types
pub const MESSAGE_AUTH_SUCCESS: &str = "GOOGLE_AUTH_SUCCESS";
pub const MESSAGE_AUTH_ERROR: &str = "GOOGLE_AUTH_ERROR";

// Login flow timers (milliseconds)
pub const SILENT_PROMPT_TIMEOUT_MS: u64 = 10_000;
pub const POPUP_TIMEOUT_MS: u64 = 120_000;
pub const POPUP_WIDTH: u32 = 500;
pub const POPUP_HEIGHT: u32 = 600;

// Script loader (milliseconds unless noted)
pub const SCRIPT_LOAD_MAX_ATTEMPTS: u32 = 3;
pub const SCRIPT_LOAD_INITIAL_BACKOFF_MS: u64 = 1_000;
pub const SCRIPT_POLL_INTERVAL_MS: u64 = 100;
pub const SCRIPT_MAX_WAIT_MS: u64 = 10_000;
pub const SCRIPT_SETTLE_DELAY_MS: u64 = 100;

// Gateway
pub const DEFAULT_API_URL: &str = "http://localhost:8000/api";
pub const DEFAULT_API_TIMEOUT_SECS: u64 = 30;
pub const SIGN_IN_ROUTE: &str = "/auth/login";
pub const SESSION_EXPIRED_MESSAGE: &str = "Your session has expired. Please sign in again.";
pub const NON_FIELD_ERRORS_KEY: &str = "non_field_errors";
