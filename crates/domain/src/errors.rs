//! Error types used throughout the application

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for Bookline infrastructure concerns
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "message")]
pub enum BooklineError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias for Bookline operations
pub type Result<T> = std::result::Result<T, BooklineError>;

/// Typed failures of the login flow.
///
/// Every rejected login attempt carries exactly one of these. The display
/// strings are user-facing.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "message")]
pub enum AuthError {
    /// The identity SDK could not be loaded after all retries
    #[error("Failed to load Google authentication: {0}")]
    ScriptLoad(String),

    /// The popup window could not be opened
    #[error("Popup blocked. Please allow popups for this site and try again.")]
    PopupBlocked,

    /// The user dismissed the provider prompt
    #[error("Google sign-in was dismissed")]
    UserCancelled,

    /// The popup flow produced no result in time
    #[error("Authentication timed out. Please try again.")]
    AuthenticationTimeout,

    /// The provider or backend returned an unusable credential payload
    #[error("{0}")]
    InvalidCredentialResponse(String),

    /// Token refresh failed; the session is gone
    #[error("Authentication required")]
    AuthenticationRequired,

    /// The attempt was cancelled by cleanup or superseded by a newer attempt
    #[error("Authentication cancelled")]
    Cancelled,

    /// The OAuth `state` returned by the provider did not match
    #[error("Invalid authentication state. Please try signing in again.")]
    StateMismatch,

    /// Provider- or backend-reported failure message
    #[error("{0}")]
    Provider(String),

    /// The login flow is misconfigured
    #[error("Configuration error: {0}")]
    Config(String),
}

impl AuthError {
    /// Stable label suitable for logs and metrics
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::ScriptLoad(_) => "script_load",
            Self::PopupBlocked => "popup_blocked",
            Self::UserCancelled => "user_cancelled",
            Self::AuthenticationTimeout => "authentication_timeout",
            Self::InvalidCredentialResponse(_) => "invalid_credential_response",
            Self::AuthenticationRequired => "authentication_required",
            Self::Cancelled => "cancelled",
            Self::StateMismatch => "state_mismatch",
            Self::Provider(_) => "provider",
            Self::Config(_) => "config",
        }
    }
}

/// Classification of a failed gateway call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApiErrorKind {
    BadRequest,
    Unauthorized,
    Forbidden,
    NotFound,
    Unprocessable,
    RateLimited,
    ServerError,
    ServiceUnavailable,
    /// Any other non-2xx status
    Http,
    /// Transport-level failure (no response)
    Network,
    /// Refresh failed after a 401; tokens were cleared
    AuthenticationRequired,
    /// The request could not be encoded or the response decoded
    Decode,
}

impl ApiErrorKind {
    /// Map an HTTP status to its kind
    #[must_use]
    pub const fn from_status(status: u16) -> Self {
        match status {
            400 => Self::BadRequest,
            401 => Self::Unauthorized,
            403 => Self::Forbidden,
            404 => Self::NotFound,
            422 => Self::Unprocessable,
            429 => Self::RateLimited,
            500 => Self::ServerError,
            502..=504 => Self::ServiceUnavailable,
            _ => Self::Http,
        }
    }

    /// Whether this kind came from the client side of the exchange (4xx)
    #[must_use]
    pub const fn is_client_error(self) -> bool {
        matches!(
            self,
            Self::BadRequest
                | Self::Unauthorized
                | Self::Forbidden
                | Self::NotFound
                | Self::Unprocessable
                | Self::RateLimited
        )
    }

    /// Whether this kind came from the server side of the exchange (5xx)
    #[must_use]
    pub const fn is_server_error(self) -> bool {
        matches!(self, Self::ServerError | Self::ServiceUnavailable)
    }
}

/// Normalized gateway failure: a user-facing message plus its kind.
///
/// This is what the `error` slot of a gateway result carries; the gateway
/// never surfaces transport errors any other way.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[error("{message}")]
pub struct ApiFailure {
    pub kind: ApiErrorKind,
    pub message: String,
    /// HTTP status, when a response was received
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
}

impl ApiFailure {
    #[must_use]
    pub fn new(kind: ApiErrorKind, message: impl Into<String>, status: Option<u16>) -> Self {
        Self { kind, message: message.into(), status }
    }

    /// The failure returned when refresh after a 401 did not succeed
    #[must_use]
    pub fn authentication_required() -> Self {
        Self::new(ApiErrorKind::AuthenticationRequired, "Authentication required", Some(401))
    }

    /// Whether the caller should treat the session as gone
    #[must_use]
    pub const fn is_authentication_required(&self) -> bool {
        matches!(self.kind, ApiErrorKind::AuthenticationRequired)
    }
}

impl From<ApiFailure> for AuthError {
    fn from(failure: ApiFailure) -> Self {
        if failure.is_authentication_required() {
            Self::AuthenticationRequired
        } else {
            Self::Provider(failure.message)
        }
    }
}
