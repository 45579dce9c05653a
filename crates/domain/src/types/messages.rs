//! Payloads exchanged between the popup window and the application

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::tokens::TokenGrant;
use super::user::UserRecord;

/// Successful authentication payload returned by the backend exchange
/// endpoints and relayed by the popup.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthSuccess {
    pub user: UserRecord,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl AuthSuccess {
    /// Tokens carried by the payload, if the backend issued any
    #[must_use]
    pub fn grant(&self) -> Option<TokenGrant> {
        self.access.as_ref().map(|access| TokenGrant {
            access: access.clone(),
            refresh: self.refresh.clone(),
        })
    }
}

impl fmt::Debug for AuthSuccess {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthSuccess")
            .field("user_id", &self.user.id)
            .field("has_access", &self.access.is_some())
            .field("has_refresh", &self.refresh.is_some())
            .finish_non_exhaustive()
    }
}

/// Error detail posted by the popup: either a bare string or `{message}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PopupErrorDetail {
    Text(String),
    Detailed { message: String },
}

impl PopupErrorDetail {
    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Self::Text(message) | Self::Detailed { message } => message,
        }
    }
}

/// Popup → application message contract
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum PopupMessage {
    #[serde(rename = "GOOGLE_AUTH_SUCCESS")]
    Success { data: AuthSuccess },
    #[serde(rename = "GOOGLE_AUTH_ERROR")]
    Error { error: PopupErrorDetail },
}

impl PopupMessage {
    /// Error message with a plain string detail
    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error { error: PopupErrorDetail::Text(message.into()) }
    }

    /// Parse an inbound payload; anything unrecognized yields `None`
    #[must_use]
    pub fn from_value(data: &Value) -> Option<Self> {
        serde_json::from_value(data.clone()).ok()
    }
}

/// A raw message as observed on the message bus
#[derive(Debug, Clone, PartialEq)]
pub struct InboundMessage {
    /// Origin of the sending window, e.g. `https://app.example.com`
    pub origin: String,
    pub data: Value,
}

impl InboundMessage {
    pub fn new(origin: impl Into<String>, data: Value) -> Self {
        Self { origin: origin.into(), data }
    }
}
