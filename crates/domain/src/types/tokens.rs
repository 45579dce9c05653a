//! Access/refresh token types
//!
//! A `TokenGrant` is what the backend hands out (login, registration,
//! refresh). A `TokenPair` is what the token store holds. Pairs are only
//! ever built from a grant or rehydrated from the store; nothing assembles
//! one from arbitrary strings.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Tokens issued by a backend login, registration or refresh call
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenGrant {
    pub access: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh: Option<String>,
}

impl fmt::Debug for TokenGrant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenGrant")
            .field("access", &"<redacted>")
            .field("refresh", &self.refresh.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// The access/refresh pair currently held by the client
#[derive(Clone, PartialEq, Eq)]
pub struct TokenPair {
    access: String,
    refresh: Option<String>,
}

impl TokenPair {
    /// Rehydrate a pair previously written by the token store
    #[must_use]
    pub const fn restore(access: String, refresh: Option<String>) -> Self {
        Self { access, refresh }
    }

    /// Short-lived credential attached to outbound requests
    #[must_use]
    pub fn access(&self) -> &str {
        &self.access
    }

    /// Longer-lived credential exchanged for new access tokens
    #[must_use]
    pub fn refresh(&self) -> Option<&str> {
        self.refresh.as_deref()
    }
}

impl From<TokenGrant> for TokenPair {
    fn from(grant: TokenGrant) -> Self {
        Self { access: grant.access, refresh: grant.refresh }
    }
}

impl fmt::Debug for TokenPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenPair")
            .field("access", &"<redacted>")
            .field("has_refresh", &self.refresh.is_some())
            .finish()
    }
}
