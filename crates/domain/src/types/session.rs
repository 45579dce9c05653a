//! Session projection seen by the UI layer

use serde::{Deserialize, Serialize};

use super::user::UserRecord;

/// Who is signed in, as far as the client knows.
///
/// A projection of "do we hold a token and did the last identity fetch
/// succeed". Only the login coordinator, the gateway's forced-logout path
/// and the bootstrapper change it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub user: Option<UserRecord>,
    pub is_authenticated: bool,
    pub is_loading: bool,
}

impl Session {
    /// Initial state before bootstrap has run
    #[must_use]
    pub const fn loading() -> Self {
        Self { user: None, is_authenticated: false, is_loading: true }
    }

    /// Settled, signed-out state
    #[must_use]
    pub const fn anonymous() -> Self {
        Self { user: None, is_authenticated: false, is_loading: false }
    }

    /// Settled, signed-in state
    #[must_use]
    pub const fn authenticated(user: UserRecord) -> Self {
        Self { user: Some(user), is_authenticated: true, is_loading: false }
    }

    /// Session for an optional user (`None` is anonymous)
    #[must_use]
    pub fn from_user(user: Option<UserRecord>) -> Self {
        user.map_or_else(Self::anonymous, Self::authenticated)
    }

    #[must_use]
    pub fn is_business_owner(&self) -> bool {
        self.user.as_ref().is_some_and(UserRecord::is_business_owner)
    }

    #[must_use]
    pub fn is_customer(&self) -> bool {
        self.user.as_ref().is_some_and(UserRecord::is_customer)
    }

    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.user.as_ref().is_some_and(UserRecord::is_admin)
    }

    #[must_use]
    pub fn is_superuser(&self) -> bool {
        self.user.as_ref().is_some_and(|user| user.is_superuser)
    }

    #[must_use]
    pub fn can_manage_businesses(&self) -> bool {
        self.user.as_ref().is_some_and(UserRecord::can_manage_businesses)
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::loading()
    }
}
