//! User record returned by the identity endpoint

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::impl_label_conversions;

/// Account type assigned by the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserType {
    Customer,
    BusinessOwner,
    #[serde(other)]
    Other,
}

impl_label_conversions!(UserType {
    Customer => "customer",
    BusinessOwner => "business_owner",
    Other => "other",
});

/// Current user as returned by `GET /accounts/users/me/`
///
/// Only the fields the session logic reads are typed; everything else the
/// backend sends is preserved in `extra` for display layers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_type: Option<UserType>,
    #[serde(default)]
    pub is_staff: bool,
    #[serde(default)]
    pub is_superuser: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl UserRecord {
    /// Name used in greetings, falling back to "back" ("Welcome back!")
    #[must_use]
    pub fn greeting_name(&self) -> &str {
        self.first_name.as_deref().filter(|name| !name.is_empty()).unwrap_or("back")
    }

    #[must_use]
    pub fn is_business_owner(&self) -> bool {
        self.user_type == Some(UserType::BusinessOwner)
    }

    #[must_use]
    pub fn is_customer(&self) -> bool {
        self.user_type == Some(UserType::Customer)
    }

    #[must_use]
    pub const fn is_admin(&self) -> bool {
        self.is_staff || self.is_superuser
    }

    #[must_use]
    pub fn can_manage_businesses(&self) -> bool {
        self.is_admin() || self.is_business_owner()
    }
}
