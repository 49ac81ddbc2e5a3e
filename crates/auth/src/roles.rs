use std::borrow::Cow;

use serde::{Deserialize, Serialize};

/// Role name used for RBAC.
///
/// Role names are opaque strings at this layer ("admin", "user", ...);
/// mapping a role to its permission set is store-backed and lives in
/// `sentra-infra`. The order in which roles are assigned to a principal is
/// significant: the first-assigned role is the principal's *primary* role.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoleName(Cow<'static, str>);

/// Role every freshly registered principal receives when it exists.
pub const DEFAULT_ROLE: RoleName = RoleName(Cow::Borrowed("user"));

/// Role that satisfies the elevated branch of ownership/self checks.
pub const ADMIN_ROLE: RoleName = RoleName(Cow::Borrowed("admin"));

impl RoleName {
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_admin(&self) -> bool {
        *self == ADMIN_ROLE
    }
}

impl core::fmt::Display for RoleName {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RoleName {
    fn from(value: &str) -> Self {
        Self(Cow::Owned(value.to_string()))
    }
}

impl From<String> for RoleName {
    fn from(value: String) -> Self {
        Self(Cow::Owned(value))
    }
}
