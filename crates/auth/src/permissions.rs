use std::borrow::Cow;

use serde::{Deserialize, Serialize};

/// Permission name: the derived `resource.action` identifier.
///
/// A permission is an atomic (resource, action) capability; its unique name
/// is `resource.action` (e.g. `users.read`). The resource part may itself
/// contain dots (`admin.users.list`), so parsing splits on the *last* dot.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PermissionName(Cow<'static, str>);

impl PermissionName {
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    /// Derive the unique name from its (resource, action) pair.
    pub fn from_parts(resource: &str, action: &str) -> Self {
        Self(Cow::Owned(format!("{resource}.{action}")))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The resource part (everything before the last dot), if well-formed.
    pub fn resource(&self) -> Option<&str> {
        self.0.rsplit_once('.').map(|(resource, _)| resource)
    }

    /// The action part (everything after the last dot), if well-formed.
    pub fn action(&self) -> Option<&str> {
        self.0.rsplit_once('.').map(|(_, action)| action)
    }
}

impl core::fmt::Display for PermissionName {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PermissionName {
    fn from(value: &str) -> Self {
        Self(Cow::Owned(value.to_string()))
    }
}

impl From<String> for PermissionName {
    fn from(value: String) -> Self {
        Self(Cow::Owned(value))
    }
}
