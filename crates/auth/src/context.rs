use serde::{Deserialize, Serialize};

use sentra_core::UserId;

use crate::{PermissionName, RoleName};

/// Authenticated principal state for one request.
///
/// Produced by the authenticate step (bearer verification + fresh user read)
/// and threaded explicitly to downstream guards, never attached to a request
/// object by mutation.
///
/// `roles` preserves assignment order; the head of the list is the primary
/// role. `permissions` is a point-in-time snapshot suitable for token
/// embedding and display; authorization-critical decisions re-read the store
/// through the permission resolver instead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthContext {
    pub user_id: UserId,
    pub email: String,
    pub username: String,
    pub roles: Vec<RoleName>,
    pub permissions: Vec<PermissionName>,
    pub is_verified: bool,
}

impl AuthContext {
    pub fn new(
        user_id: UserId,
        email: impl Into<String>,
        username: impl Into<String>,
        roles: Vec<RoleName>,
        permissions: Vec<PermissionName>,
        is_verified: bool,
    ) -> Self {
        Self {
            user_id,
            email: email.into(),
            username: username.into(),
            roles,
            permissions,
            is_verified,
        }
    }

    /// The first-assigned role, if any.
    pub fn primary_role(&self) -> Option<&RoleName> {
        self.roles.first()
    }

    /// Whether the principal holds `role` anywhere in its role list.
    pub fn has_role(&self, role: &RoleName) -> bool {
        self.roles.iter().any(|r| r == role)
    }
}
