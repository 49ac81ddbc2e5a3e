//! Pure authorization predicates.
//!
//! Each predicate decides over *already-resolved* principal state and returns
//! either `Ok(())` or a typed denial. The denial's reason code is for logging
//! only; its `Display` is the single generic message callers may surface, so
//! a client cannot enumerate the permission model from error text.
//!
//! Store-backed variants (fresh permission reads, resource ownership) live in
//! `sentra-infra::guard` and delegate the final decision here.

use std::collections::HashSet;

use thiserror::Error;

use sentra_core::{AuthError, UserId};

use crate::context::AuthContext;
use crate::permissions::PermissionName;
use crate::roles::RoleName;

/// Internal category for a denied decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
    /// Primary role is not in the allowed set.
    RoleNotAllowed,
    /// At least one required permission is missing from the effective set.
    MissingPermission,
    /// None of the requested permissions are granted.
    NoMatchingPermission,
    /// Caller is neither the target principal nor an elevated-role holder.
    NotSelf,
    /// Caller does not own the resource, or the resource does not exist.
    /// Indistinguishable on purpose.
    NotOwner,
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("insufficient permissions")]
pub struct AuthzDenied {
    pub reason: DenyReason,
}

impl AuthzDenied {
    pub fn new(reason: DenyReason) -> Self {
        Self { reason }
    }
}

impl From<AuthzDenied> for AuthError {
    fn from(_: AuthzDenied) -> Self {
        AuthError::Authorization
    }
}

/// Allow iff the principal's *primary* role (head of the role list) is in
/// `allowed`.
///
/// This is deliberately a single-role check, not "holds any of these roles":
/// a principal whose roles are `[user, admin]` does not pass an
/// admin-only gate, while `[admin, user]` does. Secondary-role callers
/// should gate on permissions ([`require_any_permission`]) or use
/// [`require_self_or_role`], both of which consult the full role list.
pub fn require_role(ctx: &AuthContext, allowed: &[RoleName]) -> Result<(), AuthzDenied> {
    match ctx.primary_role() {
        Some(primary) if allowed.contains(primary) => Ok(()),
        _ => Err(AuthzDenied::new(DenyReason::RoleNotAllowed)),
    }
}

/// Allow iff the caller *is* the target principal, or holds `elevated`
/// anywhere in its role list.
pub fn require_self_or_role(
    ctx: &AuthContext,
    target: UserId,
    elevated: &RoleName,
) -> Result<(), AuthzDenied> {
    if ctx.user_id == target || ctx.has_role(elevated) {
        Ok(())
    } else {
        Err(AuthzDenied::new(DenyReason::NotSelf))
    }
}

/// Allow iff `granted` is a superset of `required`.
pub fn require_all_permissions(
    granted: &HashSet<PermissionName>,
    required: &[PermissionName],
) -> Result<(), AuthzDenied> {
    if required.iter().all(|p| granted.contains(p)) {
        Ok(())
    } else {
        Err(AuthzDenied::new(DenyReason::MissingPermission))
    }
}

/// Allow iff at least one of `requested` is granted.
pub fn require_any_permission(
    granted: &HashSet<PermissionName>,
    requested: &[PermissionName],
) -> Result<(), AuthzDenied> {
    if requested.iter().any(|p| granted.contains(p)) {
        Ok(())
    } else {
        Err(AuthzDenied::new(DenyReason::NoMatchingPermission))
    }
}
