//! Store-backed authorization guard.
//!
//! Composes the typed authentication context with fresh reads through the
//! permission resolver, then delegates the final decision to the pure
//! predicates in `sentra-auth::guard`. Denial reasons are logged here and
//! collapse to the one generic authorization error on the way out.

use std::sync::Arc;

use tracing::debug;

use sentra_auth::{
    guard, AuthContext, AuthzDenied, DenyReason, PermissionName, RoleName,
};
use sentra_core::{AuthError, AuthResult, UserId};

use crate::resolver::PermissionResolver;
use crate::store::CredentialStore;

/// Decision predicates for request handling, designed to compose as
/// pipeline stages. Read-only: the only side effect is the read-through to
/// the store.
#[derive(Clone)]
pub struct AuthorizationGuard {
    store: Arc<dyn CredentialStore>,
    resolver: PermissionResolver,
}

impl AuthorizationGuard {
    pub fn new(store: Arc<dyn CredentialStore>) -> Self {
        Self {
            resolver: PermissionResolver::new(store.clone()),
            store,
        }
    }

    fn deny(&self, ctx: &AuthContext, denied: AuthzDenied) -> AuthError {
        debug!(user = %ctx.user_id, reason = ?denied.reason, "authorization denied");
        denied.into()
    }

    /// Allow iff the principal's primary (first-assigned) role is in
    /// `allowed`. See [`guard::require_role`] for the single-role semantics.
    pub fn require_role(&self, ctx: &AuthContext, allowed: &[RoleName]) -> AuthResult<()> {
        guard::require_role(ctx, allowed).map_err(|d| self.deny(ctx, d))
    }

    /// Allow iff a fresh read shows the (resource, action) capability.
    pub async fn require_permission(
        &self,
        ctx: &AuthContext,
        resource: &str,
        action: &str,
    ) -> AuthResult<()> {
        if self
            .resolver
            .has_permission(ctx.user_id, resource, action)
            .await?
        {
            Ok(())
        } else {
            Err(self.deny(ctx, AuthzDenied::new(DenyReason::MissingPermission)))
        }
    }

    /// Allow iff the freshly resolved permission set covers all of
    /// `required`.
    pub async fn require_all_permissions(
        &self,
        ctx: &AuthContext,
        required: &[PermissionName],
    ) -> AuthResult<()> {
        let granted = self.resolver.effective_permissions(ctx.user_id).await?;
        guard::require_all_permissions(&granted, required).map_err(|d| self.deny(ctx, d))
    }

    /// Allow iff at least one of `requested` is freshly granted.
    pub async fn require_any_permission(
        &self,
        ctx: &AuthContext,
        requested: &[PermissionName],
    ) -> AuthResult<()> {
        let granted = self.resolver.effective_permissions(ctx.user_id).await?;
        guard::require_any_permission(&granted, requested).map_err(|d| self.deny(ctx, d))
    }

    /// Allow iff the caller is the target principal or holds `elevated`.
    pub fn require_self_or_role(
        &self,
        ctx: &AuthContext,
        target: UserId,
        elevated: &RoleName,
    ) -> AuthResult<()> {
        guard::require_self_or_role(ctx, target, elevated).map_err(|d| self.deny(ctx, d))
    }

    /// Allow iff the caller holds `elevated`, or the stored resource's owner
    /// is the caller.
    ///
    /// A nonexistent resource produces the same denial as someone else's
    /// resource: callers cannot distinguish "not found" from "not yours".
    pub async fn require_resource_owner(
        &self,
        ctx: &AuthContext,
        resource: &str,
        resource_id: &str,
        elevated: &RoleName,
    ) -> AuthResult<()> {
        if ctx.has_role(elevated) {
            return Ok(());
        }

        match self.store.find_resource_owner(resource, resource_id).await? {
            Some(owner) if owner == ctx.user_id => Ok(()),
            _ => Err(self.deny(ctx, AuthzDenied::new(DenyReason::NotOwner))),
        }
    }

    pub fn resolver(&self) -> &PermissionResolver {
        &self.resolver
    }
}
