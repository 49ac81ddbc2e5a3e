//! Fresh role/permission resolution.
//!
//! Token-embedded roles and permissions are a snapshot for bearer
//! convenience; every method here re-reads the store, so a revoked
//! permission takes effect on the next request rather than after a cache
//! TTL. No cross-request caching happens at this layer.

use std::collections::HashSet;
use std::sync::Arc;

use sentra_auth::{PermissionName, RoleName};
use sentra_core::{AuthError, AuthResult, PermissionId, UserId};

use crate::store::{CredentialStore, PermissionRecord};

/// Computes the authoritative role and permission sets for a principal.
#[derive(Clone)]
pub struct PermissionResolver {
    store: Arc<dyn CredentialStore>,
}

impl PermissionResolver {
    pub fn new(store: Arc<dyn CredentialStore>) -> Self {
        Self { store }
    }

    /// Role names in assignment order (head = primary role).
    ///
    /// The unique-assignment invariant means duplicates cannot exist, but
    /// the contract guarantees deduplication regardless.
    pub async fn effective_roles(&self, user_id: UserId) -> AuthResult<Vec<RoleName>> {
        let roles = self.store.user_roles(user_id).await?;

        let mut seen = HashSet::new();
        Ok(roles
            .into_iter()
            .filter(|r| seen.insert(r.id))
            .map(|r| RoleName::from(r.name))
            .collect())
    }

    /// The union of permission names across all assigned roles.
    ///
    /// Dedup is keyed on the permission's *identity*, not its name, so a
    /// renamed-but-same-id permission still collapses to one entry.
    pub async fn effective_permissions(
        &self,
        user_id: UserId,
    ) -> AuthResult<HashSet<PermissionName>> {
        let mut seen: HashSet<PermissionId> = HashSet::new();
        let mut names = HashSet::new();

        for role in self.store.user_roles(user_id).await? {
            for permission in self.store.role_permissions(role.id).await? {
                if seen.insert(permission.id) {
                    names.insert(PermissionName::from(permission.name));
                }
            }
        }

        Ok(names)
    }

    /// Whether the principal holds the (resource, action) capability.
    ///
    /// Short-circuits on the first matching role→permission edge. A missing
    /// or deactivated principal is an authorization failure (`false`), not a
    /// system fault.
    pub async fn has_permission(
        &self,
        user_id: UserId,
        resource: &str,
        action: &str,
    ) -> AuthResult<bool> {
        match self.store.find_user_by_id(user_id).await? {
            Some(user) if user.is_active => {}
            _ => return Ok(false),
        }

        for role in self.store.user_roles(user_id).await? {
            let grants = self.store.role_permissions(role.id).await?;
            if grants
                .iter()
                .any(|p| p.resource == resource && p.action == action)
            {
                return Ok(true);
            }
        }

        Ok(false)
    }

    /// Full permission records for a principal, deduplicated by identity.
    ///
    /// Unlike [`Self::has_permission`], this is a *report* about a specific
    /// principal and therefore fails `NotFound` when it does not exist.
    pub async fn permissions_of(&self, user_id: UserId) -> AuthResult<Vec<PermissionRecord>> {
        if self.store.find_user_by_id(user_id).await?.is_none() {
            return Err(AuthError::not_found("user not found"));
        }

        let mut seen: HashSet<PermissionId> = HashSet::new();
        let mut records = Vec::new();

        for role in self.store.user_roles(user_id).await? {
            for permission in self.store.role_permissions(role.id).await? {
                if seen.insert(permission.id) {
                    records.push(permission);
                }
            }
        }

        Ok(records)
    }
}
