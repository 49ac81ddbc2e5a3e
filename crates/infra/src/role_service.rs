//! Role and permission administration.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

use sentra_core::{AuthError, AuthResult, PermissionId, RoleId, UserId};

use crate::store::{CredentialStore, PermissionRecord, RoleRecord};

/// A role with its permission set and how many users currently hold it.
#[derive(Debug, Clone, Serialize)]
pub struct RoleView {
    pub id: RoleId,
    pub name: String,
    pub description: Option<String>,
    pub permissions: Vec<PermissionRecord>,
    pub user_count: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Role CRUD, user↔role assignment, and the permission catalog.
#[derive(Clone)]
pub struct RoleService {
    store: Arc<dyn CredentialStore>,
}

impl RoleService {
    pub fn new(store: Arc<dyn CredentialStore>) -> Self {
        Self { store }
    }

    pub async fn list_roles(&self) -> AuthResult<Vec<RoleView>> {
        let mut views = Vec::new();
        for role in self.store.list_roles().await? {
            views.push(self.view(role).await?);
        }
        Ok(views)
    }

    pub async fn get_role(&self, role_id: RoleId) -> AuthResult<RoleView> {
        let role = self
            .store
            .find_role_by_id(role_id)
            .await?
            .ok_or_else(|| AuthError::not_found("role not found"))?;
        self.view(role).await
    }

    /// Create a role with an initial permission set.
    pub async fn create_role(
        &self,
        name: &str,
        description: Option<&str>,
        permission_ids: &[PermissionId],
    ) -> AuthResult<RoleView> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AuthError::validation("role name cannot be empty"));
        }

        if self.store.find_role_by_name(name).await?.is_some() {
            return Err(AuthError::conflict("role with this name already exists"));
        }

        self.ensure_permissions_exist(permission_ids).await?;

        let role = self.store.create_role(name, description).await?;
        self.store
            .replace_role_permissions(role.id, permission_ids)
            .await?;

        info!(role = %role.id, name = %role.name, "role created");
        self.view(role).await
    }

    /// Update name/description and, when given, replace the permission set
    /// wholesale. There is no diffing and no application-level lock: two
    /// concurrent edits are last-write-wins.
    pub async fn update_role(
        &self,
        role_id: RoleId,
        name: Option<&str>,
        description: Option<&str>,
        permission_ids: Option<&[PermissionId]>,
    ) -> AuthResult<RoleView> {
        let role = self
            .store
            .find_role_by_id(role_id)
            .await?
            .ok_or_else(|| AuthError::not_found("role not found"))?;

        if let Some(new_name) = name {
            if new_name != role.name
                && self.store.find_role_by_name(new_name).await?.is_some()
            {
                return Err(AuthError::conflict("role with this name already exists"));
            }
        }

        if let Some(ids) = permission_ids {
            self.ensure_permissions_exist(ids).await?;
        }

        let updated = self.store.update_role(role_id, name, description).await?;

        if let Some(ids) = permission_ids {
            self.store.replace_role_permissions(role_id, ids).await?;
        }

        self.view(updated).await
    }

    /// Delete an unassigned role. A role still held by any user cannot be
    /// deleted.
    pub async fn delete_role(&self, role_id: RoleId) -> AuthResult<()> {
        if self.store.find_role_by_id(role_id).await?.is_none() {
            return Err(AuthError::not_found("role not found"));
        }

        if self.store.count_role_users(role_id).await? > 0 {
            return Err(AuthError::validation(
                "cannot delete role that is assigned to users",
            ));
        }

        // The store re-checks assignments atomically with the delete; a
        // racing assignment surfaces as a conflict rather than a dangling
        // reference.
        self.store.delete_role(role_id).await?;
        info!(role = %role_id, "role deleted");
        Ok(())
    }

    /// Assign a role to a user. Re-assignment is a conflict, not a no-op.
    pub async fn assign_role(&self, user_id: UserId, role_id: RoleId) -> AuthResult<()> {
        if self.store.find_user_by_id(user_id).await?.is_none() {
            return Err(AuthError::not_found("user not found"));
        }
        if self.store.find_role_by_id(role_id).await?.is_none() {
            return Err(AuthError::not_found("role not found"));
        }

        self.store
            .assign_role(user_id, role_id)
            .await
            .map_err(|e| match e {
                crate::store::StoreError::Conflict(_) => {
                    AuthError::conflict("user already has this role")
                }
                other => other.into(),
            })?;

        info!(user = %user_id, role = %role_id, "role assigned");
        Ok(())
    }

    pub async fn remove_role(&self, user_id: UserId, role_id: RoleId) -> AuthResult<()> {
        self.store
            .remove_role(user_id, role_id)
            .await
            .map_err(|e| match e {
                crate::store::StoreError::NotFound => {
                    AuthError::not_found("user role assignment not found")
                }
                other => other.into(),
            })?;

        info!(user = %user_id, role = %role_id, "role removed");
        Ok(())
    }

    pub async fn list_permissions(&self) -> AuthResult<Vec<PermissionRecord>> {
        Ok(self.store.list_permissions().await?)
    }

    /// Create-or-return a permission by its derived `resource.action` name.
    pub async fn create_permission(
        &self,
        resource: &str,
        action: &str,
        description: Option<&str>,
    ) -> AuthResult<PermissionRecord> {
        let resource = resource.trim();
        let action = action.trim();
        if resource.is_empty() || action.is_empty() {
            return Err(AuthError::validation(
                "permission resource and action cannot be empty",
            ));
        }

        Ok(self
            .store
            .upsert_permission(resource, action, description)
            .await?)
    }

    async fn ensure_permissions_exist(&self, ids: &[PermissionId]) -> AuthResult<()> {
        let found = self.store.find_permissions_by_ids(ids).await?;
        if found.len() != ids.len() {
            return Err(AuthError::validation("one or more permissions not found"));
        }
        Ok(())
    }

    async fn view(&self, role: RoleRecord) -> AuthResult<RoleView> {
        let permissions = self.store.role_permissions(role.id).await?;
        let user_count = self.store.count_role_users(role.id).await?;

        Ok(RoleView {
            id: role.id,
            name: role.name,
            description: role.description,
            permissions,
            user_count,
            created_at: role.created_at,
            updated_at: role.updated_at,
        })
    }
}
