//! Default role/permission fixtures.
//!
//! Mirrors the deployment bootstrap: CRUD permissions for the `users` and
//! `roles` resources, an `admin` role holding all of them, a `moderator`
//! role with read access, and the bare `user` role every registration
//! receives. Safe to run repeatedly (permission creation is idempotent,
//! existing roles are left untouched).

use sentra_core::PermissionId;

use super::contract::{CredentialStore, StoreError};

const RESOURCES: [&str; 2] = ["users", "roles"];
const ACTIONS: [&str; 4] = ["create", "read", "update", "delete"];

pub async fn seed_defaults(store: &dyn CredentialStore) -> Result<(), StoreError> {
    let mut all: Vec<PermissionId> = Vec::new();
    let mut read_only: Vec<PermissionId> = Vec::new();

    for resource in RESOURCES {
        for action in ACTIONS {
            let description = format!("{action} {resource}");
            let permission = store
                .upsert_permission(resource, action, Some(&description))
                .await?;
            if action == "read" {
                read_only.push(permission.id);
            }
            all.push(permission.id);
        }
    }

    if store.find_role_by_name("admin").await?.is_none() {
        let admin = store
            .create_role("admin", Some("Administrator with full access"))
            .await?;
        store.replace_role_permissions(admin.id, &all).await?;
    }

    if store.find_role_by_name("moderator").await?.is_none() {
        let moderator = store
            .create_role("moderator", Some("Read access to users and roles"))
            .await?;
        store
            .replace_role_permissions(moderator.id, &read_only)
            .await?;
    }

    if store.find_role_by_name("user").await?.is_none() {
        store
            .create_role("user", Some("Default role for new registrations"))
            .await?;
    }

    Ok(())
}
