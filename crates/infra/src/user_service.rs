//! Profile and user administration.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

use sentra_core::{AuthError, AuthResult, UserId};

use crate::resolver::PermissionResolver;
use crate::session::SessionManager;
use crate::store::{CredentialStore, PermissionRecord, RoleRecord, UserRecord, UserUpdate};

/// A user as reported to callers: identity plus resolved roles and
/// deduplicated permissions. The credential hash never leaves the store
/// layer through this type.
#[derive(Debug, Clone, Serialize)]
pub struct Profile {
    pub id: UserId,
    pub email: String,
    pub username: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub is_active: bool,
    pub is_verified: bool,
    pub last_login: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub roles: Vec<RoleRecord>,
    pub permissions: Vec<PermissionRecord>,
}

/// Profile fields a user may change; `None` leaves a field as-is.
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

/// User queries and administration on top of the credential store.
#[derive(Clone)]
pub struct UserService {
    store: Arc<dyn CredentialStore>,
    resolver: PermissionResolver,
    sessions: SessionManager,
}

impl UserService {
    pub fn new(store: Arc<dyn CredentialStore>) -> Self {
        Self {
            resolver: PermissionResolver::new(store.clone()),
            sessions: SessionManager::new(store.clone()),
            store,
        }
    }

    pub async fn get_profile(&self, user_id: UserId) -> AuthResult<Profile> {
        let user = self
            .store
            .find_user_by_id(user_id)
            .await?
            .ok_or_else(|| AuthError::not_found("user not found"))?;
        self.profile(user).await
    }

    /// Update profile fields. Usernames stay unique across other users.
    pub async fn update_profile(
        &self,
        user_id: UserId,
        changes: ProfileUpdate,
    ) -> AuthResult<Profile> {
        if self.store.find_user_by_id(user_id).await?.is_none() {
            return Err(AuthError::not_found("user not found"));
        }

        if let Some(username) = &changes.username {
            if let Some(existing) = self.store.find_user_by_username(username).await? {
                if existing.id != user_id {
                    return Err(AuthError::conflict("username is already taken"));
                }
            }
        }

        let user = self
            .store
            .update_user(
                user_id,
                UserUpdate {
                    username: changes.username,
                    first_name: changes.first_name,
                    last_name: changes.last_name,
                    ..Default::default()
                },
            )
            .await?;

        self.profile(user).await
    }

    /// Page through users, oldest first. Returns the page and the total.
    pub async fn list_users(&self, offset: u64, limit: u64) -> AuthResult<(Vec<Profile>, u64)> {
        let total = self.store.count_users().await?;
        let mut profiles = Vec::new();
        for user in self.store.list_users(offset, limit).await? {
            profiles.push(self.profile(user).await?);
        }
        Ok((profiles, total))
    }

    /// Activate or deactivate an account. Deactivation takes effect on the
    /// next authenticated request (the middleware re-reads the user) and on
    /// the next refresh; existing sessions are also revoked outright.
    pub async fn set_active(&self, user_id: UserId, active: bool) -> AuthResult<Profile> {
        let user = self
            .store
            .update_user(
                user_id,
                UserUpdate {
                    is_active: Some(active),
                    ..Default::default()
                },
            )
            .await
            .map_err(|e| match e {
                crate::store::StoreError::NotFound => AuthError::not_found("user not found"),
                other => other.into(),
            })?;

        if !active {
            self.sessions.revoke_all(user_id).await?;
        }

        info!(user = %user_id, active, "user active flag changed");
        self.profile(user).await
    }

    /// Delete an account. The store cascades role assignments and sessions.
    pub async fn delete_user(&self, user_id: UserId) -> AuthResult<()> {
        self.store
            .delete_user(user_id)
            .await
            .map_err(|e| match e {
                crate::store::StoreError::NotFound => AuthError::not_found("user not found"),
                other => other.into(),
            })?;

        info!(user = %user_id, "user deleted");
        Ok(())
    }

    async fn profile(&self, user: UserRecord) -> AuthResult<Profile> {
        let roles = self.store.user_roles(user.id).await?;
        let permissions = self.resolver.permissions_of(user.id).await?;

        Ok(Profile {
            id: user.id,
            email: user.email,
            username: user.username,
            first_name: user.first_name,
            last_name: user.last_name,
            is_active: user.is_active,
            is_verified: user.is_verified,
            last_login: user.last_login,
            created_at: user.created_at,
            updated_at: user.updated_at,
            roles,
            permissions,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{InMemoryCredentialStore, NewSession, NewUser};
    use chrono::Duration;

    struct Fixture {
        store: Arc<InMemoryCredentialStore>,
        users: UserService,
        user_id: UserId,
    }

    async fn fixture() -> Fixture {
        let store = Arc::new(InMemoryCredentialStore::new());
        let user = store
            .create_user(NewUser {
                email: "alice@example.com".to_string(),
                username: "alice".to_string(),
                password_hash: "hash".to_string(),
                first_name: Some("Alice".to_string()),
                last_name: None,
            })
            .await
            .unwrap();

        Fixture {
            users: UserService::new(store.clone()),
            store,
            user_id: user.id,
        }
    }

    #[tokio::test]
    async fn profile_includes_roles_and_deduplicated_permissions() {
        let f = fixture().await;
        let read = f.store.upsert_permission("docs", "read", None).await.unwrap();
        let write = f.store.upsert_permission("docs", "write", None).await.unwrap();

        let a = f.store.create_role("a", None).await.unwrap();
        f.store.replace_role_permissions(a.id, &[read.id, write.id]).await.unwrap();
        let b = f.store.create_role("b", None).await.unwrap();
        f.store.replace_role_permissions(b.id, &[write.id]).await.unwrap();

        f.store.assign_role(f.user_id, a.id).await.unwrap();
        f.store.assign_role(f.user_id, b.id).await.unwrap();

        let profile = f.users.get_profile(f.user_id).await.unwrap();
        assert_eq!(profile.roles.len(), 2);
        // docs.write appears once despite being granted by both roles.
        assert_eq!(profile.permissions.len(), 2);
    }

    #[tokio::test]
    async fn unknown_user_is_not_found() {
        let f = fixture().await;
        assert!(matches!(
            f.users.get_profile(UserId::new()).await,
            Err(AuthError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn username_change_rejects_taken_names() {
        let f = fixture().await;
        f.store
            .create_user(NewUser {
                email: "bob@example.com".to_string(),
                username: "bob".to_string(),
                password_hash: "hash".to_string(),
                first_name: None,
                last_name: None,
            })
            .await
            .unwrap();

        let err = f
            .users
            .update_profile(
                f.user_id,
                ProfileUpdate {
                    username: Some("bob".to_string()),
                    ..Default::default()
                },
            )
            .await
            .expect_err("taken");
        assert!(matches!(err, AuthError::Conflict(_)));

        // Re-submitting one's own username is not a conflict.
        let profile = f
            .users
            .update_profile(
                f.user_id,
                ProfileUpdate {
                    username: Some("alice".to_string()),
                    first_name: Some("Alicia".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(profile.first_name.as_deref(), Some("Alicia"));
    }

    #[tokio::test]
    async fn deactivation_revokes_sessions() {
        let f = fixture().await;
        f.store
            .create_session(NewSession {
                user_id: f.user_id,
                token: "t1".to_string(),
                expires_at: Utc::now() + Duration::days(1),
                origin: Default::default(),
            })
            .await
            .unwrap();

        let profile = f.users.set_active(f.user_id, false).await.unwrap();
        assert!(!profile.is_active);
        assert!(f
            .store
            .list_active_sessions(f.user_id, Utc::now())
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn listing_pages_and_counts() {
        let f = fixture().await;
        for i in 0..3 {
            f.store
                .create_user(NewUser {
                    email: format!("user{i}@example.com"),
                    username: format!("user{i}"),
                    password_hash: "hash".to_string(),
                    first_name: None,
                    last_name: None,
                })
                .await
                .unwrap();
        }

        let (page, total) = f.users.list_users(0, 2).await.unwrap();
        assert_eq!(total, 4);
        assert_eq!(page.len(), 2);
        // Oldest first: the fixture user registered before the loop.
        assert_eq!(page[0].username, "alice");

        let (rest, _) = f.users.list_users(2, 10).await.unwrap();
        assert_eq!(rest.len(), 2);
    }

    #[tokio::test]
    async fn delete_user_cascades() {
        let f = fixture().await;
        let role = f.store.create_role("user", None).await.unwrap();
        f.store.assign_role(f.user_id, role.id).await.unwrap();

        f.users.delete_user(f.user_id).await.unwrap();
        assert!(matches!(
            f.users.get_profile(f.user_id).await,
            Err(AuthError::NotFound(_))
        ));
        // The role is free to delete once its holder is gone.
        assert_eq!(f.store.count_role_users(role.id).await.unwrap(), 0);
    }
}
