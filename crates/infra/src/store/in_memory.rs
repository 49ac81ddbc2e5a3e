//! In-memory credential store.
//!
//! Intended for tests/dev. All mutation happens under one write lock, which
//! is what makes lookup+update pairs (session rotation, the role-deletion
//! guard) atomic here.

use std::collections::HashMap;
use std::sync::RwLock;

use chrono::{DateTime, Utc};

use sentra_core::{OneTimeTokenId, PermissionId, RoleId, SessionId, UserId};

use super::contract::{CredentialStore, StoreError};
use super::records::{
    NewOneTimeToken, NewSession, NewUser, OneTimeTokenKind, OneTimeTokenRecord, PermissionRecord,
    RoleRecord, SessionRecord, UserRecord, UserUpdate,
};

#[derive(Debug, Default)]
struct Inner {
    users: HashMap<UserId, UserRecord>,
    roles: HashMap<RoleId, RoleRecord>,
    permissions: HashMap<PermissionId, PermissionRecord>,
    /// Role ids per user, in assignment order (head = primary role).
    user_roles: HashMap<UserId, Vec<RoleId>>,
    role_permissions: HashMap<RoleId, Vec<PermissionId>>,
    sessions: HashMap<SessionId, SessionRecord>,
    one_time_tokens: HashMap<OneTimeTokenId, OneTimeTokenRecord>,
    resource_owners: HashMap<(String, String), UserId>,
}

/// In-memory, lock-serialized credential store.
#[derive(Debug, Default)]
pub struct InMemoryCredentialStore {
    inner: RwLock<Inner>,
}

impl InMemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<std::sync::RwLockReadGuard<'_, Inner>, StoreError> {
        self.inner
            .read()
            .map_err(|_| StoreError::Internal("lock poisoned".to_string()))
    }

    fn write(&self) -> Result<std::sync::RwLockWriteGuard<'_, Inner>, StoreError> {
        self.inner
            .write()
            .map_err(|_| StoreError::Internal("lock poisoned".to_string()))
    }

    /// Register an application resource's owner so ownership guards can be
    /// exercised against this store.
    pub fn put_resource_owner(
        &self,
        resource: impl Into<String>,
        resource_id: impl Into<String>,
        owner: UserId,
    ) {
        if let Ok(mut inner) = self.inner.write() {
            inner
                .resource_owners
                .insert((resource.into(), resource_id.into()), owner);
        }
    }
}

#[async_trait::async_trait]
impl CredentialStore for InMemoryCredentialStore {
    async fn create_user(&self, user: NewUser) -> Result<UserRecord, StoreError> {
        let mut inner = self.write()?;

        if inner.users.values().any(|u| u.email == user.email) {
            return Err(StoreError::Conflict(format!(
                "email '{}' is already registered",
                user.email
            )));
        }
        if inner.users.values().any(|u| u.username == user.username) {
            return Err(StoreError::Conflict(format!(
                "username '{}' is already taken",
                user.username
            )));
        }

        let now = Utc::now();
        let record = UserRecord {
            id: UserId::new(),
            email: user.email,
            username: user.username,
            password_hash: user.password_hash,
            first_name: user.first_name,
            last_name: user.last_name,
            is_active: true,
            is_verified: false,
            last_login: None,
            created_at: now,
            updated_at: now,
        };

        inner.users.insert(record.id, record.clone());
        Ok(record)
    }

    async fn find_user_by_id(&self, id: UserId) -> Result<Option<UserRecord>, StoreError> {
        Ok(self.read()?.users.get(&id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<UserRecord>, StoreError> {
        Ok(self
            .read()?
            .users
            .values()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn find_user_by_username(
        &self,
        username: &str,
    ) -> Result<Option<UserRecord>, StoreError> {
        Ok(self
            .read()?
            .users
            .values()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn update_user(
        &self,
        id: UserId,
        update: UserUpdate,
    ) -> Result<UserRecord, StoreError> {
        let mut inner = self.write()?;

        if let Some(username) = &update.username {
            if inner
                .users
                .values()
                .any(|u| u.id != id && &u.username == username)
            {
                return Err(StoreError::Conflict(format!(
                    "username '{username}' is already taken"
                )));
            }
        }

        let user = inner.users.get_mut(&id).ok_or(StoreError::NotFound)?;

        if let Some(username) = update.username {
            user.username = username;
        }
        if let Some(first_name) = update.first_name {
            user.first_name = Some(first_name);
        }
        if let Some(last_name) = update.last_name {
            user.last_name = Some(last_name);
        }
        if let Some(password_hash) = update.password_hash {
            user.password_hash = password_hash;
        }
        if let Some(is_active) = update.is_active {
            user.is_active = is_active;
        }
        if let Some(is_verified) = update.is_verified {
            user.is_verified = is_verified;
        }
        if let Some(last_login) = update.last_login {
            user.last_login = Some(last_login);
        }
        user.updated_at = Utc::now();

        Ok(user.clone())
    }

    async fn delete_user(&self, id: UserId) -> Result<(), StoreError> {
        let mut inner = self.write()?;

        if inner.users.remove(&id).is_none() {
            return Err(StoreError::NotFound);
        }

        // Cascade: role assignments, sessions, one-time tokens.
        inner.user_roles.remove(&id);
        inner.sessions.retain(|_, s| s.user_id != id);
        inner.one_time_tokens.retain(|_, t| t.user_id != id);

        Ok(())
    }

    async fn list_users(&self, offset: u64, limit: u64) -> Result<Vec<UserRecord>, StoreError> {
        let inner = self.read()?;
        let mut users: Vec<UserRecord> = inner.users.values().cloned().collect();
        users.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.as_uuid().cmp(b.id.as_uuid())));

        Ok(users
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .collect())
    }

    async fn count_users(&self) -> Result<u64, StoreError> {
        Ok(self.read()?.users.len() as u64)
    }

    async fn create_role(
        &self,
        name: &str,
        description: Option<&str>,
    ) -> Result<RoleRecord, StoreError> {
        let mut inner = self.write()?;

        if inner.roles.values().any(|r| r.name == name) {
            return Err(StoreError::Conflict(format!(
                "role '{name}' already exists"
            )));
        }

        let now = Utc::now();
        let record = RoleRecord {
            id: RoleId::new(),
            name: name.to_string(),
            description: description.map(str::to_string),
            created_at: now,
            updated_at: now,
        };

        inner.roles.insert(record.id, record.clone());
        Ok(record)
    }

    async fn find_role_by_id(&self, id: RoleId) -> Result<Option<RoleRecord>, StoreError> {
        Ok(self.read()?.roles.get(&id).cloned())
    }

    async fn find_role_by_name(&self, name: &str) -> Result<Option<RoleRecord>, StoreError> {
        Ok(self
            .read()?
            .roles
            .values()
            .find(|r| r.name == name)
            .cloned())
    }

    async fn list_roles(&self) -> Result<Vec<RoleRecord>, StoreError> {
        let inner = self.read()?;
        let mut roles: Vec<RoleRecord> = inner.roles.values().cloned().collect();
        roles.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.as_uuid().cmp(b.id.as_uuid())));
        Ok(roles)
    }

    async fn update_role(
        &self,
        id: RoleId,
        name: Option<&str>,
        description: Option<&str>,
    ) -> Result<RoleRecord, StoreError> {
        let mut inner = self.write()?;

        if let Some(name) = name {
            if inner.roles.values().any(|r| r.id != id && r.name == name) {
                return Err(StoreError::Conflict(format!(
                    "role '{name}' already exists"
                )));
            }
        }

        let role = inner.roles.get_mut(&id).ok_or(StoreError::NotFound)?;
        if let Some(name) = name {
            role.name = name.to_string();
        }
        if let Some(description) = description {
            role.description = Some(description.to_string());
        }
        role.updated_at = Utc::now();

        Ok(role.clone())
    }

    async fn delete_role(&self, id: RoleId) -> Result<(), StoreError> {
        let mut inner = self.write()?;

        if !inner.roles.contains_key(&id) {
            return Err(StoreError::NotFound);
        }

        // Referential integrity guard, atomic with the delete.
        if inner.user_roles.values().any(|roles| roles.contains(&id)) {
            return Err(StoreError::Conflict(
                "role has assigned users".to_string(),
            ));
        }

        inner.roles.remove(&id);
        inner.role_permissions.remove(&id);
        Ok(())
    }

    async fn count_role_users(&self, id: RoleId) -> Result<u64, StoreError> {
        let inner = self.read()?;
        Ok(inner
            .user_roles
            .values()
            .filter(|roles| roles.contains(&id))
            .count() as u64)
    }

    async fn replace_role_permissions(
        &self,
        id: RoleId,
        permission_ids: &[PermissionId],
    ) -> Result<(), StoreError> {
        let mut inner = self.write()?;

        if !inner.roles.contains_key(&id) {
            return Err(StoreError::NotFound);
        }
        if permission_ids
            .iter()
            .any(|pid| !inner.permissions.contains_key(pid))
        {
            return Err(StoreError::NotFound);
        }

        inner.role_permissions.insert(id, permission_ids.to_vec());
        Ok(())
    }

    async fn role_permissions(&self, id: RoleId) -> Result<Vec<PermissionRecord>, StoreError> {
        let inner = self.read()?;

        if !inner.roles.contains_key(&id) {
            return Err(StoreError::NotFound);
        }

        let ids = inner.role_permissions.get(&id).cloned().unwrap_or_default();
        Ok(ids
            .iter()
            .filter_map(|pid| inner.permissions.get(pid).cloned())
            .collect())
    }

    async fn assign_role(&self, user_id: UserId, role_id: RoleId) -> Result<(), StoreError> {
        let mut inner = self.write()?;

        if !inner.users.contains_key(&user_id) || !inner.roles.contains_key(&role_id) {
            return Err(StoreError::NotFound);
        }

        let assignments = inner.user_roles.entry(user_id).or_default();
        if assignments.contains(&role_id) {
            return Err(StoreError::Conflict(
                "user already has this role".to_string(),
            ));
        }

        assignments.push(role_id);
        Ok(())
    }

    async fn remove_role(&self, user_id: UserId, role_id: RoleId) -> Result<(), StoreError> {
        let mut inner = self.write()?;

        let assignments = inner.user_roles.get_mut(&user_id).ok_or(StoreError::NotFound)?;
        let before = assignments.len();
        assignments.retain(|r| *r != role_id);

        if assignments.len() == before {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn user_roles(&self, user_id: UserId) -> Result<Vec<RoleRecord>, StoreError> {
        let inner = self.read()?;
        let ids = inner.user_roles.get(&user_id).cloned().unwrap_or_default();
        Ok(ids
            .iter()
            .filter_map(|rid| inner.roles.get(rid).cloned())
            .collect())
    }

    async fn upsert_permission(
        &self,
        resource: &str,
        action: &str,
        description: Option<&str>,
    ) -> Result<PermissionRecord, StoreError> {
        let mut inner = self.write()?;
        let name = format!("{resource}.{action}");

        if let Some(existing) = inner.permissions.values().find(|p| p.name == name) {
            return Ok(existing.clone());
        }

        let record = PermissionRecord {
            id: PermissionId::new(),
            name,
            description: description.map(str::to_string),
            resource: resource.to_string(),
            action: action.to_string(),
            created_at: Utc::now(),
        };

        inner.permissions.insert(record.id, record.clone());
        Ok(record)
    }

    async fn list_permissions(&self) -> Result<Vec<PermissionRecord>, StoreError> {
        let inner = self.read()?;
        let mut permissions: Vec<PermissionRecord> = inner.permissions.values().cloned().collect();
        permissions.sort_by(|a, b| {
            a.resource
                .cmp(&b.resource)
                .then_with(|| a.action.cmp(&b.action))
        });
        Ok(permissions)
    }

    async fn find_permissions_by_ids(
        &self,
        ids: &[PermissionId],
    ) -> Result<Vec<PermissionRecord>, StoreError> {
        let inner = self.read()?;
        Ok(ids
            .iter()
            .filter_map(|id| inner.permissions.get(id).cloned())
            .collect())
    }

    async fn create_session(&self, session: NewSession) -> Result<SessionRecord, StoreError> {
        let mut inner = self.write()?;

        // Token values are 256-bit random; a collision means a broken RNG,
        // not a retryable condition.
        if inner.sessions.values().any(|s| s.token == session.token) {
            return Err(StoreError::Internal(
                "refresh token value collision".to_string(),
            ));
        }

        let now = Utc::now();
        let record = SessionRecord {
            id: SessionId::new(),
            user_id: session.user_id,
            token: session.token,
            expires_at: session.expires_at,
            is_active: true,
            user_agent: session.origin.user_agent,
            ip_address: session.origin.ip_address,
            created_at: now,
            updated_at: now,
        };

        inner.sessions.insert(record.id, record.clone());
        Ok(record)
    }

    async fn find_active_session(
        &self,
        token: &str,
        user_id: UserId,
        now: DateTime<Utc>,
    ) -> Result<Option<SessionRecord>, StoreError> {
        Ok(self
            .read()?
            .sessions
            .values()
            .find(|s| {
                s.token == token && s.user_id == user_id && s.is_active && s.expires_at > now
            })
            .cloned())
    }

    async fn find_session_by_id(
        &self,
        id: SessionId,
    ) -> Result<Option<SessionRecord>, StoreError> {
        Ok(self.read()?.sessions.get(&id).cloned())
    }

    async fn rotate_session(
        &self,
        id: SessionId,
        new_token: &str,
        new_expires_at: DateTime<Utc>,
    ) -> Result<SessionRecord, StoreError> {
        let mut inner = self.write()?;

        if inner
            .sessions
            .values()
            .any(|s| s.id != id && s.token == new_token)
        {
            return Err(StoreError::Internal(
                "refresh token value collision".to_string(),
            ));
        }

        let session = inner.sessions.get_mut(&id).ok_or(StoreError::NotFound)?;
        // REVOKED is terminal; a rotation racing a revocation loses.
        if !session.is_active {
            return Err(StoreError::NotFound);
        }

        session.token = new_token.to_string();
        session.expires_at = new_expires_at;
        session.updated_at = Utc::now();

        Ok(session.clone())
    }

    async fn deactivate_session(&self, id: SessionId) -> Result<(), StoreError> {
        let mut inner = self.write()?;
        let session = inner.sessions.get_mut(&id).ok_or(StoreError::NotFound)?;
        session.is_active = false;
        session.updated_at = Utc::now();
        Ok(())
    }

    async fn deactivate_user_sessions(&self, user_id: UserId) -> Result<u64, StoreError> {
        let mut inner = self.write()?;
        let now = Utc::now();
        let mut changed = 0;

        for session in inner.sessions.values_mut() {
            if session.user_id == user_id && session.is_active {
                session.is_active = false;
                session.updated_at = now;
                changed += 1;
            }
        }

        Ok(changed)
    }

    async fn list_active_sessions(
        &self,
        user_id: UserId,
        now: DateTime<Utc>,
    ) -> Result<Vec<SessionRecord>, StoreError> {
        let inner = self.read()?;
        let mut sessions: Vec<SessionRecord> = inner
            .sessions
            .values()
            .filter(|s| s.user_id == user_id && s.is_active && s.expires_at > now)
            .cloned()
            .collect();
        sessions.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(sessions)
    }

    async fn create_one_time_token(
        &self,
        token: NewOneTimeToken,
    ) -> Result<OneTimeTokenRecord, StoreError> {
        let mut inner = self.write()?;

        if inner.one_time_tokens.values().any(|t| t.token == token.token) {
            return Err(StoreError::Internal(
                "one-time token value collision".to_string(),
            ));
        }

        let record = OneTimeTokenRecord {
            id: OneTimeTokenId::new(),
            user_id: token.user_id,
            token: token.token,
            kind: token.kind,
            is_used: false,
            expires_at: token.expires_at,
            created_at: Utc::now(),
        };

        inner.one_time_tokens.insert(record.id, record.clone());
        Ok(record)
    }

    async fn find_valid_one_time_token(
        &self,
        value: &str,
        kind: OneTimeTokenKind,
        now: DateTime<Utc>,
    ) -> Result<Option<OneTimeTokenRecord>, StoreError> {
        Ok(self
            .read()?
            .one_time_tokens
            .values()
            .find(|t| t.token == value && t.kind == kind && !t.is_used && t.expires_at > now)
            .cloned())
    }

    async fn mark_token_used(&self, id: OneTimeTokenId) -> Result<(), StoreError> {
        let mut inner = self.write()?;
        let token = inner.one_time_tokens.get_mut(&id).ok_or(StoreError::NotFound)?;
        token.is_used = true;
        Ok(())
    }

    async fn find_resource_owner(
        &self,
        resource: &str,
        resource_id: &str,
    ) -> Result<Option<UserId>, StoreError> {
        Ok(self
            .read()?
            .resource_owners
            .get(&(resource.to_string(), resource_id.to_string()))
            .copied())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn new_user(email: &str, username: &str) -> NewUser {
        NewUser {
            email: email.to_string(),
            username: username.to_string(),
            password_hash: "hash".to_string(),
            first_name: None,
            last_name: None,
        }
    }

    fn new_session(user_id: UserId, token: &str, ttl: Duration) -> NewSession {
        NewSession {
            user_id,
            token: token.to_string(),
            expires_at: Utc::now() + ttl,
            origin: Default::default(),
        }
    }

    #[tokio::test]
    async fn duplicate_email_and_username_conflict() {
        let store = InMemoryCredentialStore::new();
        store.create_user(new_user("a@example.com", "a")).await.unwrap();

        let err = store
            .create_user(new_user("a@example.com", "b"))
            .await
            .expect_err("duplicate email");
        assert!(matches!(err, StoreError::Conflict(_)));

        let err = store
            .create_user(new_user("b@example.com", "a"))
            .await
            .expect_err("duplicate username");
        assert!(matches!(err, StoreError::Conflict(_)));
    }

    #[tokio::test]
    async fn delete_user_cascades_assignments_and_sessions() {
        let store = InMemoryCredentialStore::new();
        let user = store.create_user(new_user("a@example.com", "a")).await.unwrap();
        let role = store.create_role("user", None).await.unwrap();
        store.assign_role(user.id, role.id).await.unwrap();
        store
            .create_session(new_session(user.id, "tok-1", Duration::days(1)))
            .await
            .unwrap();

        store.delete_user(user.id).await.unwrap();

        assert!(store.find_user_by_id(user.id).await.unwrap().is_none());
        assert!(store.user_roles(user.id).await.unwrap().is_empty());
        assert!(store
            .find_active_session("tok-1", user.id, Utc::now())
            .await
            .unwrap()
            .is_none());
        // The role itself survives and is now deletable.
        assert_eq!(store.count_role_users(role.id).await.unwrap(), 0);
        store.delete_role(role.id).await.unwrap();
    }

    #[tokio::test]
    async fn delete_role_rejected_while_assigned() {
        let store = InMemoryCredentialStore::new();
        let user = store.create_user(new_user("a@example.com", "a")).await.unwrap();
        let role = store.create_role("editor", None).await.unwrap();
        store.assign_role(user.id, role.id).await.unwrap();

        let err = store.delete_role(role.id).await.expect_err("guarded");
        assert!(matches!(err, StoreError::Conflict(_)));

        store.remove_role(user.id, role.id).await.unwrap();
        store.delete_role(role.id).await.unwrap();
    }

    #[tokio::test]
    async fn assignment_order_is_preserved() {
        let store = InMemoryCredentialStore::new();
        let user = store.create_user(new_user("a@example.com", "a")).await.unwrap();
        let admin = store.create_role("admin", None).await.unwrap();
        let viewer = store.create_role("viewer", None).await.unwrap();

        store.assign_role(user.id, admin.id).await.unwrap();
        store.assign_role(user.id, viewer.id).await.unwrap();

        let roles = store.user_roles(user.id).await.unwrap();
        let names: Vec<&str> = roles.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["admin", "viewer"]);
    }

    #[tokio::test]
    async fn permission_upsert_is_idempotent() {
        let store = InMemoryCredentialStore::new();
        let first = store
            .upsert_permission("users", "read", Some("Read user information"))
            .await
            .unwrap();
        let second = store.upsert_permission("users", "read", None).await.unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(store.list_permissions().await.unwrap().len(), 1);
        assert_eq!(first.name, "users.read");
    }

    #[tokio::test]
    async fn rotation_moves_the_token_value() {
        let store = InMemoryCredentialStore::new();
        let user = store.create_user(new_user("a@example.com", "a")).await.unwrap();
        let session = store
            .create_session(new_session(user.id, "tok-1", Duration::days(30)))
            .await
            .unwrap();

        store
            .rotate_session(session.id, "tok-2", Utc::now() + Duration::days(30))
            .await
            .unwrap();

        let now = Utc::now();
        assert!(store.find_active_session("tok-1", user.id, now).await.unwrap().is_none());
        let rotated = store
            .find_active_session("tok-2", user.id, now)
            .await
            .unwrap()
            .expect("rotated session");
        assert_eq!(rotated.id, session.id);
    }

    #[tokio::test]
    async fn rotation_of_revoked_session_fails() {
        let store = InMemoryCredentialStore::new();
        let user = store.create_user(new_user("a@example.com", "a")).await.unwrap();
        let session = store
            .create_session(new_session(user.id, "tok-1", Duration::days(30)))
            .await
            .unwrap();

        store.deactivate_session(session.id).await.unwrap();

        let err = store
            .rotate_session(session.id, "tok-2", Utc::now() + Duration::days(30))
            .await
            .expect_err("terminal session");
        assert_eq!(err, StoreError::NotFound);
    }

    #[tokio::test]
    async fn expired_sessions_are_invisible_to_active_lookups() {
        let store = InMemoryCredentialStore::new();
        let user = store.create_user(new_user("a@example.com", "a")).await.unwrap();
        store
            .create_session(new_session(user.id, "tok-1", Duration::seconds(-1)))
            .await
            .unwrap();

        let now = Utc::now();
        assert!(store.find_active_session("tok-1", user.id, now).await.unwrap().is_none());
        assert!(store.list_active_sessions(user.id, now).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn session_token_collision_is_fatal() {
        let store = InMemoryCredentialStore::new();
        let user = store.create_user(new_user("a@example.com", "a")).await.unwrap();
        store
            .create_session(new_session(user.id, "tok-1", Duration::days(1)))
            .await
            .unwrap();

        let err = store
            .create_session(new_session(user.id, "tok-1", Duration::days(1)))
            .await
            .expect_err("collision");
        assert!(matches!(err, StoreError::Internal(_)));
    }

    #[tokio::test]
    async fn one_time_token_lifecycle() {
        let store = InMemoryCredentialStore::new();
        let user = store.create_user(new_user("a@example.com", "a")).await.unwrap();
        let record = store
            .create_one_time_token(NewOneTimeToken {
                user_id: user.id,
                token: "reset-1".to_string(),
                kind: OneTimeTokenKind::PasswordReset,
                expires_at: Utc::now() + Duration::hours(1),
            })
            .await
            .unwrap();

        let now = Utc::now();
        // Wrong kind misses.
        assert!(store
            .find_valid_one_time_token("reset-1", OneTimeTokenKind::EmailVerification, now)
            .await
            .unwrap()
            .is_none());

        assert!(store
            .find_valid_one_time_token("reset-1", OneTimeTokenKind::PasswordReset, now)
            .await
            .unwrap()
            .is_some());

        store.mark_token_used(record.id).await.unwrap();
        assert!(store
            .find_valid_one_time_token("reset-1", OneTimeTokenKind::PasswordReset, now)
            .await
            .unwrap()
            .is_none());
    }
}
