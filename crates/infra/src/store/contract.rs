//! The query contract the auth services require from persistence.
//!
//! Implementations own all persisted state; services never cache mutable
//! copies beyond one operation. Lookup+update pairs used by session rotation
//! and the role-deletion guard must be atomic within an implementation.

use chrono::{DateTime, Utc};
use thiserror::Error;

use sentra_core::{AuthError, OneTimeTokenId, PermissionId, RoleId, SessionId, UserId};

use super::records::{
    NewOneTimeToken, NewSession, NewUser, OneTimeTokenKind, OneTimeTokenRecord, PermissionRecord,
    RoleRecord, SessionRecord, UserRecord, UserUpdate,
};

/// Credential store operation error.
///
/// Constraint violations surface as typed variants here and are mapped to
/// the nearest service-level error at the service boundary; raw storage
/// errors never reach a caller.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// A unique field or unique assignment already exists.
    #[error("{0}")]
    Conflict(String),

    /// The targeted record does not exist (or is in a terminal state for
    /// conditional updates).
    #[error("record not found")]
    NotFound,

    /// Unexpected storage fault (I/O, poisoned lock, impossible collision).
    #[error("storage failure: {0}")]
    Internal(String),
}

impl From<StoreError> for AuthError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict(msg) => AuthError::Conflict(msg),
            StoreError::NotFound => AuthError::not_found("record not found"),
            StoreError::Internal(msg) => AuthError::Internal(msg),
        }
    }
}

/// Query contract over users, roles, permissions, sessions, and one-time
/// tokens.
///
/// Every method is a potential suspension point (network/storage I/O).
#[async_trait::async_trait]
pub trait CredentialStore: Send + Sync {
    // ── Users ────────────────────────────────────────────────────────────

    /// Insert a user. Fails `Conflict` when the email or username is taken.
    async fn create_user(&self, user: NewUser) -> Result<UserRecord, StoreError>;

    async fn find_user_by_id(&self, id: UserId) -> Result<Option<UserRecord>, StoreError>;

    async fn find_user_by_email(&self, email: &str) -> Result<Option<UserRecord>, StoreError>;

    async fn find_user_by_username(&self, username: &str)
        -> Result<Option<UserRecord>, StoreError>;

    /// Apply a partial update. Fails `Conflict` when a unique field collides.
    async fn update_user(&self, id: UserId, update: UserUpdate)
        -> Result<UserRecord, StoreError>;

    /// Delete a user, cascading role assignments and sessions.
    async fn delete_user(&self, id: UserId) -> Result<(), StoreError>;

    /// Users ordered by creation time.
    async fn list_users(&self, offset: u64, limit: u64) -> Result<Vec<UserRecord>, StoreError>;

    async fn count_users(&self) -> Result<u64, StoreError>;

    // ── Roles & permissions ──────────────────────────────────────────────

    /// Insert a role. Fails `Conflict` on a duplicate name.
    async fn create_role(
        &self,
        name: &str,
        description: Option<&str>,
    ) -> Result<RoleRecord, StoreError>;

    async fn find_role_by_id(&self, id: RoleId) -> Result<Option<RoleRecord>, StoreError>;

    async fn find_role_by_name(&self, name: &str) -> Result<Option<RoleRecord>, StoreError>;

    /// Roles ordered by creation time.
    async fn list_roles(&self) -> Result<Vec<RoleRecord>, StoreError>;

    async fn update_role(
        &self,
        id: RoleId,
        name: Option<&str>,
        description: Option<&str>,
    ) -> Result<RoleRecord, StoreError>;

    /// Delete a role and its permission assignments. Fails `Conflict` while
    /// any user still holds the role, atomically with the assignment check;
    /// the service layer pre-checks via [`Self::count_role_users`] to surface
    /// a validation error instead.
    async fn delete_role(&self, id: RoleId) -> Result<(), StoreError>;

    async fn count_role_users(&self, id: RoleId) -> Result<u64, StoreError>;

    /// Replace the role's permission set wholesale (no diffing).
    async fn replace_role_permissions(
        &self,
        id: RoleId,
        permission_ids: &[PermissionId],
    ) -> Result<(), StoreError>;

    async fn role_permissions(&self, id: RoleId) -> Result<Vec<PermissionRecord>, StoreError>;

    /// Assign a role to a user. Duplicate assignment fails `Conflict`.
    async fn assign_role(&self, user_id: UserId, role_id: RoleId) -> Result<(), StoreError>;

    /// Remove an assignment. Fails `NotFound` when it does not exist.
    async fn remove_role(&self, user_id: UserId, role_id: RoleId) -> Result<(), StoreError>;

    /// A user's roles in assignment order (head = primary role).
    async fn user_roles(&self, user_id: UserId) -> Result<Vec<RoleRecord>, StoreError>;

    /// Create-or-return a permission, keyed by its derived unique name.
    async fn upsert_permission(
        &self,
        resource: &str,
        action: &str,
        description: Option<&str>,
    ) -> Result<PermissionRecord, StoreError>;

    /// Permissions ordered by (resource, action).
    async fn list_permissions(&self) -> Result<Vec<PermissionRecord>, StoreError>;

    async fn find_permissions_by_ids(
        &self,
        ids: &[PermissionId],
    ) -> Result<Vec<PermissionRecord>, StoreError>;

    // ── Sessions ─────────────────────────────────────────────────────────

    /// Insert an active session. A token-value collision is `Internal`
    /// (cryptographically random values colliding means something is wrong,
    /// not something to retry).
    async fn create_session(&self, session: NewSession) -> Result<SessionRecord, StoreError>;

    /// The session for `token` iff it belongs to `user_id`, is active, and
    /// `expires_at > now`. Absent, revoked, and expired are all `None`.
    async fn find_active_session(
        &self,
        token: &str,
        user_id: UserId,
        now: DateTime<Utc>,
    ) -> Result<Option<SessionRecord>, StoreError>;

    async fn find_session_by_id(&self, id: SessionId)
        -> Result<Option<SessionRecord>, StoreError>;

    /// Conditionally update token value + expiry of an *active* session.
    /// Fails `NotFound` for missing or already-revoked sessions. This is the
    /// serialization point that makes concurrent refreshes of the same token
    /// single-winner.
    async fn rotate_session(
        &self,
        id: SessionId,
        new_token: &str,
        new_expires_at: DateTime<Utc>,
    ) -> Result<SessionRecord, StoreError>;

    /// Mark one session inactive (terminal).
    async fn deactivate_session(&self, id: SessionId) -> Result<(), StoreError>;

    /// Mark all of a user's sessions inactive; returns how many changed.
    async fn deactivate_user_sessions(&self, user_id: UserId) -> Result<u64, StoreError>;

    /// Active, unexpired sessions for a user, newest first.
    async fn list_active_sessions(
        &self,
        user_id: UserId,
        now: DateTime<Utc>,
    ) -> Result<Vec<SessionRecord>, StoreError>;

    // ── One-time tokens ──────────────────────────────────────────────────

    async fn create_one_time_token(
        &self,
        token: NewOneTimeToken,
    ) -> Result<OneTimeTokenRecord, StoreError>;

    /// The token record iff value+kind match, it is unused, and unexpired.
    async fn find_valid_one_time_token(
        &self,
        value: &str,
        kind: OneTimeTokenKind,
        now: DateTime<Utc>,
    ) -> Result<Option<OneTimeTokenRecord>, StoreError>;

    /// Flip `is_used`; irreversible.
    async fn mark_token_used(&self, id: OneTimeTokenId) -> Result<(), StoreError>;

    // ── Resource ownership ───────────────────────────────────────────────

    /// Owner of an arbitrary application resource, for ownership guards.
    /// `None` when the resource does not exist.
    async fn find_resource_owner(
        &self,
        resource: &str,
        resource_id: &str,
    ) -> Result<Option<UserId>, StoreError>;
}
