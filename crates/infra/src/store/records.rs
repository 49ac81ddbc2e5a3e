//! Persisted record shapes and write inputs for the credential store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use sentra_core::{OneTimeTokenId, PermissionId, RoleId, SessionId, UserId};

/// A stored user (principal) row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: UserId,
    pub email: String,
    pub username: String,
    /// Argon2id PHC string. Never serialized out of the service layer.
    pub password_hash: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub is_active: bool,
    pub is_verified: bool,
    pub last_login: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a user. The password arrives already hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub username: String,
    pub password_hash: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

/// Partial user update; `None` leaves the field unchanged.
#[derive(Debug, Clone, Default)]
pub struct UserUpdate {
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub password_hash: Option<String>,
    pub is_active: Option<bool>,
    pub is_verified: Option<bool>,
    pub last_login: Option<DateTime<Utc>>,
}

/// A stored role row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleRecord {
    pub id: RoleId,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A stored permission row: a (resource, action) pair with its derived
/// unique name (`resource.action`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionRecord {
    pub id: PermissionId,
    pub name: String,
    pub description: Option<String>,
    pub resource: String,
    pub action: String,
    pub created_at: DateTime<Utc>,
}

/// Best-effort request origin captured at session creation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionOrigin {
    pub user_agent: Option<String>,
    pub ip_address: Option<String>,
}

/// A stored session row: one refresh-token lineage.
///
/// Rotation updates `token` and `expires_at` in place, so `id` is stable for
/// the session's whole life. `is_active == false` is terminal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub id: SessionId,
    pub user_id: UserId,
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub is_active: bool,
    pub user_agent: Option<String>,
    pub ip_address: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a session.
#[derive(Debug, Clone)]
pub struct NewSession {
    pub user_id: UserId,
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub origin: SessionOrigin,
}

/// Purpose of a one-time token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OneTimeTokenKind {
    PasswordReset,
    EmailVerification,
}

impl OneTimeTokenKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            OneTimeTokenKind::PasswordReset => "PASSWORD_RESET",
            OneTimeTokenKind::EmailVerification => "EMAIL_VERIFICATION",
        }
    }
}

impl core::fmt::Display for OneTimeTokenKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A stored one-time token row. `is_used` flips once and never back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OneTimeTokenRecord {
    pub id: OneTimeTokenId,
    pub user_id: UserId,
    pub token: String,
    pub kind: OneTimeTokenKind,
    pub is_used: bool,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

/// Input for creating a one-time token.
#[derive(Debug, Clone)]
pub struct NewOneTimeToken {
    pub user_id: UserId,
    pub token: String,
    pub kind: OneTimeTokenKind,
    pub expires_at: DateTime<Utc>,
}
