use serde::{Deserialize, Serialize};

use sentra_core::UserId;

use crate::{PermissionName, RoleName};

/// Claim value identifying refresh tokens (`typ` claim).
pub const REFRESH_TOKEN_TYPE: &str = "refresh";

/// Which of the two token kinds a codec operation targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Access,
    Refresh,
}

/// Claims carried by an access token.
///
/// Roles and permissions here are a snapshot taken at issuance, for bearer
/// convenience (e.g. rendering a badge). Server-side authorization decisions
/// never trust them; they re-read via the permission resolver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessClaims {
    /// Subject: the principal's user id.
    pub sub: UserId,
    pub email: String,
    pub username: String,
    pub roles: Vec<RoleName>,
    pub permissions: Vec<PermissionName>,
    pub iss: String,
    pub aud: String,
    /// Issued-at, seconds since the epoch.
    pub iat: i64,
    /// Expiry, seconds since the epoch.
    pub exp: i64,
}

/// Claims carried by a refresh token.
///
/// Deliberately minimal: the backing session row is the source of truth for
/// refresh validity, the token only names the principal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshClaims {
    pub sub: UserId,
    /// Always [`REFRESH_TOKEN_TYPE`]; verification rejects anything else.
    pub typ: String,
    pub iss: String,
    pub aud: String,
    pub iat: i64,
    pub exp: i64,
}
