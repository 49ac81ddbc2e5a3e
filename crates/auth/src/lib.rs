//! `sentra-auth` — pure authentication/authorization boundary.
//!
//! This crate is intentionally decoupled from HTTP and storage: token
//! signing/verification, credential hashing, and authorization predicates are
//! pure functions of configuration + input. Anything that needs a store lives
//! in `sentra-infra`.

pub mod claims;
pub mod codec;
pub mod context;
pub mod guard;
pub mod password;
pub mod permissions;
pub mod roles;

pub use claims::{AccessClaims, RefreshClaims, TokenKind, REFRESH_TOKEN_TYPE};
pub use codec::{random_opaque_token, TokenCodec, TokenError, DEFAULT_OPAQUE_TOKEN_BYTES};
pub use context::AuthContext;
pub use guard::{
    require_all_permissions, require_any_permission, require_role, require_self_or_role,
    AuthzDenied, DenyReason,
};
pub use password::{CredentialHasher, PasswordError};
pub use permissions::PermissionName;
pub use roles::{RoleName, ADMIN_ROLE, DEFAULT_ROLE};
