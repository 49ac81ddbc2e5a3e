//! Domain error model.

use thiserror::Error;

/// Result type used across the service layer.
pub type AuthResult<T> = Result<T, AuthError>;

/// Service-level error.
///
/// Keep this focused on deterministic auth/account failures (credentials,
/// permissions, conflicts). Transport concerns belong elsewhere.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// The caller could not be authenticated (missing/invalid/expired token,
    /// unknown or deactivated account).
    #[error("{0}")]
    Authentication(String),

    /// Authenticated, but the requested action is not permitted.
    ///
    /// The message is intentionally generic; the concrete denial reason is
    /// logged, never echoed to the caller.
    #[error("insufficient permissions")]
    Authorization,

    /// A value failed validation (malformed input, wrong current password).
    #[error("{0}")]
    Validation(String),

    /// A requested record was not found.
    #[error("{0}")]
    NotFound(String),

    /// A unique field or assignment already exists.
    #[error("{0}")]
    Conflict(String),

    /// Unexpected internal failure (storage fault, hash failure).
    #[error("internal error: {0}")]
    Internal(String),
}

impl AuthError {
    pub fn authentication(msg: impl Into<String>) -> Self {
        Self::Authentication(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }
}
