//! Refresh-backed session lifecycle.
//!
//! Per session the state machine is `ACTIVE → ACTIVE (rotated)` or
//! `ACTIVE → REVOKED`, and REVOKED is terminal. Expiry is enforced at every
//! lookup, so physically deleting expired rows is housekeeping, not a
//! correctness requirement.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tracing::debug;

use sentra_core::{AuthError, AuthResult, SessionId, UserId};

use crate::store::{CredentialStore, NewSession, SessionOrigin, SessionRecord};

/// Owns session creation, rotation, revocation, and listing.
#[derive(Clone)]
pub struct SessionManager {
    store: Arc<dyn CredentialStore>,
}

impl SessionManager {
    pub fn new(store: Arc<dyn CredentialStore>) -> Self {
        Self { store }
    }

    /// Insert a fresh ACTIVE session for `user_id` with the given lifetime.
    pub async fn create_session(
        &self,
        user_id: UserId,
        refresh_token: &str,
        ttl: Duration,
        origin: SessionOrigin,
    ) -> AuthResult<SessionRecord> {
        let session = self
            .store
            .create_session(NewSession {
                user_id,
                token: refresh_token.to_string(),
                expires_at: Utc::now() + ttl,
                origin,
            })
            .await?;

        debug!(user = %user_id, session = %session.id, "session created");
        Ok(session)
    }

    /// The backing session iff it is active and unexpired.
    ///
    /// Callers must treat `None` uniformly, whether the token was never
    /// issued, already rotated away, revoked, or expired; the distinction
    /// is never surfaced to a client.
    pub async fn find_active_session(
        &self,
        refresh_token: &str,
        user_id: UserId,
    ) -> AuthResult<Option<SessionRecord>> {
        Ok(self
            .store
            .find_active_session(refresh_token, user_id, Utc::now())
            .await?)
    }

    /// Swap the session's token value and expiry in place.
    ///
    /// The session id stays stable across refreshes; the superseded token
    /// value immediately stops matching [`Self::find_active_session`], which
    /// is what turns a replayed old token into a plain denial.
    pub async fn rotate_session(
        &self,
        session_id: SessionId,
        new_refresh_token: &str,
        new_expires_at: DateTime<Utc>,
    ) -> AuthResult<SessionRecord> {
        let rotated = self
            .store
            .rotate_session(session_id, new_refresh_token, new_expires_at)
            .await?;

        debug!(session = %session_id, "session rotated");
        Ok(rotated)
    }

    /// Revoke a single session (terminal).
    pub async fn revoke(&self, session_id: SessionId) -> AuthResult<()> {
        self.store.deactivate_session(session_id).await?;
        debug!(session = %session_id, "session revoked");
        Ok(())
    }

    /// Revoke a single session, but only if `user_id` owns it.
    ///
    /// A foreign or unknown session id yields the same `NotFound`, so a
    /// caller cannot probe for other principals' session ids.
    pub async fn revoke_owned(&self, user_id: UserId, session_id: SessionId) -> AuthResult<()> {
        match self.store.find_session_by_id(session_id).await? {
            Some(session) if session.user_id == user_id => self.revoke(session_id).await,
            _ => Err(AuthError::not_found("session not found")),
        }
    }

    /// Revoke every session of a principal. This is the single path by which
    /// password change/reset logs out all devices.
    pub async fn revoke_all(&self, user_id: UserId) -> AuthResult<u64> {
        let revoked = self.store.deactivate_user_sessions(user_id).await?;
        debug!(user = %user_id, count = revoked, "all sessions revoked");
        Ok(revoked)
    }

    /// Active, unexpired sessions, newest first.
    pub async fn list_active(&self, user_id: UserId) -> AuthResult<Vec<SessionRecord>> {
        Ok(self.store.list_active_sessions(user_id, Utc::now()).await?)
    }
}
