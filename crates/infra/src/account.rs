//! Account flows: register, login, logout, refresh, and the password/email
//! one-time-token flows.
//!
//! All dependencies (store, codec, hasher, audit sink) arrive at
//! construction; nothing here reaches for process-wide state.

use std::sync::Arc;

use chrono::{Duration, Utc};
use serde::Serialize;
use tracing::debug;

use sentra_auth::{
    random_opaque_token, AuthContext, CredentialHasher, TokenCodec, TokenError,
    DEFAULT_OPAQUE_TOKEN_BYTES, DEFAULT_ROLE,
};
use sentra_core::{AuthError, AuthResult, SessionId, UserId};

use crate::audit::{AuditEvent, AuditSink};
use crate::resolver::PermissionResolver;
use crate::session::SessionManager;
use crate::store::{
    CredentialStore, NewOneTimeToken, NewUser, OneTimeTokenKind, SessionOrigin, UserRecord,
    UserUpdate,
};

/// One generic message for every login failure: unknown email, wrong
/// password, and deactivated account are indistinguishable to the caller.
const INVALID_CREDENTIALS: &str = "invalid email or password";

/// Session lifetime when the client did not ask to be remembered.
fn short_session_ttl() -> Duration {
    Duration::days(7)
}

fn reset_token_ttl() -> Duration {
    Duration::hours(1)
}

fn verification_token_ttl() -> Duration {
    Duration::hours(24)
}

/// Registration input. The password arrives in clear and is hashed here.
#[derive(Debug, Clone)]
pub struct RegisterInput {
    pub email: String,
    pub username: String,
    pub password: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

/// Login input.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub email: String,
    pub password: String,
    pub remember_me: bool,
}

/// What register/login/refresh hand back to the transport layer.
#[derive(Debug, Clone, Serialize)]
pub struct AuthPayload {
    pub user: AuthContext,
    pub token: String,
    pub refresh_token: String,
    /// Access-token lifetime in milliseconds.
    pub expires_in: i64,
}

/// Account lifecycle service.
#[derive(Clone)]
pub struct AccountService {
    store: Arc<dyn CredentialStore>,
    sessions: SessionManager,
    resolver: PermissionResolver,
    codec: Arc<TokenCodec>,
    hasher: Arc<CredentialHasher>,
    audit: Arc<dyn AuditSink>,
}

impl AccountService {
    pub fn new(
        store: Arc<dyn CredentialStore>,
        codec: Arc<TokenCodec>,
        hasher: Arc<CredentialHasher>,
        audit: Arc<dyn AuditSink>,
    ) -> Self {
        Self {
            sessions: SessionManager::new(store.clone()),
            resolver: PermissionResolver::new(store.clone()),
            store,
            codec,
            hasher,
            audit,
        }
    }

    pub fn sessions(&self) -> &SessionManager {
        &self.sessions
    }

    /// Create an account, assign the default role, and open a session.
    pub async fn register(
        &self,
        input: RegisterInput,
        origin: SessionOrigin,
    ) -> AuthResult<AuthPayload> {
        let email = normalize_email(&input.email);
        let username = input.username.trim().to_string();

        validate_email(&email)?;
        validate_username(&username)?;
        validate_password(&input.password)?;

        // Same conflict message for either unique field.
        if self.store.find_user_by_email(&email).await?.is_some()
            || self.store.find_user_by_username(&username).await?.is_some()
        {
            return Err(AuthError::conflict(
                "user with this email or username already exists",
            ));
        }

        let password_hash = self
            .hasher
            .hash(&input.password)
            .map_err(|e| AuthError::internal(e.to_string()))?;

        let user = self
            .store
            .create_user(NewUser {
                email,
                username,
                password_hash,
                first_name: input.first_name,
                last_name: input.last_name,
            })
            .await?;

        // Default role, when the deployment has one.
        if let Some(role) = self.store.find_role_by_name(DEFAULT_ROLE.as_str()).await? {
            self.store.assign_role(user.id, role.id).await?;
        }

        self.audit
            .record(AuditEvent::new(Some(user.id), "account.registered"));

        self.open_session(&user, self.codec.refresh_ttl(), origin).await
    }

    /// Authenticate with email + password and open a session.
    pub async fn login(
        &self,
        credentials: Credentials,
        origin: SessionOrigin,
    ) -> AuthResult<AuthPayload> {
        let email = normalize_email(&credentials.email);

        let user = self
            .store
            .find_user_by_email(&email)
            .await?
            .ok_or_else(|| AuthError::authentication(INVALID_CREDENTIALS))?;

        if !self.hasher.verify(&credentials.password, &user.password_hash) {
            return Err(AuthError::authentication(INVALID_CREDENTIALS));
        }

        if !user.is_active {
            return Err(AuthError::authentication(INVALID_CREDENTIALS));
        }

        let user = self
            .store
            .update_user(
                user.id,
                UserUpdate {
                    last_login: Some(Utc::now()),
                    ..Default::default()
                },
            )
            .await?;

        let ttl = if credentials.remember_me {
            self.codec.refresh_ttl()
        } else {
            short_session_ttl()
        };

        self.audit.record(AuditEvent::new(Some(user.id), "account.login"));

        self.open_session(&user, ttl, origin).await
    }

    /// Revoke one owned session, or every session when none is named.
    ///
    /// Any follow-up notification is a detached concern; local revocation is
    /// the whole operation and always completes when the store does.
    pub async fn logout(&self, user_id: UserId, session_id: Option<SessionId>) -> AuthResult<()> {
        match session_id {
            Some(id) => self.sessions.revoke_owned(user_id, id).await?,
            None => {
                self.sessions.revoke_all(user_id).await?;
            }
        }

        self.audit.record(AuditEvent::new(Some(user_id), "account.logout"));
        Ok(())
    }

    /// Exchange a refresh token for a new token pair, rotating the backing
    /// session in place.
    pub async fn refresh(&self, refresh_token: &str) -> AuthResult<AuthPayload> {
        let claims = self.codec.verify_refresh(refresh_token).map_err(|e| match e {
            TokenError::Expired => AuthError::authentication("refresh token has expired"),
            _ => AuthError::authentication("invalid refresh token"),
        })?;

        // Absent, rotated-away, revoked, and expired all land here.
        let session = self
            .sessions
            .find_active_session(refresh_token, claims.sub)
            .await?
            .ok_or_else(|| AuthError::authentication("invalid refresh token"))?;

        let user = match self.store.find_user_by_id(claims.sub).await? {
            Some(user) if user.is_active => user,
            _ => return Err(AuthError::authentication("user not found or inactive")),
        };

        let ctx = self.load_context(&user).await?;
        let token = self.issue_access(&ctx)?;
        let new_refresh = self.issue_refresh(user.id)?;

        // Two concurrent refreshes of the same token race here; the loser
        // sees the store's conditional update miss and is denied.
        self.sessions
            .rotate_session(session.id, &new_refresh, Utc::now() + self.codec.refresh_ttl())
            .await
            .map_err(|e| match e {
                AuthError::NotFound(_) => AuthError::authentication("invalid refresh token"),
                other => other,
            })?;

        Ok(AuthPayload {
            user: ctx,
            token,
            refresh_token: new_refresh,
            expires_in: self.codec.access_ttl().num_milliseconds(),
        })
    }

    /// Create a password-reset token for the account, if it exists.
    ///
    /// Returns `None` for an unknown email. Callers must respond identically
    /// either way; the `Some` value goes to the delivery side-channel only.
    pub async fn forgot_password(&self, email: &str) -> AuthResult<Option<String>> {
        let Some(user) = self.store.find_user_by_email(&normalize_email(email)).await? else {
            return Ok(None);
        };

        let value = random_opaque_token(DEFAULT_OPAQUE_TOKEN_BYTES);
        self.store
            .create_one_time_token(NewOneTimeToken {
                user_id: user.id,
                token: value.clone(),
                kind: OneTimeTokenKind::PasswordReset,
                expires_at: Utc::now() + reset_token_ttl(),
            })
            .await?;

        self.audit
            .record(AuditEvent::new(Some(user.id), "account.password_reset_requested"));

        Ok(Some(value))
    }

    /// Redeem a reset token: set the new password and log out everywhere.
    pub async fn reset_password(&self, token: &str, new_password: &str) -> AuthResult<()> {
        validate_password(new_password)?;

        let record = self
            .store
            .find_valid_one_time_token(token, OneTimeTokenKind::PasswordReset, Utc::now())
            .await?
            .ok_or_else(|| AuthError::validation("invalid or expired reset token"))?;

        let password_hash = self
            .hasher
            .hash(new_password)
            .map_err(|e| AuthError::internal(e.to_string()))?;

        self.store
            .update_user(
                record.user_id,
                UserUpdate {
                    password_hash: Some(password_hash),
                    ..Default::default()
                },
            )
            .await?;

        self.store.mark_token_used(record.id).await?;

        // Forced re-authentication everywhere.
        self.sessions.revoke_all(record.user_id).await?;

        self.audit
            .record(AuditEvent::new(Some(record.user_id), "account.password_reset"));

        Ok(())
    }

    /// Change the password of a logged-in account and log out everywhere.
    pub async fn change_password(
        &self,
        user_id: UserId,
        current_password: &str,
        new_password: &str,
    ) -> AuthResult<()> {
        let user = self
            .store
            .find_user_by_id(user_id)
            .await?
            .ok_or_else(|| AuthError::not_found("user not found"))?;

        if !self.hasher.verify(current_password, &user.password_hash) {
            return Err(AuthError::validation("current password is incorrect"));
        }

        validate_password(new_password)?;

        let password_hash = self
            .hasher
            .hash(new_password)
            .map_err(|e| AuthError::internal(e.to_string()))?;

        self.store
            .update_user(
                user_id,
                UserUpdate {
                    password_hash: Some(password_hash),
                    ..Default::default()
                },
            )
            .await?;

        // Every device, current one included.
        self.sessions.revoke_all(user_id).await?;

        self.audit
            .record(AuditEvent::new(Some(user_id), "account.password_changed"));

        Ok(())
    }

    /// Create an email-verification token for an unverified account.
    pub async fn request_email_verification(&self, user_id: UserId) -> AuthResult<String> {
        let user = self
            .store
            .find_user_by_id(user_id)
            .await?
            .ok_or_else(|| AuthError::not_found("user not found"))?;

        if user.is_verified {
            return Err(AuthError::validation("email is already verified"));
        }

        let value = random_opaque_token(DEFAULT_OPAQUE_TOKEN_BYTES);
        self.store
            .create_one_time_token(NewOneTimeToken {
                user_id: user.id,
                token: value.clone(),
                kind: OneTimeTokenKind::EmailVerification,
                expires_at: Utc::now() + verification_token_ttl(),
            })
            .await?;

        Ok(value)
    }

    /// Redeem an email-verification token.
    pub async fn verify_email(&self, token: &str) -> AuthResult<()> {
        let record = self
            .store
            .find_valid_one_time_token(token, OneTimeTokenKind::EmailVerification, Utc::now())
            .await?
            .ok_or_else(|| AuthError::validation("invalid or expired verification token"))?;

        self.store.mark_token_used(record.id).await?;
        self.store
            .update_user(
                record.user_id,
                UserUpdate {
                    is_verified: Some(true),
                    ..Default::default()
                },
            )
            .await?;

        self.audit
            .record(AuditEvent::new(Some(record.user_id), "account.email_verified"));

        Ok(())
    }

    /// Resolve the fresh authentication context for a stored user.
    pub async fn load_context(&self, user: &UserRecord) -> AuthResult<AuthContext> {
        let roles = self.resolver.effective_roles(user.id).await?;
        let mut permissions: Vec<_> = self
            .resolver
            .effective_permissions(user.id)
            .await?
            .into_iter()
            .collect();
        permissions.sort_by(|a, b| a.as_str().cmp(b.as_str()));

        Ok(AuthContext::new(
            user.id,
            &user.email,
            &user.username,
            roles,
            permissions,
            user.is_verified,
        ))
    }

    async fn open_session(
        &self,
        user: &UserRecord,
        session_ttl: Duration,
        origin: SessionOrigin,
    ) -> AuthResult<AuthPayload> {
        let ctx = self.load_context(user).await?;
        let token = self.issue_access(&ctx)?;
        let refresh_token = self.issue_refresh(user.id)?;

        self.sessions
            .create_session(user.id, &refresh_token, session_ttl, origin)
            .await?;

        debug!(user = %user.id, "session opened");

        Ok(AuthPayload {
            user: ctx,
            token,
            refresh_token,
            expires_in: self.codec.access_ttl().num_milliseconds(),
        })
    }

    fn issue_access(&self, ctx: &AuthContext) -> AuthResult<String> {
        self.codec
            .issue_access_token(ctx)
            .map_err(|e| AuthError::internal(format!("access token issuance failed: {e}")))
    }

    fn issue_refresh(&self, user_id: UserId) -> AuthResult<String> {
        self.codec
            .issue_refresh_token(user_id)
            .map_err(|e| AuthError::internal(format!("refresh token issuance failed: {e}")))
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn validate_email(email: &str) -> AuthResult<()> {
    if email.is_empty() || !email.contains('@') {
        return Err(AuthError::validation("invalid email format"));
    }
    Ok(())
}

fn validate_username(username: &str) -> AuthResult<()> {
    if username.is_empty() {
        return Err(AuthError::validation("username cannot be empty"));
    }
    Ok(())
}

fn validate_password(password: &str) -> AuthResult<()> {
    if password.len() < 8 {
        return Err(AuthError::validation(
            "password must be at least 8 characters",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::TracingAuditSink;
    use crate::store::{seed_defaults, InMemoryCredentialStore};

    struct Fixture {
        store: Arc<InMemoryCredentialStore>,
        accounts: AccountService,
    }

    async fn fixture() -> Fixture {
        let store = Arc::new(InMemoryCredentialStore::new());
        seed_defaults(store.as_ref()).await.unwrap();

        let codec = Arc::new(
            TokenCodec::new(
                "test-secret",
                "sentra-auth-service",
                "sentra-client",
                Duration::days(7),
                Duration::days(30),
            )
            .unwrap(),
        );
        // Minimum cost keeps the tests quick.
        let hasher = Arc::new(CredentialHasher::new(1).unwrap());

        Fixture {
            accounts: AccountService::new(
                store.clone(),
                codec,
                hasher,
                Arc::new(TracingAuditSink),
            ),
            store,
        }
    }

    fn alice() -> RegisterInput {
        RegisterInput {
            email: "Alice@Example.com".to_string(),
            username: "alice".to_string(),
            password: "correct-horse".to_string(),
            first_name: Some("Alice".to_string()),
            last_name: None,
        }
    }

    #[tokio::test]
    async fn register_assigns_default_role_and_opens_a_session() {
        let f = fixture().await;
        let payload = f.accounts.register(alice(), Default::default()).await.unwrap();

        assert_eq!(payload.user.email, "alice@example.com");
        assert_eq!(payload.user.primary_role().unwrap().as_str(), "user");
        assert_eq!(payload.expires_in, Duration::days(7).num_milliseconds());
        assert!(!payload.token.is_empty());

        let active = f.accounts.sessions().list_active(payload.user.user_id).await.unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].token, payload.refresh_token);
    }

    #[tokio::test]
    async fn register_rejects_taken_email_and_username() {
        let f = fixture().await;
        f.accounts.register(alice(), Default::default()).await.unwrap();

        let mut same_email = alice();
        same_email.username = "alice2".to_string();
        let err = f
            .accounts
            .register(same_email, Default::default())
            .await
            .expect_err("email taken");
        assert!(matches!(err, AuthError::Conflict(_)));

        let mut same_username = alice();
        same_username.email = "other@example.com".to_string();
        let err = f
            .accounts
            .register(same_username, Default::default())
            .await
            .expect_err("username taken");
        assert!(matches!(err, AuthError::Conflict(_)));
    }

    #[tokio::test]
    async fn register_validates_input() {
        let f = fixture().await;

        let mut bad_email = alice();
        bad_email.email = "no-at-sign".to_string();
        assert!(matches!(
            f.accounts.register(bad_email, Default::default()).await,
            Err(AuthError::Validation(_))
        ));

        let mut short_password = alice();
        short_password.password = "short".to_string();
        assert!(matches!(
            f.accounts.register(short_password, Default::default()).await,
            Err(AuthError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn login_failures_share_one_message() {
        let f = fixture().await;
        f.accounts.register(alice(), Default::default()).await.unwrap();

        let unknown = f
            .accounts
            .login(
                Credentials {
                    email: "nobody@example.com".to_string(),
                    password: "correct-horse".to_string(),
                    remember_me: false,
                },
                Default::default(),
            )
            .await
            .expect_err("unknown email");

        let wrong = f
            .accounts
            .login(
                Credentials {
                    email: "alice@example.com".to_string(),
                    password: "wrong-password".to_string(),
                    remember_me: false,
                },
                Default::default(),
            )
            .await
            .expect_err("wrong password");

        // No account-existence oracle.
        assert_eq!(unknown, wrong);
        assert_eq!(unknown.to_string(), INVALID_CREDENTIALS);
    }

    #[tokio::test]
    async fn deactivated_account_cannot_login_and_message_matches() {
        let f = fixture().await;
        let payload = f.accounts.register(alice(), Default::default()).await.unwrap();

        f.store
            .update_user(
                payload.user.user_id,
                UserUpdate {
                    is_active: Some(false),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let err = f
            .accounts
            .login(
                Credentials {
                    email: "alice@example.com".to_string(),
                    password: "correct-horse".to_string(),
                    remember_me: false,
                },
                Default::default(),
            )
            .await
            .expect_err("deactivated");
        assert_eq!(err.to_string(), INVALID_CREDENTIALS);
    }

    #[tokio::test]
    async fn login_records_last_login() {
        let f = fixture().await;
        let registered = f.accounts.register(alice(), Default::default()).await.unwrap();

        let payload = f
            .accounts
            .login(
                Credentials {
                    email: "alice@example.com".to_string(),
                    password: "correct-horse".to_string(),
                    remember_me: true,
                },
                Default::default(),
            )
            .await
            .unwrap();
        assert_eq!(payload.user.user_id, registered.user.user_id);

        let user = f
            .store
            .find_user_by_id(payload.user.user_id)
            .await
            .unwrap()
            .unwrap();
        assert!(user.last_login.is_some());
    }

    #[tokio::test]
    async fn refresh_rotates_and_old_token_is_single_use() {
        let f = fixture().await;
        let login = f.accounts.register(alice(), Default::default()).await.unwrap();
        let first_refresh = login.refresh_token.clone();

        let refreshed = f.accounts.refresh(&first_refresh).await.unwrap();
        assert_ne!(refreshed.refresh_token, first_refresh);

        // Replaying the superseded value is a plain authentication failure.
        let err = f.accounts.refresh(&first_refresh).await.expect_err("replay");
        assert!(matches!(err, AuthError::Authentication(_)));

        // The rotated value keeps working and keeps the same session row.
        let again = f.accounts.refresh(&refreshed.refresh_token).await.unwrap();
        let active = f.accounts.sessions().list_active(login.user.user_id).await.unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].token, again.refresh_token);
    }

    #[tokio::test]
    async fn refresh_rejects_garbage_and_access_tokens() {
        let f = fixture().await;
        let login = f.accounts.register(alice(), Default::default()).await.unwrap();

        assert!(matches!(
            f.accounts.refresh("garbage").await,
            Err(AuthError::Authentication(_))
        ));
        // An access token is the wrong kind even though its signature is ours.
        assert!(matches!(
            f.accounts.refresh(&login.token).await,
            Err(AuthError::Authentication(_))
        ));
    }

    #[tokio::test]
    async fn refresh_denies_deactivated_user() {
        let f = fixture().await;
        let login = f.accounts.register(alice(), Default::default()).await.unwrap();

        f.store
            .update_user(
                login.user.user_id,
                UserUpdate {
                    is_active: Some(false),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let err = f
            .accounts
            .refresh(&login.refresh_token)
            .await
            .expect_err("deactivated");
        assert!(matches!(err, AuthError::Authentication(_)));
    }

    #[tokio::test]
    async fn change_password_invalidates_every_session() {
        let f = fixture().await;
        let first = f.accounts.register(alice(), Default::default()).await.unwrap();
        let user_id = first.user.user_id;
        let second = f
            .accounts
            .login(
                Credentials {
                    email: "alice@example.com".to_string(),
                    password: "correct-horse".to_string(),
                    remember_me: false,
                },
                Default::default(),
            )
            .await
            .unwrap();

        assert_eq!(f.accounts.sessions().list_active(user_id).await.unwrap().len(), 2);

        f.accounts
            .change_password(user_id, "correct-horse", "battery-staple")
            .await
            .unwrap();

        assert!(f.accounts.sessions().list_active(user_id).await.unwrap().is_empty());
        assert!(matches!(
            f.accounts.refresh(&second.refresh_token).await,
            Err(AuthError::Authentication(_))
        ));

        // Old password out, new password in.
        assert!(matches!(
            f.accounts
                .login(
                    Credentials {
                        email: "alice@example.com".to_string(),
                        password: "correct-horse".to_string(),
                        remember_me: false,
                    },
                    Default::default(),
                )
                .await,
            Err(AuthError::Authentication(_))
        ));
        f.accounts
            .login(
                Credentials {
                    email: "alice@example.com".to_string(),
                    password: "battery-staple".to_string(),
                    remember_me: false,
                },
                Default::default(),
            )
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn change_password_requires_the_current_one() {
        let f = fixture().await;
        let payload = f.accounts.register(alice(), Default::default()).await.unwrap();

        let err = f
            .accounts
            .change_password(payload.user.user_id, "not-the-password", "battery-staple")
            .await
            .expect_err("wrong current password");
        assert!(matches!(err, AuthError::Validation(_)));
    }

    #[tokio::test]
    async fn reset_flow_consumes_the_token_and_revokes_sessions() {
        let f = fixture().await;
        let payload = f.accounts.register(alice(), Default::default()).await.unwrap();
        let user_id = payload.user.user_id;

        let token = f
            .accounts
            .forgot_password("alice@example.com")
            .await
            .unwrap()
            .expect("token for known account");

        f.accounts.reset_password(&token, "battery-staple").await.unwrap();

        assert!(f.accounts.sessions().list_active(user_id).await.unwrap().is_empty());

        // Single use: the second redemption fails.
        let err = f
            .accounts
            .reset_password(&token, "another-password")
            .await
            .expect_err("token already used");
        assert!(matches!(err, AuthError::Validation(_)));

        f.accounts
            .login(
                Credentials {
                    email: "alice@example.com".to_string(),
                    password: "battery-staple".to_string(),
                    remember_me: false,
                },
                Default::default(),
            )
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn forgot_password_is_silent_for_unknown_email() {
        let f = fixture().await;
        let outcome = f.accounts.forgot_password("nobody@example.com").await.unwrap();
        assert!(outcome.is_none());
    }

    #[tokio::test]
    async fn email_verification_flow() {
        let f = fixture().await;
        let payload = f.accounts.register(alice(), Default::default()).await.unwrap();
        let user_id = payload.user.user_id;
        assert!(!payload.user.is_verified);

        let token = f.accounts.request_email_verification(user_id).await.unwrap();
        f.accounts.verify_email(&token).await.unwrap();

        let user = f.store.find_user_by_id(user_id).await.unwrap().unwrap();
        assert!(user.is_verified);

        // Verified accounts cannot request another token.
        assert!(matches!(
            f.accounts.request_email_verification(user_id).await,
            Err(AuthError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn logout_scopes_to_one_session_or_all() {
        let f = fixture().await;
        let first = f.accounts.register(alice(), Default::default()).await.unwrap();
        let user_id = first.user.user_id;
        f.accounts
            .login(
                Credentials {
                    email: "alice@example.com".to_string(),
                    password: "correct-horse".to_string(),
                    remember_me: false,
                },
                Default::default(),
            )
            .await
            .unwrap();

        let active = f.accounts.sessions().list_active(user_id).await.unwrap();
        assert_eq!(active.len(), 2);

        // Newest-first: revoke the newest, the older one survives.
        f.accounts.logout(user_id, Some(active[0].id)).await.unwrap();
        let remaining = f.accounts.sessions().list_active(user_id).await.unwrap();
        assert_eq!(remaining.len(), 1);

        f.accounts.logout(user_id, None).await.unwrap();
        assert!(f.accounts.sessions().list_active(user_id).await.unwrap().is_empty());
    }
}
