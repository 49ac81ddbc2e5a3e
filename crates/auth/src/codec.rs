//! Token codec: one signing mechanism, two token kinds.
//!
//! Access and refresh tokens are HS256-signed with a shared deployment
//! secret, bound to an issuer/audience pair. Opaque (non-self-describing)
//! tokens for one-time-use flows come from the CSPRNG instead.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use rand::{rngs::OsRng, RngCore};
use thiserror::Error;

use sentra_core::UserId;

use crate::claims::{AccessClaims, RefreshClaims, REFRESH_TOKEN_TYPE};
use crate::context::AuthContext;

/// Default byte length for [`random_opaque_token`].
pub const DEFAULT_OPAQUE_TOKEN_BYTES: usize = 32;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum TokenError {
    /// The signing secret was empty at construction time.
    #[error("signing secret must not be empty")]
    EmptySecret,

    /// The token is past its expiry. No grace window.
    #[error("token has expired")]
    Expired,

    /// Signature, issuer, audience, shape, or kind mismatch.
    #[error("invalid token")]
    Invalid,
}

/// Signs and verifies the two token kinds.
///
/// Pure function of secret + input: no I/O, no suspension points.
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    issuer: String,
    audience: String,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl std::fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenCodec")
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .field("access_ttl", &self.access_ttl)
            .field("refresh_ttl", &self.refresh_ttl)
            .finish_non_exhaustive()
    }
}

impl TokenCodec {
    /// Build a codec from deployment configuration.
    ///
    /// The secret is mandatory; configuration loading rejects a missing one
    /// before this point, and an empty one is rejected here.
    pub fn new(
        secret: &str,
        issuer: impl Into<String>,
        audience: impl Into<String>,
        access_ttl: Duration,
        refresh_ttl: Duration,
    ) -> Result<Self, TokenError> {
        if secret.is_empty() {
            return Err(TokenError::EmptySecret);
        }

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            issuer: issuer.into(),
            audience: audience.into(),
            access_ttl,
            refresh_ttl,
        })
    }

    pub fn access_ttl(&self) -> Duration {
        self.access_ttl
    }

    pub fn refresh_ttl(&self) -> Duration {
        self.refresh_ttl
    }

    /// Issue an access token carrying the principal's identity snapshot.
    pub fn issue_access_token(&self, principal: &AuthContext) -> Result<String, TokenError> {
        let now = Utc::now();
        let claims = AccessClaims {
            sub: principal.user_id,
            email: principal.email.clone(),
            username: principal.username.clone(),
            roles: principal.roles.clone(),
            permissions: principal.permissions.clone(),
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
            iat: now.timestamp(),
            exp: (now + self.access_ttl).timestamp(),
        };

        self.encode(&claims)
    }

    /// Issue a refresh token naming only the principal.
    pub fn issue_refresh_token(&self, user_id: UserId) -> Result<String, TokenError> {
        let now = Utc::now();
        let claims = RefreshClaims {
            sub: user_id,
            typ: REFRESH_TOKEN_TYPE.to_string(),
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
            iat: now.timestamp(),
            exp: (now + self.refresh_ttl).timestamp(),
        };

        self.encode(&claims)
    }

    /// Verify an access token and return its claims.
    pub fn verify_access(&self, token: &str) -> Result<AccessClaims, TokenError> {
        self.decode::<AccessClaims>(token)
    }

    /// Verify a refresh token, enforcing the refresh kind.
    pub fn verify_refresh(&self, token: &str) -> Result<RefreshClaims, TokenError> {
        let claims = self.decode::<RefreshClaims>(token)?;
        if claims.typ != REFRESH_TOKEN_TYPE {
            return Err(TokenError::Invalid);
        }
        Ok(claims)
    }

    fn encode<T: serde::Serialize>(&self, claims: &T) -> Result<String, TokenError> {
        jsonwebtoken::encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)
            .map_err(|_| TokenError::Invalid)
    }

    fn decode<T: serde::de::DeserializeOwned>(&self, token: &str) -> Result<T, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[self.issuer.as_str()]);
        validation.set_audience(&[self.audience.as_str()]);
        // Expiry is an absolute deadline.
        validation.leeway = 0;

        jsonwebtoken::decode::<T>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Invalid,
            })
    }
}

/// Best-effort expiry introspection without verifying the signature.
///
/// For client-side display decisions only (e.g. whether to attempt a silent
/// refresh). Never a substitute for [`TokenCodec::verify_access`].
pub fn expiry_unverified(token: &str) -> Option<DateTime<Utc>> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.validate_aud = false;
    validation.required_spec_claims.clear();

    let data =
        jsonwebtoken::decode::<serde_json::Value>(token, &DecodingKey::from_secret(&[]), &validation)
            .ok()?;
    let exp = data.claims.get("exp")?.as_i64()?;
    DateTime::<Utc>::from_timestamp(exp, 0)
}

/// Whether an (unverified) token is already past its expiry.
///
/// Unparseable tokens count as expired.
pub fn is_expired_unverified(token: &str) -> bool {
    match expiry_unverified(token) {
        Some(expires_at) => Utc::now() >= expires_at,
        None => true,
    }
}

/// Cryptographically random opaque token, hex-encoded.
///
/// Used where the token does not need to be self-describing: one-time
/// password-reset and email-verification values.
pub fn random_opaque_token(byte_length: usize) -> String {
    let mut bytes = vec![0u8; byte_length];
    OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}
