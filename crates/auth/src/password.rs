//! Credential hashing (Argon2id).

use argon2::password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::{Algorithm, Argon2, Params, Version};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PasswordError {
    /// Bad hashing parameters (cost factor out of range).
    #[error("invalid hashing parameters: {0}")]
    Params(String),

    /// Hashing itself failed. Internal fault, never a validation error.
    #[error("password hashing failed: {0}")]
    Hash(String),
}

/// Argon2id password hasher with a deployment-configurable cost factor.
///
/// Verification reads the parameters embedded in the stored hash, so cost
/// changes only affect newly hashed credentials.
pub struct CredentialHasher {
    argon2: Argon2<'static>,
}

/// Default time cost (iterations) when none is configured.
pub const DEFAULT_TIME_COST: u32 = 3;

impl CredentialHasher {
    pub fn new(time_cost: u32) -> Result<Self, PasswordError> {
        let params = Params::new(Params::DEFAULT_M_COST, time_cost, Params::DEFAULT_P_COST, None)
            .map_err(|e| PasswordError::Params(e.to_string()))?;

        Ok(Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
        })
    }

    /// Hash a password with a fresh random salt.
    pub fn hash(&self, password: &str) -> Result<String, PasswordError> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = self
            .argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| PasswordError::Hash(e.to_string()))?;
        Ok(hash.to_string())
    }

    /// Constant-time verification against a stored hash.
    ///
    /// Malformed stored hashes verify as `false`, not as an error: from the
    /// caller's perspective the credential simply does not match.
    pub fn verify(&self, password: &str, stored_hash: &str) -> bool {
        match PasswordHash::new(stored_hash) {
            Ok(parsed) => self
                .argon2
                .verify_password(password.as_bytes(), &parsed)
                .is_ok(),
            Err(_) => false,
        }
    }
}

impl Default for CredentialHasher {
    fn default() -> Self {
        // DEFAULT_TIME_COST is always a valid parameter set.
        Self::new(DEFAULT_TIME_COST).expect("default argon2 params are valid")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_then_verify_roundtrip() {
        let hasher = CredentialHasher::default();
        let hash = hasher.hash("s3cret-passw0rd").expect("hash");

        assert!(hasher.verify("s3cret-passw0rd", &hash));
        assert!(!hasher.verify("wrong-password", &hash));
    }

    #[test]
    fn salts_differ_between_hashes() {
        let hasher = CredentialHasher::default();
        let a = hasher.hash("same-input").expect("hash");
        let b = hasher.hash("same-input").expect("hash");

        assert_ne!(a, b);
        assert!(hasher.verify("same-input", &a));
        assert!(hasher.verify("same-input", &b));
    }

    #[test]
    fn verify_tolerates_cost_changes() {
        let old = CredentialHasher::new(2).expect("hasher");
        let new = CredentialHasher::new(4).expect("hasher");

        let hash = old.hash("pw").expect("hash");
        // Parameters travel inside the hash string.
        assert!(new.verify("pw", &hash));
    }

    #[test]
    fn malformed_stored_hash_never_matches() {
        let hasher = CredentialHasher::default();
        assert!(!hasher.verify("pw", "not-a-phc-string"));
        assert!(!hasher.verify("pw", ""));
    }

    #[test]
    fn zero_cost_is_rejected() {
        assert!(matches!(
            CredentialHasher::new(0),
            Err(PasswordError::Params(_))
        ));
    }
}
