//! Environment configuration.
//!
//! The signing secret is mandatory: the process refuses to start without it
//! rather than running with a guessable default.

use chrono::Duration;
use thiserror::Error;

use sentra_auth::password::DEFAULT_TIME_COST;

const DEFAULT_ACCESS_TTL_SECS: i64 = 7 * 24 * 60 * 60;
const DEFAULT_REFRESH_TTL_SECS: i64 = 30 * 24 * 60 * 60;
const DEFAULT_ISSUER: &str = "sentra-auth-service";
const DEFAULT_AUDIENCE: &str = "sentra-client";
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("JWT_SECRET environment variable is required")]
    MissingSecret,

    #[error("invalid value for {name}: {value}")]
    Invalid { name: &'static str, value: String },
}

/// Deployment configuration for the auth process.
#[derive(Debug, Clone)]
pub struct Config {
    pub jwt_secret: String,
    pub issuer: String,
    pub audience: String,
    pub access_ttl: Duration,
    pub refresh_ttl: Duration,
    /// Argon2 time cost for newly hashed credentials.
    pub hash_cost: u32,
    pub bind_addr: String,
}

impl Config {
    /// Load from the environment. Fails fast when the secret is absent or a
    /// numeric knob cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        let jwt_secret = std::env::var("JWT_SECRET")
            .ok()
            .filter(|s| !s.is_empty())
            .ok_or(ConfigError::MissingSecret)?;

        Ok(Self {
            jwt_secret,
            issuer: env_or("JWT_ISSUER", DEFAULT_ISSUER),
            audience: env_or("JWT_AUDIENCE", DEFAULT_AUDIENCE),
            access_ttl: Duration::seconds(parse_positive(
                "JWT_ACCESS_TTL_SECS",
                std::env::var("JWT_ACCESS_TTL_SECS").ok(),
                DEFAULT_ACCESS_TTL_SECS,
            )?),
            refresh_ttl: Duration::seconds(parse_positive(
                "JWT_REFRESH_TTL_SECS",
                std::env::var("JWT_REFRESH_TTL_SECS").ok(),
                DEFAULT_REFRESH_TTL_SECS,
            )?),
            hash_cost: parse_positive(
                "HASH_COST",
                std::env::var("HASH_COST").ok(),
                i64::from(DEFAULT_TIME_COST),
            )? as u32,
            bind_addr: env_or("BIND_ADDR", DEFAULT_BIND_ADDR),
        })
    }
}

fn env_or(name: &str, default: &str) -> String {
    std::env::var(name)
        .ok()
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn parse_positive(
    name: &'static str,
    value: Option<String>,
    default: i64,
) -> Result<i64, ConfigError> {
    match value {
        None => Ok(default),
        Some(raw) => raw
            .parse::<i64>()
            .ok()
            .filter(|v| *v > 0)
            .ok_or(ConfigError::Invalid { name, value: raw }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_value_falls_back_to_default() {
        assert_eq!(parse_positive("X", None, 42).unwrap(), 42);
    }

    #[test]
    fn non_numeric_and_non_positive_values_are_rejected() {
        assert!(parse_positive("X", Some("abc".to_string()), 42).is_err());
        assert!(parse_positive("X", Some("0".to_string()), 42).is_err());
        assert!(parse_positive("X", Some("-5".to_string()), 42).is_err());
        assert_eq!(parse_positive("X", Some("600".to_string()), 42).unwrap(), 600);
    }
}
