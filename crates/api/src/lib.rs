//! `sentra-api` — process wiring for the auth core.
//!
//! Configuration, the bearer-token middleware producing a typed
//! authentication context, and error→HTTP mapping. Business routes stay out
//! of this crate; the router exposes health plus an identity echo so the
//! middleware can be exercised end to end.

pub mod app;
pub mod config;
pub mod errors;
pub mod middleware;

pub use app::build_app;
pub use config::{Config, ConfigError};
pub use middleware::AuthState;
