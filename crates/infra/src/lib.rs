//! Infrastructure layer: credential store contract, in-memory store, and the
//! store-backed services (sessions, permission resolution, authorization
//! guard, accounts, roles, users).
//!
//! Every service takes its store handle at construction. There is no
//! process-wide store singleton; tests build isolated instances.

pub mod account;
pub mod audit;
pub mod guard;
pub mod resolver;
pub mod role_service;
pub mod session;
pub mod store;
pub mod user_service;

pub use account::{AccountService, AuthPayload, Credentials, RegisterInput};
pub use audit::{AuditEvent, AuditSink, TracingAuditSink};
pub use guard::AuthorizationGuard;
pub use resolver::PermissionResolver;
pub use role_service::{RoleService, RoleView};
pub use session::SessionManager;
pub use store::{
    seed_defaults, CredentialStore, InMemoryCredentialStore, NewOneTimeToken, NewSession, NewUser,
    OneTimeTokenKind, OneTimeTokenRecord, PermissionRecord, RoleRecord, SessionOrigin,
    SessionRecord, StoreError, UserRecord, UserUpdate,
};
pub use user_service::{Profile, ProfileUpdate, UserService};
