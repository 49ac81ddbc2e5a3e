//! Credential store: the single owner of persisted auth state.

pub mod contract;
pub mod in_memory;
pub mod records;
pub mod seed;

pub use contract::{CredentialStore, StoreError};
pub use in_memory::InMemoryCredentialStore;
pub use records::{
    NewOneTimeToken, NewSession, NewUser, OneTimeTokenKind, OneTimeTokenRecord, PermissionRecord,
    RoleRecord, SessionOrigin, SessionRecord, UserRecord, UserUpdate,
};
pub use seed::seed_defaults;
