//! Core domain logic for the user registry.
//! This crate is the single source of truth for registry invariants.

pub mod db;
pub mod form;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use db::{ensure_schema, open_db, open_db_in_memory, DbError, DbResult};
pub use form::{
    CacheState, Field, FieldError, FormGate, FormKind, KnownValues, PasswordViolation,
    UsernameViolation, ValidationError,
};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::account::{
    hash_password, Account, AccountId, AccountValidationError, NewAccount,
};
pub use model::user::{NewUser, UserId, UserRecord, UserValidationError};
pub use repo::account_repo::{AccountRepository, SqliteAccountRepository};
pub use repo::user_repo::{RepoError, RepoResult, SqliteUserRepository, UserRepository};
pub use repo::UniqueField;
pub use service::account_service::{AccountService, AuthError};
pub use service::registration_service::RegistrationService;
pub use service::{Notice, NoticeKind, RegistryError, WorkflowState};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
