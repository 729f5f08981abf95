//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define use-case oriented data access contracts.
//! - Isolate SQLite query details from workflow orchestration.
//!
//! # Invariants
//! - Repository writes validate input before persistence.
//! - Uniqueness is enforced by storage constraints and surfaced as
//!   `RepoError::Duplicate`, never by application-level locking.

pub mod account_repo;
pub mod user_repo;

use rusqlite::{ffi, Connection};

/// Column guarded by a `UNIQUE` constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniqueField {
    PhoneNumber,
    Username,
}

impl UniqueField {
    pub fn column(self) -> &'static str {
        match self {
            Self::PhoneNumber => "phone_number",
            Self::Username => "username",
        }
    }
}

/// Maps a SQLite `UNIQUE` violation to the offending column.
///
/// Returns `None` for every other error so callers keep the transport error.
pub(crate) fn unique_violation(err: &rusqlite::Error) -> Option<UniqueField> {
    match err {
        rusqlite::Error::SqliteFailure(code, message)
            if code.extended_code == ffi::SQLITE_CONSTRAINT_UNIQUE =>
        {
            // Message shape: "UNIQUE constraint failed: <table>.<column>".
            let message = message.as_deref().unwrap_or_default();
            if message.ends_with(".username") {
                Some(UniqueField::Username)
            } else {
                Some(UniqueField::PhoneNumber)
            }
        }
        _ => None,
    }
}

pub(crate) fn table_exists(conn: &Connection, table: &str) -> rusqlite::Result<bool> {
    conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get::<_, i64>(0),
    )
    .map(|exists| exists == 1)
}
