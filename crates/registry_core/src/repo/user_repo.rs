//! Registry store contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide create-schema, insert and list APIs over the `users` table.
//! - Keep SQL details inside the core persistence boundary.
//!
//! # Invariants
//! - Insert paths call `NewUser::validate()` and store trimmed values.
//! - Each insert is one statement, so no partial record is ever persisted.
//! - List paths return rows in insertion order (`id ASC`).
//! - `list_all` skips rows with a blank `full_name` and logs them.

use crate::db::{ensure_schema, DbError};
use crate::model::account::AccountValidationError;
use crate::model::user::{NewUser, UserId, UserRecord, UserValidationError};
use crate::repo::{table_exists, unique_violation, UniqueField};
use log::{error, info, warn};
use rusqlite::{params, Connection, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error shared by the registry and account stores.
#[derive(Debug)]
pub enum RepoError {
    Validation(UserValidationError),
    AccountValidation(AccountValidationError),
    Db(DbError),
    /// A `UNIQUE` constraint rejected the write.
    Duplicate(UniqueField),
    /// Connection has no registry schema; `ensure_schema` was never run.
    SchemaMissing(&'static str),
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::AccountValidation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::Duplicate(field) => {
                write!(f, "{} is already registered", field.column())
            }
            Self::SchemaMissing(table) => write!(f, "table `{table}` does not exist"),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::AccountValidation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::Duplicate(_) | Self::SchemaMissing(_) | Self::InvalidData(_) => None,
        }
    }
}

impl From<UserValidationError> for RepoError {
    fn from(value: UserValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<AccountValidationError> for RepoError {
    fn from(value: AccountValidationError) -> Self {
        Self::AccountValidation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        match unique_violation(&value) {
            Some(field) => Self::Duplicate(field),
            None => Self::Db(DbError::Sqlite(value)),
        }
    }
}

/// Repository interface for the user registry.
pub trait UserRepository {
    /// Creates the backing table when absent. Idempotent.
    fn ensure_schema(&self) -> RepoResult<()>;
    /// Returns every record in insertion order.
    fn list_all(&self) -> RepoResult<Vec<UserRecord>>;
    /// Returns every registered phone number in insertion order.
    fn list_phone_numbers(&self) -> RepoResult<Vec<String>>;
    /// Inserts one record and returns it with its assigned id.
    fn insert(&self, user: &NewUser) -> RepoResult<UserRecord>;
}

/// SQLite-backed registry store.
pub struct SqliteUserRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteUserRepository<'conn> {
    /// Constructs a repository from a connection that already has the schema.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        if !table_exists(conn, "users")? {
            return Err(RepoError::SchemaMissing("users"));
        }
        Ok(Self { conn })
    }

    /// Constructs a repository and creates the schema first when needed.
    pub fn bootstrap(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_schema(conn)?;
        Self::try_new(conn)
    }
}

impl UserRepository for SqliteUserRepository<'_> {
    fn ensure_schema(&self) -> RepoResult<()> {
        ensure_schema(self.conn)?;
        Ok(())
    }

    fn list_all(&self) -> RepoResult<Vec<UserRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, full_name, phone_number
             FROM users
             ORDER BY id ASC;",
        )?;
        let mut rows = stmt.query([])?;
        let mut users = Vec::new();
        while let Some(row) = rows.next()? {
            match parse_user_row(row) {
                Ok(user) => users.push(user),
                // Same rows `list_phone_numbers` returns; one bad name must not hide the rest.
                Err(RepoError::InvalidData(message)) => {
                    warn!("event=user_list module=repo status=skipped error={message}");
                }
                Err(err) => return Err(err),
            }
        }
        Ok(users)
    }

    fn list_phone_numbers(&self) -> RepoResult<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT phone_number FROM users ORDER BY id ASC;")?;
        let phone_numbers = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(phone_numbers)
    }

    fn insert(&self, user: &NewUser) -> RepoResult<UserRecord> {
        user.validate()?;
        let user = user.normalized();

        match self.conn.execute(
            "INSERT INTO users (full_name, phone_number) VALUES (?1, ?2);",
            params![user.full_name, user.phone_number],
        ) {
            Ok(_) => {}
            Err(err) => {
                let err = RepoError::from(err);
                match &err {
                    RepoError::Duplicate(field) => warn!(
                        "event=user_insert module=repo status=rejected error_code=duplicate field={}",
                        field.column()
                    ),
                    other => error!(
                        "event=user_insert module=repo status=error error_code=insert_failed error={other}"
                    ),
                }
                return Err(err);
            }
        }

        let id = UserId(self.conn.last_insert_rowid());
        info!("event=user_insert module=repo status=ok id={id}");
        Ok(UserRecord {
            id,
            full_name: user.full_name,
            phone_number: user.phone_number,
        })
    }
}

fn parse_user_row(row: &Row<'_>) -> RepoResult<UserRecord> {
    let id = UserId(row.get("id")?);
    let full_name: String = row.get("full_name")?;
    if full_name.trim().is_empty() {
        return Err(RepoError::InvalidData(format!(
            "blank value in users.full_name for id={id}"
        )));
    }
    Ok(UserRecord {
        id,
        full_name,
        phone_number: row.get("phone_number")?,
    })
}
