//! Credential account store contracts and SQLite implementation.
//!
//! # Responsibility
//! - Accept full credential documents (`add`).
//! - Retrieve documents by equality on `username` and `password_hash`.
//!
//! # Invariants
//! - Documents pass `NewAccount::validate()` before any SQL runs.
//! - `username` and `phone_number` are unique at the storage layer, so two
//!   concurrent sign-ups with the same value cannot both succeed.

use crate::db::ensure_schema;
use crate::model::account::{Account, NewAccount};
use crate::repo::table_exists;
use crate::repo::user_repo::{RepoError, RepoResult};
use log::{info, warn};
use rusqlite::{params, Connection, Row};

const ACCOUNT_SELECT_SQL: &str = "SELECT
    id,
    full_name,
    phone_number,
    username,
    password_hash
FROM accounts";

/// Repository interface for the credential document collection.
pub trait AccountRepository {
    /// Submits one full credential document.
    fn add(&self, account: &NewAccount) -> RepoResult<Account>;
    /// Returns documents whose username and password hash both match.
    fn find_by_credentials(&self, username: &str, password_hash: &str) -> RepoResult<Vec<Account>>;
    /// Returns every document in insertion order.
    fn list_all(&self) -> RepoResult<Vec<Account>>;
}

/// SQLite-backed account store.
pub struct SqliteAccountRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteAccountRepository<'conn> {
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        if !table_exists(conn, "accounts")? {
            return Err(RepoError::SchemaMissing("accounts"));
        }
        Ok(Self { conn })
    }

    pub fn bootstrap(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_schema(conn)?;
        Self::try_new(conn)
    }
}

impl AccountRepository for SqliteAccountRepository<'_> {
    fn add(&self, account: &NewAccount) -> RepoResult<Account> {
        account.validate()?;

        let result = self.conn.execute(
            "INSERT INTO accounts (
                full_name,
                phone_number,
                username,
                password_hash
            ) VALUES (?1, ?2, ?3, ?4);",
            params![
                account.full_name.trim(),
                account.phone_number.trim(),
                account.username.trim(),
                account.password_hash,
            ],
        );
        if let Err(err) = result {
            let err = RepoError::from(err);
            warn!("event=account_add module=repo status=error error={err}");
            return Err(err);
        }

        let id = self.conn.last_insert_rowid();
        info!("event=account_add module=repo status=ok id={id}");
        Ok(Account {
            id,
            full_name: account.full_name.trim().to_string(),
            phone_number: account.phone_number.trim().to_string(),
            username: account.username.trim().to_string(),
            password_hash: account.password_hash.clone(),
        })
    }

    fn find_by_credentials(&self, username: &str, password_hash: &str) -> RepoResult<Vec<Account>> {
        let mut stmt = self.conn.prepare(&format!(
            "{ACCOUNT_SELECT_SQL}
             WHERE username = ?1
               AND password_hash = ?2
             ORDER BY id ASC;"
        ))?;
        let mut rows = stmt.query(params![username, password_hash])?;
        let mut accounts = Vec::new();
        while let Some(row) = rows.next()? {
            accounts.push(parse_account_row(row)?);
        }
        Ok(accounts)
    }

    fn list_all(&self) -> RepoResult<Vec<Account>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{ACCOUNT_SELECT_SQL} ORDER BY id ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut accounts = Vec::new();
        while let Some(row) = rows.next()? {
            accounts.push(parse_account_row(row)?);
        }
        Ok(accounts)
    }
}

fn parse_account_row(row: &Row<'_>) -> RepoResult<Account> {
    Ok(Account {
        id: row.get("id")?,
        full_name: row.get("full_name")?,
        phone_number: row.get("phone_number")?,
        username: row.get("username")?,
        password_hash: row.get("password_hash")?,
    })
}
