//! Credential account model.
//!
//! # Responsibility
//! - Define the credential document submitted on sign-up.
//! - Derive the stored password digest used by login lookups.
//!
//! # Invariants
//! - Clear-text passwords never leave this module; only `password_hash` is stored.
//! - `hash_password` is deterministic so login can match by equality.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Storage-assigned identifier of an account document.
pub type AccountId = i64;

/// Stored credential document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub id: AccountId,
    pub full_name: String,
    pub phone_number: String,
    pub username: String,
    /// Lowercase hex SHA-256 digest of the password. Never serialized;
    /// reads back as empty.
    #[serde(skip_serializing, default)]
    pub password_hash: String,
}

/// Full credential document submitted by the sign-up flow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewAccount {
    pub full_name: String,
    pub phone_number: String,
    pub username: String,
    pub password_hash: String,
}

/// Validation failures for a credential document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccountValidationError {
    EmptyFullName,
    EmptyPhoneNumber,
    EmptyUsername,
    EmptyPasswordHash,
}

impl Display for AccountValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyFullName => write!(f, "full_name must not be blank"),
            Self::EmptyPhoneNumber => write!(f, "phone_number must not be blank"),
            Self::EmptyUsername => write!(f, "username must not be blank"),
            Self::EmptyPasswordHash => write!(f, "password_hash must not be empty"),
        }
    }
}

impl Error for AccountValidationError {}

impl NewAccount {
    /// Builds a document from raw form input, hashing the password.
    pub fn from_input(full_name: &str, phone_number: &str, username: &str, password: &str) -> Self {
        Self {
            full_name: full_name.trim().to_string(),
            phone_number: phone_number.trim().to_string(),
            username: username.trim().to_string(),
            password_hash: hash_password(password),
        }
    }

    /// Checks storage-level invariants of the document.
    pub fn validate(&self) -> Result<(), AccountValidationError> {
        if self.full_name.trim().is_empty() {
            return Err(AccountValidationError::EmptyFullName);
        }
        if self.phone_number.trim().is_empty() {
            return Err(AccountValidationError::EmptyPhoneNumber);
        }
        if self.username.trim().is_empty() {
            return Err(AccountValidationError::EmptyUsername);
        }
        if self.password_hash.is_empty() {
            return Err(AccountValidationError::EmptyPasswordHash);
        }
        Ok(())
    }
}

/// Returns the lowercase hex SHA-256 digest of `password`.
pub fn hash_password(password: &str) -> String {
    hex::encode(Sha256::digest(password.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::{hash_password, NewAccount};

    #[test]
    fn hash_password_is_deterministic_hex() {
        let first = hash_password("leDinh@vu6");
        assert_eq!(first, hash_password("leDinh@vu6"));
        assert_eq!(first.len(), 64);
        assert!(first.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
        assert_ne!(first, hash_password("leDinh@vu7"));
    }

    #[test]
    fn from_input_never_keeps_clear_password() {
        let doc = NewAccount::from_input(" Vu ", "0912345678", "le.vu", "leDinh@vu6");
        assert_eq!(doc.full_name, "Vu");
        assert_ne!(doc.password_hash, "leDinh@vu6");
    }
}
