//! User registry record model.
//!
//! # Responsibility
//! - Define the stored `UserRecord` and the insert-side `NewUser`.
//! - Normalize and validate insert input before it reaches SQL.
//!
//! # Invariants
//! - `full_name` is stored trimmed and never blank.
//! - `phone_number` is never blank; format is checked by the form gate.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Storage-assigned identifier of a registry record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub i64);

impl Display for UserId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Stored registry entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: UserId,
    pub full_name: String,
    pub phone_number: String,
}

/// Insert request for the registry store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub full_name: String,
    pub phone_number: String,
}

/// Validation failures for insert-side user input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserValidationError {
    /// Full name is empty after trimming.
    EmptyFullName,
    /// Phone number is empty after trimming.
    EmptyPhoneNumber,
}

impl Display for UserValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyFullName => write!(f, "full_name must not be blank"),
            Self::EmptyPhoneNumber => write!(f, "phone_number must not be blank"),
        }
    }
}

impl Error for UserValidationError {}

impl NewUser {
    pub fn new(full_name: impl Into<String>, phone_number: impl Into<String>) -> Self {
        Self {
            full_name: full_name.into(),
            phone_number: phone_number.into(),
        }
    }

    /// Returns a copy with surrounding whitespace removed from both fields.
    pub fn normalized(&self) -> Self {
        Self {
            full_name: self.full_name.trim().to_string(),
            phone_number: self.phone_number.trim().to_string(),
        }
    }

    /// Checks storage-level invariants.
    pub fn validate(&self) -> Result<(), UserValidationError> {
        if self.full_name.trim().is_empty() {
            return Err(UserValidationError::EmptyFullName);
        }
        if self.phone_number.trim().is_empty() {
            return Err(UserValidationError::EmptyPhoneNumber);
        }
        Ok(())
    }
}
