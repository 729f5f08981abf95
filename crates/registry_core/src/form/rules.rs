//! Field rules and their violations.
//!
//! Phone numbers follow the Vietnamese mobile scheme: `84` or `0` plus one
//! of `3|5|7|8|9`, then exactly 8 digits.

use crate::form::cache::KnownValues;
use crate::form::gate::Field;
use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub const USERNAME_MIN_CHARS: usize = 6;
pub const USERNAME_MAX_CHARS: usize = 20;
pub const PASSWORD_MIN_CHARS: usize = 6;
pub const PASSWORD_SYMBOLS: &str = "!@#$%^&*";

static PHONE_NUMBER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(84|0[35789])[0-9]{8}$").expect("valid phone number regex"));
static USERNAME_CHARSET_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z0-9._]*$").expect("valid username charset regex"));
static USERNAME_SEPARATOR_RUN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[._]{2}").expect("valid separator run regex"));

/// Username rule that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UsernameViolation {
    /// Contains something other than `a-z`, `0-9`, `.` or `_`.
    InvalidCharacter,
    /// Starts or ends with `.` or `_`.
    EdgeSeparator,
    /// Two separators next to each other (`._`, `__`, `..`).
    AdjacentSeparators,
    /// Fewer than 6 or more than 20 characters.
    Length,
}

/// Password rule that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PasswordViolation {
    MissingLowercase,
    MissingUppercase,
    MissingDigit,
    MissingSymbol,
    TooShort,
}

/// Field-scoped validation failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    Required(Field),
    InvalidPhoneNumber,
    PhoneNumberTaken,
    Username(UsernameViolation),
    UsernameTaken,
    Password(PasswordViolation),
}

impl ValidationError {
    /// Stable, user-facing message for inline display.
    pub fn message(&self) -> &'static str {
        match self {
            Self::Required(Field::FullName) => "Full name is required",
            Self::Required(Field::PhoneNumber) => "Phone number is required",
            Self::Required(Field::Username) => "Username is required",
            Self::Required(Field::Password) => "Password is required",
            Self::InvalidPhoneNumber => "Invalid phone number",
            Self::PhoneNumberTaken => "Phone number has been registered",
            Self::Username(UsernameViolation::InvalidCharacter) => {
                "Username may only contain lowercase letters, digits, '.' and '_'"
            }
            Self::Username(UsernameViolation::EdgeSeparator) => {
                "Username can't start or end with '.' or '_'"
            }
            Self::Username(UsernameViolation::AdjacentSeparators) => {
                "Username can't contain '.' or '_' next to each other"
            }
            Self::Username(UsernameViolation::Length) => {
                "Username must be between 6 and 20 characters"
            }
            Self::UsernameTaken => "Username has been registered",
            Self::Password(PasswordViolation::MissingLowercase) => {
                "Password must contain a lowercase letter"
            }
            Self::Password(PasswordViolation::MissingUppercase) => {
                "Password must contain an uppercase letter"
            }
            Self::Password(PasswordViolation::MissingDigit) => "Password must contain a digit",
            Self::Password(PasswordViolation::MissingSymbol) => {
                "Password must contain one of !@#$%^&*"
            }
            Self::Password(PasswordViolation::TooShort) => {
                "Password must be at least 6 characters"
            }
        }
    }
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.message())
    }
}

impl Error for ValidationError {}

pub fn is_valid_phone_number(value: &str) -> bool {
    PHONE_NUMBER_RE.is_match(value)
}

/// Returns every username rule `value` breaks; empty means valid.
pub fn username_violations(value: &str) -> Vec<UsernameViolation> {
    let mut violations = Vec::new();
    if !USERNAME_CHARSET_RE.is_match(value) {
        violations.push(UsernameViolation::InvalidCharacter);
    }
    if value.starts_with(['.', '_']) || value.ends_with(['.', '_']) {
        violations.push(UsernameViolation::EdgeSeparator);
    }
    if USERNAME_SEPARATOR_RUN_RE.is_match(value) {
        violations.push(UsernameViolation::AdjacentSeparators);
    }
    let len = value.chars().count();
    if !(USERNAME_MIN_CHARS..=USERNAME_MAX_CHARS).contains(&len) {
        violations.push(UsernameViolation::Length);
    }
    violations
}

/// Returns every password rule `value` breaks; empty means strong enough.
pub fn password_violations(value: &str) -> Vec<PasswordViolation> {
    let mut violations = Vec::new();
    if !value.chars().any(|c| c.is_ascii_lowercase()) {
        violations.push(PasswordViolation::MissingLowercase);
    }
    if !value.chars().any(|c| c.is_ascii_uppercase()) {
        violations.push(PasswordViolation::MissingUppercase);
    }
    if !value.chars().any(|c| c.is_ascii_digit()) {
        violations.push(PasswordViolation::MissingDigit);
    }
    if !value.chars().any(|c| PASSWORD_SYMBOLS.contains(c)) {
        violations.push(PasswordViolation::MissingSymbol);
    }
    if value.chars().count() < PASSWORD_MIN_CHARS {
        violations.push(PasswordViolation::TooShort);
    }
    violations
}

pub fn validate_full_name(value: &str) -> Vec<ValidationError> {
    if value.trim().is_empty() {
        return vec![ValidationError::Required(Field::FullName)];
    }
    Vec::new()
}

/// Required, then format, then uniqueness; later checks are moot once one fails.
pub fn validate_phone_number(value: &str, known: &KnownValues) -> Vec<ValidationError> {
    if value.is_empty() {
        return vec![ValidationError::Required(Field::PhoneNumber)];
    }
    if !is_valid_phone_number(value) {
        return vec![ValidationError::InvalidPhoneNumber];
    }
    if known.contains(value) {
        return vec![ValidationError::PhoneNumberTaken];
    }
    Vec::new()
}

pub fn validate_username(value: &str, known: &KnownValues) -> Vec<ValidationError> {
    if value.is_empty() {
        return vec![ValidationError::Required(Field::Username)];
    }
    let violations = username_violations(value);
    if !violations.is_empty() {
        return violations.into_iter().map(ValidationError::Username).collect();
    }
    if known.contains(value) {
        return vec![ValidationError::UsernameTaken];
    }
    Vec::new()
}

pub fn validate_password(value: &str) -> Vec<ValidationError> {
    if value.is_empty() {
        return vec![ValidationError::Required(Field::Password)];
    }
    password_violations(value)
        .into_iter()
        .map(ValidationError::Password)
        .collect()
}
