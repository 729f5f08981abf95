//! Domain model for the user registry and credential accounts.
//!
//! # Responsibility
//! - Define canonical records returned by the stores.
//! - Define insert-side shapes with normalization and validation helpers.
//!
//! # Invariants
//! - Record ids are assigned by storage, monotonic and never reused.
//! - Phone numbers are unique per table; usernames are unique per account.

pub mod account;
pub mod user;
