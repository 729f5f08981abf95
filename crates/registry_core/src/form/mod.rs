//! Pre-submission form validation.
//!
//! # Responsibility
//! - Evaluate every field rule independently and report per-rule errors.
//! - Hold the uniqueness caches consulted by the phone/username rules.
//! - Decide whether a form may be submitted.
//!
//! # Invariants
//! - Validation never touches storage; it only reads `KnownValues`.
//! - A form with a pending cache is never submittable.

pub mod cache;
pub mod gate;
pub mod rules;

pub use cache::{CacheState, KnownValues};
pub use gate::{Field, FieldError, FormGate, FormKind};
pub use rules::{PasswordViolation, UsernameViolation, ValidationError};
