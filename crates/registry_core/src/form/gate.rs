//! Per-form validation state.
//!
//! # Responsibility
//! - Track field values, touched flags and per-field errors for one form.
//! - Re-run every rule whenever any field changes.
//!
//! # Invariants
//! - `can_submit()` implies every field is touched, no field has errors and
//!   every uniqueness cache the form consults has settled.

use crate::form::cache::KnownValues;
use crate::form::rules::{
    validate_full_name, validate_password, validate_phone_number, validate_username,
    ValidationError,
};
use std::collections::{BTreeMap, BTreeSet};

/// Input field known to the gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    FullName,
    PhoneNumber,
    Username,
    Password,
}

impl Field {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::FullName => "full_name",
            Self::PhoneNumber => "phone_number",
            Self::Username => "username",
            Self::Password => "password",
        }
    }
}

/// Which screen the form belongs to; selects fields and rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormKind {
    /// Local registry: full name + phone number.
    Registration,
    /// Credential sign-up: full name, phone, username, password.
    SignUp,
    /// Credential login: username + password, presence only.
    Login,
}

impl FormKind {
    pub fn fields(self) -> &'static [Field] {
        match self {
            Self::Registration => &[Field::FullName, Field::PhoneNumber],
            Self::SignUp => &[
                Field::FullName,
                Field::PhoneNumber,
                Field::Username,
                Field::Password,
            ],
            Self::Login => &[Field::Username, Field::Password],
        }
    }
}

/// One failing rule bound to its field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: Field,
    pub error: ValidationError,
}

#[derive(Debug, Clone)]
pub struct FormGate {
    kind: FormKind,
    values: BTreeMap<Field, String>,
    touched: BTreeSet<Field>,
    errors: BTreeMap<Field, Vec<ValidationError>>,
    known_phone_numbers: KnownValues,
    known_usernames: KnownValues,
}

impl FormGate {
    /// Creates an empty form whose uniqueness caches are still pending.
    pub fn new(kind: FormKind) -> Self {
        let mut gate = Self {
            kind,
            values: kind
                .fields()
                .iter()
                .map(|field| (*field, String::new()))
                .collect(),
            touched: BTreeSet::new(),
            errors: BTreeMap::new(),
            known_phone_numbers: KnownValues::pending(),
            known_usernames: KnownValues::pending(),
        };
        gate.revalidate();
        gate
    }

    pub fn kind(&self) -> FormKind {
        self.kind
    }

    /// Sets a field value, marks it touched and re-runs all rules.
    ///
    /// Returns `false` when the field does not belong to this form.
    pub fn set_field(&mut self, field: Field, value: &str) -> bool {
        let Some(slot) = self.values.get_mut(&field) else {
            return false;
        };
        *slot = match field {
            Field::FullName | Field::Username => value.trim_start().to_string(),
            Field::PhoneNumber | Field::Password => value.to_string(),
        };
        self.touched.insert(field);
        self.revalidate();
        true
    }

    pub fn value(&self, field: Field) -> &str {
        self.values.get(&field).map_or("", String::as_str)
    }

    /// Errors for `field`, one per failing rule; empty when valid.
    pub fn field_errors(&self, field: Field) -> &[ValidationError] {
        self.errors.get(&field).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Errors the UI should render now: only fields the user has touched.
    pub fn visible_errors(&self) -> Vec<FieldError> {
        self.collect_errors(|field| self.touched.contains(&field))
    }

    pub fn all_errors(&self) -> Vec<FieldError> {
        self.collect_errors(|_| true)
    }

    pub fn is_valid(&self) -> bool {
        self.errors.values().all(Vec::is_empty)
    }

    pub fn is_dirty(&self) -> bool {
        self.values.values().any(|value| !value.is_empty())
    }

    pub fn all_touched(&self) -> bool {
        self.kind
            .fields()
            .iter()
            .all(|field| self.touched.contains(field))
    }

    /// Whether the caches this form consults have finished their first load.
    pub fn caches_settled(&self) -> bool {
        match self.kind {
            FormKind::Registration => self.known_phone_numbers.is_settled(),
            FormKind::SignUp => {
                self.known_phone_numbers.is_settled() && self.known_usernames.is_settled()
            }
            FormKind::Login => true,
        }
    }

    pub fn can_submit(&self) -> bool {
        self.caches_settled() && self.all_touched() && self.is_dirty() && self.is_valid()
    }

    /// Clears values and touched flags; caches are kept.
    pub fn reset(&mut self) {
        for value in self.values.values_mut() {
            value.clear();
        }
        self.touched.clear();
        self.revalidate();
    }

    pub fn known_phone_numbers(&self) -> &KnownValues {
        &self.known_phone_numbers
    }

    pub fn known_usernames(&self) -> &KnownValues {
        &self.known_usernames
    }

    /// Mutates the phone cache, then re-runs rules that depend on it.
    pub fn update_known_phone_numbers(&mut self, f: impl FnOnce(&mut KnownValues)) {
        f(&mut self.known_phone_numbers);
        self.revalidate();
    }

    pub fn update_known_usernames(&mut self, f: impl FnOnce(&mut KnownValues)) {
        f(&mut self.known_usernames);
        self.revalidate();
    }

    fn revalidate(&mut self) {
        let mut errors = BTreeMap::new();
        for field in self.kind.fields() {
            let value = self.value(*field);
            let field_errors = match (self.kind, field) {
                (FormKind::Login, Field::Username) => {
                    if value.trim().is_empty() {
                        vec![ValidationError::Required(Field::Username)]
                    } else {
                        Vec::new()
                    }
                }
                (FormKind::Login, Field::Password) => {
                    if value.is_empty() {
                        vec![ValidationError::Required(Field::Password)]
                    } else {
                        Vec::new()
                    }
                }
                (_, Field::FullName) => validate_full_name(value),
                (_, Field::PhoneNumber) => validate_phone_number(value, &self.known_phone_numbers),
                (_, Field::Username) => validate_username(value, &self.known_usernames),
                (_, Field::Password) => validate_password(value),
            };
            errors.insert(*field, field_errors);
        }
        self.errors = errors;
    }

    fn collect_errors(&self, include: impl Fn(Field) -> bool) -> Vec<FieldError> {
        self.errors
            .iter()
            .filter(|(field, _)| include(**field))
            .flat_map(|(field, errors)| {
                errors.iter().map(|error| FieldError {
                    field: *field,
                    error: error.clone(),
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::{Field, FormGate, FormKind};
    use crate::form::rules::{UsernameViolation, ValidationError};

    fn ready_registration() -> FormGate {
        let mut gate = FormGate::new(FormKind::Registration);
        gate.update_known_phone_numbers(|known| known.load(["0912345678".to_string()]));
        gate
    }

    #[test]
    fn pending_cache_disables_submission() {
        let mut gate = FormGate::new(FormKind::Registration);
        gate.set_field(Field::FullName, "Alice");
        gate.set_field(Field::PhoneNumber, "0987654321");
        assert!(gate.is_valid());
        assert!(!gate.can_submit());

        gate.update_known_phone_numbers(|known| known.load(Vec::new()));
        assert!(gate.can_submit());
    }

    #[test]
    fn errors_are_per_field_and_independent() {
        let mut gate = ready_registration();
        gate.set_field(Field::FullName, "   ");
        gate.set_field(Field::PhoneNumber, "0912345678");

        assert_eq!(
            gate.field_errors(Field::FullName),
            &[ValidationError::Required(Field::FullName)]
        );
        assert_eq!(
            gate.field_errors(Field::PhoneNumber),
            &[ValidationError::PhoneNumberTaken]
        );
        assert!(!gate.can_submit());
    }

    #[test]
    fn untouched_fields_block_submission_and_hide_errors() {
        let mut gate = ready_registration();
        gate.set_field(Field::FullName, "Alice");
        assert!(!gate.all_touched());
        assert!(!gate.can_submit());
        assert!(gate.visible_errors().is_empty());
        assert_eq!(gate.all_errors().len(), 1);
    }

    #[test]
    fn full_name_is_trimmed_at_start_on_input() {
        let mut gate = ready_registration();
        gate.set_field(Field::FullName, "  Alice ");
        assert_eq!(gate.value(Field::FullName), "Alice ");
    }

    #[test]
    fn set_field_rejects_fields_outside_form() {
        let mut gate = ready_registration();
        assert!(!gate.set_field(Field::Password, "secret"));
    }

    #[test]
    fn sign_up_requires_both_caches_and_reports_username_rules() {
        let mut gate = FormGate::new(FormKind::SignUp);
        gate.update_known_phone_numbers(|known| known.load(Vec::new()));
        gate.set_field(Field::FullName, "Vu");
        gate.set_field(Field::PhoneNumber, "0912345678");
        gate.set_field(Field::Username, "ab");
        gate.set_field(Field::Password, "leDinh@vu6");
        assert_eq!(
            gate.field_errors(Field::Username),
            &[ValidationError::Username(UsernameViolation::Length)]
        );

        gate.set_field(Field::Username, "le.vu.dinh");
        assert!(gate.is_valid());
        assert!(!gate.can_submit());

        gate.update_known_usernames(|known| known.load(["le.vu.dinh".to_string()]));
        assert_eq!(
            gate.field_errors(Field::Username),
            &[ValidationError::UsernameTaken]
        );
    }

    #[test]
    fn login_only_checks_presence() {
        let mut gate = FormGate::new(FormKind::Login);
        gate.set_field(Field::Username, "ab");
        gate.set_field(Field::Password, "x");
        assert!(gate.can_submit());
    }

    #[test]
    fn reset_clears_values_and_touched() {
        let mut gate = ready_registration();
        gate.set_field(Field::FullName, "Alice");
        gate.set_field(Field::PhoneNumber, "0987654321");
        gate.reset();
        assert!(!gate.is_dirty());
        assert!(!gate.all_touched());
        assert!(gate.known_phone_numbers().contains("0912345678"));
    }
}
