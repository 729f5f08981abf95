//! Credential sign-up and login workflows.
//!
//! # Responsibility
//! - Sign-up: same state machine as registration over the four-field form,
//!   with phone and username caches loaded from the account store.
//! - Login: presence check, then an equality lookup on username and
//!   password digest.
//!
//! # Invariants
//! - Passwords are hashed before any repository call.
//! - Login succeeds only when exactly one document matches.

use crate::form::{Field, FieldError, FormGate, FormKind, KnownValues};
use crate::model::account::{hash_password, Account, NewAccount};
use crate::repo::account_repo::AccountRepository;
use crate::repo::user_repo::RepoError;
use crate::repo::UniqueField;
use crate::service::{
    Notice, RegistryError, Workflow, WorkflowState, MSG_BAD_CREDENTIALS, MSG_REGISTERED,
    MSG_TRY_AGAIN,
};
use log::{error, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Login failure.
#[derive(Debug)]
pub enum AuthError {
    Validation(Vec<FieldError>),
    /// No document, or more than one, matched the credentials.
    InvalidCredentials,
    StoreUnavailable(RepoError),
}

impl AuthError {
    /// User-facing notice text for this failure.
    pub fn message(&self) -> &'static str {
        match self {
            Self::Validation(_) | Self::StoreUnavailable(_) => MSG_TRY_AGAIN,
            Self::InvalidCredentials => MSG_BAD_CREDENTIALS,
        }
    }
}

impl Display for AuthError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(errors) => {
                write!(f, "form has {} validation error(s)", errors.len())
            }
            Self::InvalidCredentials => write!(f, "username or password is incorrect"),
            Self::StoreUnavailable(err) => write!(f, "store unavailable: {err}"),
        }
    }
}

impl Error for AuthError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::StoreUnavailable(err) => Some(err),
            Self::Validation(_) | Self::InvalidCredentials => None,
        }
    }
}

/// Sign-up and login controller over an injected account store.
pub struct AccountService<R: AccountRepository> {
    repo: R,
    sign_up: Workflow,
}

impl<R: AccountRepository> AccountService<R> {
    pub fn new(repo: R) -> Self {
        Self {
            repo,
            sign_up: Workflow::new(FormGate::new(FormKind::SignUp)),
        }
    }

    /// Loads registered phone numbers and usernames for the sign-up form.
    pub fn mount(&mut self) -> Result<(), RegistryError> {
        match self.repo.list_all() {
            Ok(accounts) => {
                info!(
                    "event=sign_up_mount module=service status=ok known={}",
                    accounts.len()
                );
                let (phone_numbers, usernames): (Vec<_>, Vec<_>) = accounts
                    .into_iter()
                    .map(|account| (account.phone_number, account.username))
                    .unzip();
                let form = &mut self.sign_up.form;
                form.update_known_phone_numbers(|known| known.load(phone_numbers));
                form.update_known_usernames(|known| known.load(usernames));
                Ok(())
            }
            Err(err) => {
                error!("event=sign_up_mount module=service status=error error={err}");
                let form = &mut self.sign_up.form;
                form.update_known_phone_numbers(KnownValues::mark_unavailable);
                form.update_known_usernames(KnownValues::mark_unavailable);
                self.sign_up.show(Notice::error(MSG_TRY_AGAIN));
                Err(RegistryError::StoreUnavailable(err))
            }
        }
    }

    pub fn set_field(&mut self, field: Field, value: &str) -> bool {
        self.sign_up.form.set_field(field, value)
    }

    pub fn form(&self) -> &FormGate {
        &self.sign_up.form
    }

    pub fn state(&self) -> WorkflowState {
        self.sign_up.state()
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.sign_up.notice()
    }

    pub fn dismiss_notice(&mut self) {
        self.sign_up.dismiss_notice();
    }

    pub fn can_submit(&self) -> bool {
        self.sign_up.can_submit()
    }

    /// Submits the full credential document.
    pub fn submit(&mut self) -> Result<Account, RegistryError> {
        if let Err(err) = self.sign_up.begin_submit() {
            warn!("event=sign_up_submit module=service status=blocked reason={err}");
            return Err(err);
        }

        let form = &self.sign_up.form;
        let document = NewAccount::from_input(
            form.value(Field::FullName),
            form.value(Field::PhoneNumber),
            form.value(Field::Username),
            form.value(Field::Password),
        );

        match self.repo.add(&document) {
            Ok(account) => {
                info!("event=sign_up_submit module=service status=ok id={}", account.id);
                let phone_number = account.phone_number.clone();
                let username = account.username.clone();
                let form = &mut self.sign_up.form;
                form.update_known_phone_numbers(|known| known.insert(phone_number));
                form.update_known_usernames(|known| known.insert(username));
                self.sign_up.succeed(MSG_REGISTERED);
                Ok(account)
            }
            Err(err) => {
                error!("event=sign_up_submit module=service status=error error={err}");
                let form = &mut self.sign_up.form;
                match err {
                    RepoError::Duplicate(UniqueField::PhoneNumber) => {
                        form.update_known_phone_numbers(|known| {
                            known.insert(document.phone_number.clone())
                        });
                    }
                    RepoError::Duplicate(UniqueField::Username) => {
                        form.update_known_usernames(|known| known.insert(document.username.clone()));
                    }
                    _ => {}
                }
                self.sign_up.fail(MSG_TRY_AGAIN);
                Err(RegistryError::InsertFailed(err))
            }
        }
    }

    /// Looks up the account matching `username` and `password`.
    pub fn login(&self, username: &str, password: &str) -> Result<Account, AuthError> {
        let mut gate = FormGate::new(FormKind::Login);
        gate.set_field(Field::Username, username);
        gate.set_field(Field::Password, password);
        if !gate.can_submit() {
            return Err(AuthError::Validation(gate.all_errors()));
        }

        let username = gate.value(Field::Username).trim();
        let mut matches = self
            .repo
            .find_by_credentials(username, &hash_password(password))
            .map_err(|err| {
                error!("event=login module=service status=error error={err}");
                AuthError::StoreUnavailable(err)
            })?;

        if matches.len() != 1 {
            warn!(
                "event=login module=service status=rejected matches={}",
                matches.len()
            );
            return Err(AuthError::InvalidCredentials);
        }
        let account = matches.remove(0);
        info!("event=login module=service status=ok id={}", account.id);
        Ok(account)
    }
}
