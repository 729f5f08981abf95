//! Local user-registry workflow.
//!
//! # Responsibility
//! - Load the phone-number cache at mount, gate submissions through the
//!   Form Gate and insert through `UserRepository`.
//! - Surface results as `WorkflowState` transitions plus a `Notice`.
//!
//! # Invariants
//! - Submissions are disabled until the mount listing has completed.
//! - A blocked submission never reaches `UserRepository::insert`.

use crate::form::{Field, FormGate, FormKind, KnownValues};
use crate::model::user::{NewUser, UserRecord};
use crate::repo::user_repo::{RepoError, UserRepository};
use crate::repo::UniqueField;
use crate::service::{
    Notice, RegistryError, Workflow, WorkflowState, MSG_TRY_AGAIN, MSG_USER_ADDED,
};
use log::{error, info, warn};

/// Registration screen controller over an injected registry store.
pub struct RegistrationService<R: UserRepository> {
    repo: R,
    workflow: Workflow,
}

impl<R: UserRepository> RegistrationService<R> {
    pub fn new(repo: R) -> Self {
        Self {
            repo,
            workflow: Workflow::new(FormGate::new(FormKind::Registration)),
        }
    }

    /// Ensures the schema and loads registered phone numbers.
    ///
    /// On failure the cache is marked unavailable, submissions stay enabled
    /// (storage still enforces uniqueness) and an error notice is shown.
    pub fn mount(&mut self) -> Result<(), RegistryError> {
        let loaded = self
            .repo
            .ensure_schema()
            .and_then(|()| self.repo.list_phone_numbers());
        match loaded {
            Ok(phone_numbers) => {
                info!(
                    "event=registration_mount module=service status=ok known={}",
                    phone_numbers.len()
                );
                self.workflow
                    .form
                    .update_known_phone_numbers(|known| known.load(phone_numbers));
                Ok(())
            }
            Err(err) => {
                error!("event=registration_mount module=service status=error error={err}");
                self.workflow
                    .form
                    .update_known_phone_numbers(KnownValues::mark_unavailable);
                self.workflow.show(Notice::error(MSG_TRY_AGAIN));
                Err(RegistryError::StoreUnavailable(err))
            }
        }
    }

    pub fn set_field(&mut self, field: Field, value: &str) -> bool {
        self.workflow.form.set_field(field, value)
    }

    pub fn form(&self) -> &FormGate {
        &self.workflow.form
    }

    pub fn state(&self) -> WorkflowState {
        self.workflow.state()
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.workflow.notice()
    }

    pub fn dismiss_notice(&mut self) {
        self.workflow.dismiss_notice();
    }

    pub fn can_submit(&self) -> bool {
        self.workflow.can_submit()
    }

    /// Validates, inserts, and updates the cache on success.
    pub fn submit(&mut self) -> Result<UserRecord, RegistryError> {
        if let Err(err) = self.workflow.begin_submit() {
            warn!("event=registration_submit module=service status=blocked reason={err}");
            return Err(err);
        }

        let form = &self.workflow.form;
        let new_user = NewUser::new(form.value(Field::FullName), form.value(Field::PhoneNumber));

        match self.repo.insert(&new_user) {
            Ok(record) => {
                info!(
                    "event=registration_submit module=service status=ok id={}",
                    record.id
                );
                let phone_number = record.phone_number.clone();
                self.workflow
                    .form
                    .update_known_phone_numbers(|known| known.insert(phone_number));
                self.workflow.succeed(MSG_USER_ADDED);
                Ok(record)
            }
            Err(err) => {
                error!("event=registration_submit module=service status=error error={err}");
                if matches!(err, RepoError::Duplicate(UniqueField::PhoneNumber)) {
                    let phone_number = new_user.phone_number.trim().to_string();
                    self.workflow
                        .form
                        .update_known_phone_numbers(|known| known.insert(phone_number));
                }
                self.workflow.fail(MSG_TRY_AGAIN);
                Err(RegistryError::InsertFailed(err))
            }
        }
    }

    /// Lists every registered user for the list screen.
    pub fn list_users(&self) -> Result<Vec<UserRecord>, RegistryError> {
        self.repo.list_all().map_err(|err| {
            error!("event=registry_list module=service status=error error={err}");
            RegistryError::StoreUnavailable(err)
        })
    }
}
