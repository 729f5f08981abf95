//! Core use-case workflows.
//!
//! # Responsibility
//! - Orchestrate Form Gate checks and repository calls per screen.
//! - Keep the presentation layer decoupled from storage details.
//!
//! # Invariants
//! - A store mutation is attempted only from `WorkflowState::Submitting`.
//! - Every I/O failure is reported once through a dismissible `Notice`;
//!   nothing is retried automatically.

pub mod account_service;
pub mod registration_service;

use crate::form::{FieldError, FormGate};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub const MSG_USER_ADDED: &str = "Congratulations!\nUser has been added successfully.";
pub const MSG_REGISTERED: &str = "Congratulations!\nYou have successfully registered.";
pub const MSG_LOGGED_IN: &str = "Congratulations!\nYou have successfully logged in.";
pub const MSG_TRY_AGAIN: &str = "Oops, something went wrong!\nPlease try again later.";
pub const MSG_BAD_CREDENTIALS: &str =
    "Oops, something went wrong!\nYour username or password is incorrect.";

/// Screen-level submission state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkflowState {
    Editing,
    Submitting,
    Success,
    Failure,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Error,
}

/// Dismissible message for the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: &'static str,
}

impl Notice {
    pub fn success(message: &'static str) -> Self {
        Self {
            kind: NoticeKind::Success,
            message,
        }
    }

    pub fn error(message: &'static str) -> Self {
        Self {
            kind: NoticeKind::Error,
            message,
        }
    }
}

/// Failure of a submit or list operation on a registry-like screen.
#[derive(Debug)]
pub enum RegistryError {
    /// Workflow is not in `Editing`, or the uniqueness cache is still loading.
    SubmissionDisabled,
    /// Form rules failed; the store was not called.
    Validation(Vec<FieldError>),
    /// Listing or schema setup could not reach storage.
    StoreUnavailable(crate::RepoError),
    /// Insert rejected by a constraint or failed on I/O; nothing was persisted.
    InsertFailed(crate::RepoError),
}

impl Display for RegistryError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SubmissionDisabled => write!(f, "submission is disabled"),
            Self::Validation(errors) => {
                write!(f, "form has {} validation error(s)", errors.len())
            }
            Self::StoreUnavailable(err) => write!(f, "store unavailable: {err}"),
            Self::InsertFailed(err) => write!(f, "insert failed: {err}"),
        }
    }
}

impl Error for RegistryError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::StoreUnavailable(err) | Self::InsertFailed(err) => Some(err),
            Self::SubmissionDisabled | Self::Validation(_) => None,
        }
    }
}

/// Form plus state machine shared by the submitting screens.
#[derive(Debug, Clone)]
pub(crate) struct Workflow {
    pub(crate) form: FormGate,
    state: WorkflowState,
    notice: Option<Notice>,
}

impl Workflow {
    pub(crate) fn new(form: FormGate) -> Self {
        Self {
            form,
            state: WorkflowState::Editing,
            notice: None,
        }
    }

    pub(crate) fn state(&self) -> WorkflowState {
        self.state
    }

    pub(crate) fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub(crate) fn show(&mut self, notice: Notice) {
        self.notice = Some(notice);
    }

    pub(crate) fn can_submit(&self) -> bool {
        self.state == WorkflowState::Editing && self.form.can_submit()
    }

    /// Moves `Editing -> Submitting` when the form allows it.
    pub(crate) fn begin_submit(&mut self) -> Result<(), RegistryError> {
        if self.state != WorkflowState::Editing || !self.form.caches_settled() {
            return Err(RegistryError::SubmissionDisabled);
        }
        if !self.form.can_submit() {
            let errors = self.form.all_errors();
            if errors.is_empty() {
                return Err(RegistryError::SubmissionDisabled);
            }
            return Err(RegistryError::Validation(errors));
        }
        self.state = WorkflowState::Submitting;
        Ok(())
    }

    /// `Submitting -> Success`: fields are cleared, caches are kept.
    pub(crate) fn succeed(&mut self, message: &'static str) {
        self.form.reset();
        self.state = WorkflowState::Success;
        self.notice = Some(Notice::success(message));
    }

    /// `Submitting -> Failure`: fields are kept for a retry.
    pub(crate) fn fail(&mut self, message: &'static str) {
        self.state = WorkflowState::Failure;
        self.notice = Some(Notice::error(message));
    }

    /// Dismisses the notice; terminal states return to `Editing`.
    pub(crate) fn dismiss_notice(&mut self) {
        self.notice = None;
        if matches!(self.state, WorkflowState::Success | WorkflowState::Failure) {
            self.state = WorkflowState::Editing;
        }
    }
}
