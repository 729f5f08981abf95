use registry_core::db::open_db_in_memory;
use registry_core::service::{MSG_REGISTERED, MSG_USER_ADDED};
use registry_core::{
    CacheState, DbError, Field, NewUser, NoticeKind, RegistrationService, RegistryError,
    RepoError, RepoResult, SqliteUserRepository, UniqueField, UserId, UserRecord, UserRepository,
    ValidationError, WorkflowState,
};
use std::cell::{Cell, RefCell};

/// In-memory registry store that can be told to fail and counts inserts.
#[derive(Default)]
struct FakeRepository {
    fail_list: bool,
    fail_insert: bool,
    insert_calls: Cell<u32>,
    rows: RefCell<Vec<UserRecord>>,
}

impl UserRepository for &FakeRepository {
    fn ensure_schema(&self) -> RepoResult<()> {
        Ok(())
    }

    fn list_all(&self) -> RepoResult<Vec<UserRecord>> {
        if self.fail_list {
            return Err(unavailable());
        }
        Ok(self.rows.borrow().clone())
    }

    fn list_phone_numbers(&self) -> RepoResult<Vec<String>> {
        Ok(self
            .list_all()?
            .into_iter()
            .map(|user| user.phone_number)
            .collect())
    }

    fn insert(&self, user: &NewUser) -> RepoResult<UserRecord> {
        self.insert_calls.set(self.insert_calls.get() + 1);
        if self.fail_insert {
            return Err(unavailable());
        }
        let mut rows = self.rows.borrow_mut();
        let record = UserRecord {
            id: UserId(rows.len() as i64 + 1),
            full_name: user.full_name.trim().to_string(),
            phone_number: user.phone_number.clone(),
        };
        rows.push(record.clone());
        Ok(record)
    }
}

fn unavailable() -> RepoError {
    RepoError::Db(DbError::Sqlite(rusqlite::Error::InvalidQuery))
}

fn fill(service: &mut RegistrationService<impl UserRepository>, name: &str, phone: &str) {
    service.set_field(Field::FullName, name);
    service.set_field(Field::PhoneNumber, phone);
}

#[test]
fn alice_then_bob_with_same_phone_scenario() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteUserRepository::try_new(&conn).unwrap();
    let mut service = RegistrationService::new(repo);
    service.mount().unwrap();

    fill(&mut service, "Alice", "0912345678");
    let alice = service.submit().unwrap();
    assert_eq!(alice.full_name, "Alice");
    assert_eq!(service.state(), WorkflowState::Success);
    assert_eq!(service.notice().unwrap().kind, NoticeKind::Success);
    assert_eq!(service.notice().unwrap().message, MSG_USER_ADDED);
    assert_ne!(service.notice().unwrap().message, MSG_REGISTERED);
    assert_eq!(service.form().value(Field::FullName), "");
    service.dismiss_notice();
    assert_eq!(service.state(), WorkflowState::Editing);

    fill(&mut service, "Bob", "0912345678");
    assert_eq!(
        service.form().field_errors(Field::PhoneNumber),
        &[ValidationError::PhoneNumberTaken]
    );
    let err = service.submit().unwrap_err();
    assert!(matches!(err, RegistryError::Validation(_)));

    let users = service.list_users().unwrap();
    let phones = users
        .iter()
        .map(|user| user.phone_number.as_str())
        .collect::<Vec<_>>();
    assert_eq!(phones, vec!["0912345678"]);
}

#[test]
fn storage_constraint_catches_stale_cache() {
    let conn = open_db_in_memory().unwrap();
    let mut service = RegistrationService::new(SqliteUserRepository::try_new(&conn).unwrap());
    service.mount().unwrap();

    // Another screen registers the number after this one mounted.
    SqliteUserRepository::try_new(&conn)
        .unwrap()
        .insert(&NewUser::new("Alice", "0912345678"))
        .unwrap();

    fill(&mut service, "Bob", "0912345678");
    assert!(service.can_submit());
    let err = service.submit().unwrap_err();
    assert!(matches!(
        err,
        RegistryError::InsertFailed(RepoError::Duplicate(UniqueField::PhoneNumber))
    ));
    assert_eq!(service.state(), WorkflowState::Failure);
    assert_eq!(service.form().value(Field::FullName), "Bob");
    assert_eq!(service.list_users().unwrap().len(), 1);

    service.dismiss_notice();
    assert_eq!(
        service.form().field_errors(Field::PhoneNumber),
        &[ValidationError::PhoneNumberTaken]
    );
}

#[test]
fn empty_full_name_never_reaches_insert() {
    let fake = FakeRepository::default();
    let mut service = RegistrationService::new(&fake);
    service.mount().unwrap();

    fill(&mut service, "   ", "0912345678");
    assert!(!service.can_submit());
    let err = service.submit().unwrap_err();
    match err {
        RegistryError::Validation(errors) => {
            assert_eq!(errors.len(), 1);
            assert_eq!(errors[0].field, Field::FullName);
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(fake.insert_calls.get(), 0);
    assert_eq!(service.state(), WorkflowState::Editing);
}

#[test]
fn submission_is_disabled_before_mount_completes() {
    let fake = FakeRepository::default();
    let mut service = RegistrationService::new(&fake);

    fill(&mut service, "Alice", "0912345678");
    assert!(!service.can_submit());
    assert!(matches!(
        service.submit().unwrap_err(),
        RegistryError::SubmissionDisabled
    ));
    assert_eq!(fake.insert_calls.get(), 0);

    service.mount().unwrap();
    assert!(service.can_submit());
}

#[test]
fn failed_mount_reports_store_unavailable_and_keeps_form_usable() {
    let fake = FakeRepository {
        fail_list: true,
        ..FakeRepository::default()
    };
    let mut service = RegistrationService::new(&fake);

    let err = service.mount().unwrap_err();
    assert!(matches!(err, RegistryError::StoreUnavailable(_)));
    assert_eq!(
        service.form().known_phone_numbers().state(),
        CacheState::Unavailable
    );
    assert_eq!(service.notice().unwrap().kind, NoticeKind::Error);

    service.dismiss_notice();
    fill(&mut service, "Alice", "0912345678");
    assert!(service.can_submit());
    service.submit().unwrap();
    assert_eq!(fake.insert_calls.get(), 1);
}

#[test]
fn failed_insert_keeps_fields_and_requires_dismiss_before_retry() {
    let fake = FakeRepository {
        fail_insert: true,
        ..FakeRepository::default()
    };
    let mut service = RegistrationService::new(&fake);
    service.mount().unwrap();

    fill(&mut service, "Alice", "0912345678");
    assert!(matches!(
        service.submit().unwrap_err(),
        RegistryError::InsertFailed(_)
    ));
    assert_eq!(service.state(), WorkflowState::Failure);
    assert_eq!(service.form().value(Field::PhoneNumber), "0912345678");

    assert!(matches!(
        service.submit().unwrap_err(),
        RegistryError::SubmissionDisabled
    ));
    assert_eq!(fake.insert_calls.get(), 1);

    service.dismiss_notice();
    assert!(service.submit().is_err());
    assert_eq!(fake.insert_calls.get(), 2);
}

#[test]
fn list_users_maps_failure_to_store_unavailable() {
    let fake = FakeRepository {
        fail_list: true,
        ..FakeRepository::default()
    };
    let service = RegistrationService::new(&fake);
    assert!(matches!(
        service.list_users().unwrap_err(),
        RegistryError::StoreUnavailable(_)
    ));
}
