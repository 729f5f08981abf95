//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose registry, sign-up and login use-cases to Dart via FRB.
//! - Turn every core error into a message envelope.
//!
//! # Invariants
//! - Exported functions must not panic across FFI boundary.
//! - Each call opens its own connection; the store is never a global handle.

use log::warn;
use registry_core::db::open_db;
use registry_core::service::MSG_LOGGED_IN;
use registry_core::{
    core_version as core_version_inner, default_log_level, init_logging as init_logging_inner,
    ping as ping_inner, AccountService, Field, FieldError, FormGate, FormKind,
    RegistrationService, RegistryError, SqliteAccountRepository, SqliteUserRepository,
    UserRecord, UserRepository,
};
use rusqlite::Connection;
use std::path::PathBuf;
use std::sync::OnceLock;

const REGISTRY_DB_FILE_NAME: &str = "registry.sqlite3";
const REGISTRY_DB_PATH_ENV: &str = "REGISTRY_DB_PATH";
static REGISTRY_DB_PATH: OnceLock<PathBuf> = OnceLock::new();

/// Minimal health-check API for FRB smoke integration.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// # FFI contract
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive); blank
///   selects the build-mode default.
/// - `log_dir`: absolute directory path where rolling logs are written.
/// - Returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    let level = if level.trim().is_empty() {
        default_log_level()
    } else {
        level.as_str()
    };
    match init_logging_inner(level, log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err.to_string(),
    }
}

/// One registry row for the list screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserItem {
    pub id: i64,
    pub full_name: String,
    pub phone_number: String,
}

/// List envelope for the registry list screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserListResponse {
    pub ok: bool,
    /// Rows in insertion order (empty on failure).
    pub items: Vec<UserItem>,
    /// Dismissible notice text on failure, empty otherwise.
    pub message: String,
}

/// Inline error for one field, one entry per failing rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldErrorItem {
    /// `full_name|phone_number|username|password`.
    pub field: String,
    pub message: String,
}

/// Generic submit envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionResponse {
    pub ok: bool,
    /// Created or matched record id.
    pub record_id: Option<i64>,
    /// Notice text for the presentation layer.
    pub message: String,
    /// Present when submission was blocked client-side.
    pub field_errors: Vec<FieldErrorItem>,
}

impl ActionResponse {
    fn success(message: impl Into<String>, record_id: i64) -> Self {
        Self {
            ok: true,
            record_id: Some(record_id),
            message: message.into(),
            field_errors: Vec::new(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            record_id: None,
            message: message.into(),
            field_errors: Vec::new(),
        }
    }

    fn blocked(errors: &[FieldError]) -> Self {
        Self {
            ok: false,
            record_id: None,
            message: "Please fix the highlighted fields.".to_string(),
            field_errors: errors.iter().map(to_field_error_item).collect(),
        }
    }
}

/// Lists all registered users in insertion order.
#[flutter_rust_bridge::frb(sync)]
pub fn registry_list_users() -> UserListResponse {
    let listed = with_connection(|conn| {
        let repo = SqliteUserRepository::bootstrap(conn).map_err(|err| err.to_string())?;
        RegistrationService::new(repo)
            .list_users()
            .map_err(|err| err.to_string())
    });

    match listed {
        Ok(users) => UserListResponse {
            ok: true,
            items: users.into_iter().map(to_user_item).collect(),
            message: String::new(),
        },
        Err(err) => {
            warn!("event=ffi_list_users module=ffi status=error error={err}");
            UserListResponse {
                ok: false,
                items: Vec::new(),
                message: registry_core::service::MSG_TRY_AGAIN.to_string(),
            }
        }
    }
}

/// Runs registration-form rules against the current registry.
///
/// Returns every failing rule; empty means the form may be submitted.
#[flutter_rust_bridge::frb(sync)]
pub fn registry_validate(full_name: String, phone_number: String) -> Vec<FieldErrorItem> {
    let known = with_connection(|conn| {
        let repo = SqliteUserRepository::bootstrap(conn).map_err(|err| err.to_string())?;
        repo.list_phone_numbers().map_err(|err| err.to_string())
    });

    let mut gate = FormGate::new(FormKind::Registration);
    gate.update_known_phone_numbers(|cache| match known {
        Ok(phone_numbers) => cache.load(phone_numbers),
        Err(_) => cache.mark_unavailable(),
    });
    gate.set_field(Field::FullName, &full_name);
    gate.set_field(Field::PhoneNumber, &phone_number);
    gate.all_errors().iter().map(to_field_error_item).collect()
}

/// Registers one user through the full validate-then-insert workflow.
#[flutter_rust_bridge::frb(sync)]
pub fn registry_register(full_name: String, phone_number: String) -> ActionResponse {
    let outcome = with_connection(|conn| {
        let repo = SqliteUserRepository::bootstrap(conn).map_err(|err| err.to_string())?;
        let mut service = RegistrationService::new(repo);
        // A failed listing leaves uniqueness to the storage constraint.
        if let Err(err) = service.mount() {
            warn!("event=ffi_mount module=ffi status=error screen=registration error={err}");
        }
        service.set_field(Field::FullName, &full_name);
        service.set_field(Field::PhoneNumber, &phone_number);
        let result = service.submit();
        let message = service
            .notice()
            .map(|notice| notice.message.to_string())
            .unwrap_or_default();
        Ok((result, message))
    });

    match outcome {
        Ok((Ok(record), message)) => ActionResponse::success(message, record.id.0),
        Ok((Err(err), message)) => submit_failure(err, message),
        Err(err) => ActionResponse::failure(format!("registry_register failed: {err}")),
    }
}

/// Submits a credential document through the sign-up workflow.
#[flutter_rust_bridge::frb(sync)]
pub fn account_sign_up(
    full_name: String,
    phone_number: String,
    username: String,
    password: String,
) -> ActionResponse {
    let outcome = with_connection(|conn| {
        let repo = SqliteAccountRepository::bootstrap(conn).map_err(|err| err.to_string())?;
        let mut service = AccountService::new(repo);
        if let Err(err) = service.mount() {
            warn!("event=ffi_mount module=ffi status=error screen=sign_up error={err}");
        }
        service.set_field(Field::FullName, &full_name);
        service.set_field(Field::PhoneNumber, &phone_number);
        service.set_field(Field::Username, &username);
        service.set_field(Field::Password, &password);
        let result = service.submit();
        let message = service
            .notice()
            .map(|notice| notice.message.to_string())
            .unwrap_or_default();
        Ok((result, message))
    });

    match outcome {
        Ok((Ok(account), message)) => ActionResponse::success(message, account.id),
        Ok((Err(err), message)) => submit_failure(err, message),
        Err(err) => ActionResponse::failure(format!("account_sign_up failed: {err}")),
    }
}

/// Logs in with username and password.
#[flutter_rust_bridge::frb(sync)]
pub fn account_login(username: String, password: String) -> ActionResponse {
    let outcome = with_connection(|conn| {
        let repo = SqliteAccountRepository::bootstrap(conn).map_err(|err| err.to_string())?;
        Ok(AccountService::new(repo).login(&username, &password))
    });

    match outcome {
        Ok(Ok(account)) => ActionResponse::success(MSG_LOGGED_IN, account.id),
        Ok(Err(registry_core::AuthError::Validation(errors))) => ActionResponse::blocked(&errors),
        Ok(Err(err)) => ActionResponse::failure(err.message()),
        Err(err) => ActionResponse::failure(format!("account_login failed: {err}")),
    }
}

fn submit_failure(err: RegistryError, notice: String) -> ActionResponse {
    match err {
        RegistryError::Validation(errors) => ActionResponse::blocked(&errors),
        RegistryError::SubmissionDisabled => ActionResponse::failure("Submission is disabled."),
        RegistryError::StoreUnavailable(_) | RegistryError::InsertFailed(_) => {
            warn!("event=ffi_submit module=ffi status=error error={err}");
            ActionResponse::failure(notice)
        }
    }
}

fn resolve_registry_db_path() -> PathBuf {
    REGISTRY_DB_PATH
        .get_or_init(|| {
            if let Ok(raw) = std::env::var(REGISTRY_DB_PATH_ENV) {
                let trimmed = raw.trim();
                if !trimmed.is_empty() {
                    return PathBuf::from(trimmed);
                }
            }
            std::env::temp_dir().join(REGISTRY_DB_FILE_NAME)
        })
        .clone()
}

fn with_connection<T>(f: impl FnOnce(&Connection) -> Result<T, String>) -> Result<T, String> {
    let conn = open_db(resolve_registry_db_path())
        .map_err(|err| format!("registry DB open failed: {err}"))?;
    f(&conn)
}

fn to_user_item(user: UserRecord) -> UserItem {
    UserItem {
        id: user.id.0,
        full_name: user.full_name,
        phone_number: user.phone_number,
    }
}

fn to_field_error_item(error: &FieldError) -> FieldErrorItem {
    FieldErrorItem {
        field: error.field.as_str().to_string(),
        message: error.error.message().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::{
        account_login, account_sign_up, core_version, init_logging, ping, registry_list_users,
        registry_register, registry_validate,
    };
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::time::{SystemTime, UNIX_EPOCH};

    static COUNTER: AtomicU64 = AtomicU64::new(0);

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }

    #[test]
    fn init_logging_rejects_bad_input() {
        assert!(!init_logging("info".to_string(), String::new()).is_empty());
        assert!(!init_logging("verbose".to_string(), "tmp/logs".to_string()).is_empty());
    }

    #[test]
    fn init_logging_blank_level_uses_build_default() {
        let error = init_logging("  ".to_string(), "tmp/logs".to_string());
        assert!(error.contains("absolute"), "{error}");
        assert!(!error.contains("unsupported log level"));
    }

    #[test]
    fn register_then_list_contains_new_user() {
        let phone = unique_phone();
        let created = registry_register("  Alice ".to_string(), phone.clone());
        assert!(created.ok, "{}", created.message);
        let id = created.record_id.expect("register should return record_id");

        let listed = registry_list_users();
        assert!(listed.ok);
        let item = listed
            .items
            .iter()
            .find(|item| item.id == id)
            .expect("new user should be listed");
        assert_eq!(item.full_name, "Alice");
        assert_eq!(item.phone_number, phone);

        let again = registry_register("Bob".to_string(), phone);
        assert!(!again.ok);
        assert_eq!(again.field_errors.len(), 1);
        assert_eq!(again.field_errors[0].field, "phone_number");
    }

    #[test]
    fn validate_reports_each_field() {
        let errors = registry_validate(String::new(), "123".to_string());
        let fields = errors
            .iter()
            .map(|error| error.field.as_str())
            .collect::<Vec<_>>();
        assert_eq!(fields, vec!["full_name", "phone_number"]);
        assert_eq!(errors[1].message, "Invalid phone number");
    }

    #[test]
    fn sign_up_then_login() {
        let phone = unique_phone();
        let username = format!("user.{}", &phone[2..]);
        let signed_up = account_sign_up(
            "Vu".to_string(),
            phone,
            username.clone(),
            "leDinh@vu6".to_string(),
        );
        assert!(signed_up.ok, "{}", signed_up.message);

        let logged_in = account_login(username.clone(), "leDinh@vu6".to_string());
        assert!(logged_in.ok, "{}", logged_in.message);
        assert_eq!(logged_in.record_id, signed_up.record_id);

        let rejected = account_login(username, "wrong@Pass1".to_string());
        assert!(!rejected.ok);
        assert!(rejected.message.contains("incorrect"));
    }

    // Valid `09xxxxxxxx` number unlikely to exist in the shared test database.
    fn unique_phone() -> String {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("time went backwards")
            .as_nanos() as u64;
        let seed = nanos.wrapping_add(COUNTER.fetch_add(1, Ordering::Relaxed) * 7_919);
        format!("09{:08}", seed % 100_000_000)
    }
}
