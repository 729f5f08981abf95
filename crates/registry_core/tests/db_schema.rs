use registry_core::db::migrations::latest_version;
use registry_core::db::{ensure_schema, open_db, open_db_in_memory, DbError};
use registry_core::{RepoError, SqliteUserRepository, UserRepository};
use rusqlite::Connection;

#[test]
fn open_db_in_memory_creates_registry_tables() {
    let conn = open_db_in_memory().unwrap();

    assert_eq!(schema_version(&conn), latest_version());
    assert_table_exists(&conn, "users");
    assert_table_exists(&conn, "accounts");
}

#[test]
fn ensure_schema_is_idempotent() {
    let conn = open_db_in_memory().unwrap();
    ensure_schema(&conn).unwrap();
    ensure_schema(&conn).unwrap();

    let repo = SqliteUserRepository::try_new(&conn).unwrap();
    repo.ensure_schema().unwrap();
    assert_eq!(schema_version(&conn), latest_version());
}

#[test]
fn ensure_schema_keeps_existing_rows() {
    let conn = open_db_in_memory().unwrap();
    conn.execute(
        "INSERT INTO users (full_name, phone_number) VALUES ('Alice', '0912345678');",
        [],
    )
    .unwrap();

    ensure_schema(&conn).unwrap();

    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM users;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(count, 1);
}

#[test]
fn repository_rejects_connection_without_schema() {
    let conn = Connection::open_in_memory().unwrap();
    let err = SqliteUserRepository::try_new(&conn).err().unwrap();
    assert!(matches!(err, RepoError::SchemaMissing("users")));

    let repo = SqliteUserRepository::bootstrap(&conn).unwrap();
    assert!(repo.list_all().unwrap().is_empty());
}

#[test]
fn reopening_file_database_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("registry.db");

    let first = open_db(&path).unwrap();
    SqliteUserRepository::try_new(&first)
        .unwrap()
        .insert(&registry_core::NewUser::new("Alice", "0912345678"))
        .unwrap();
    drop(first);

    let second = open_db(&path).unwrap();
    assert_eq!(schema_version(&second), latest_version());
    let users = SqliteUserRepository::try_new(&second)
        .unwrap()
        .list_all()
        .unwrap();
    assert_eq!(users.len(), 1);
}

#[test]
fn opening_database_with_newer_schema_version_returns_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.db");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("PRAGMA user_version = 999;").unwrap();
    drop(conn);

    match open_db(&path).unwrap_err() {
        DbError::UnsupportedSchemaVersion {
            db_version,
            latest_supported,
        } => {
            assert_eq!(db_version, 999);
            assert_eq!(latest_supported, latest_version());
        }
        other => panic!("unexpected error: {other}"),
    }
}

fn schema_version(conn: &Connection) -> u32 {
    conn.query_row("PRAGMA user_version;", [], |row| row.get(0))
        .unwrap()
}

fn assert_table_exists(conn: &Connection, table_name: &str) {
    let exists: i64 = conn
        .query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM sqlite_master
                WHERE type = 'table' AND name = ?1
            );",
            [table_name],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(exists, 1, "table {table_name} does not exist");
}
