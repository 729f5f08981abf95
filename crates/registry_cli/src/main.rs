//! CLI smoke entry point.
//!
//! # Responsibility
//! - Verify `registry_core` linkage and schema bootstrap without the mobile shell.
//! - With a database path argument, report how many users it holds.

use registry_core::db::migrations::latest_version;
use registry_core::{open_db, open_db_in_memory, SqliteUserRepository, UserRepository};
use std::process::ExitCode;

fn main() -> ExitCode {
    println!("registry_core ping={}", registry_core::ping());
    println!("registry_core version={}", registry_core::core_version());
    println!("registry_core schema_version={}", latest_version());

    let opened = match std::env::args().nth(1) {
        Some(path) => open_db(path),
        None => open_db_in_memory(),
    };
    let conn = match opened {
        Ok(conn) => conn,
        Err(err) => {
            eprintln!("registry_core db_open=error error={err}");
            return ExitCode::FAILURE;
        }
    };

    match SqliteUserRepository::try_new(&conn).and_then(|repo| repo.list_all()) {
        Ok(users) => {
            println!("registry_core users={}", users.len());
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("registry_core users=error error={err}");
            ExitCode::FAILURE
        }
    }
}
