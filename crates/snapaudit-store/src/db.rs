//! Database connection management
//!
//! Provides utilities for opening and configuring SQLite connections

#![allow(clippy::result_large_err)]

use crate::errors::{from_rusqlite, io_error, Result};
use crate::migrations::apply_migrations;
use rusqlite::Connection;
use snapaudit_core::config::DatabaseConfig;
use std::path::Path;
use std::time::Duration;

/// Open a SQLite database at the given path
pub fn open<P: AsRef<Path>>(path: P) -> Result<Connection> {
    Connection::open(path).map_err(from_rusqlite)
}

/// Open an in-memory SQLite database (for testing)
pub fn open_in_memory() -> Result<Connection> {
    Connection::open_in_memory().map_err(from_rusqlite)
}

/// Configure a connection for concurrent writers
///
/// Returns the journal mode SQLite settled on; in-memory databases report
/// `memory` instead of `wal`.
pub fn configure(conn: &Connection, busy_timeout: Duration) -> Result<String> {
    conn.busy_timeout(busy_timeout).map_err(from_rusqlite)?;

    conn.pragma_update(None, "foreign_keys", "ON")
        .map_err(from_rusqlite)?;

    // journal_mode answers with a row, so it needs the checked variant
    let mode: String = conn
        .pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))
        .map_err(from_rusqlite)?;

    Ok(mode)
}

/// Open, configure and migrate the database described by `config`
///
/// Creates the parent directory if needed.
pub fn open_store(config: &DatabaseConfig) -> Result<Connection> {
    if let Some(parent) = config.path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(|e| io_error("open_store", e))?;
        }
    }

    let mut conn = open(&config.path)?;
    let mode = configure(&conn, config.busy_timeout())?;
    apply_migrations(&mut conn)?;

    tracing::debug!(
        path = %config.path.display(),
        journal_mode = %mode,
        "Opened audit store"
    );

    Ok(conn)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configure_file_database_uses_wal() {
        let dir = tempfile::tempdir().unwrap();
        let conn = open(dir.path().join("store.db")).unwrap();
        let mode = configure(&conn, Duration::from_millis(100)).unwrap();
        assert_eq!(mode.to_lowercase(), "wal");
    }

    #[test]
    fn test_open_store_creates_parent_dir() {
        let dir = tempfile::tempdir().unwrap();
        let config = DatabaseConfig {
            path: dir.path().join("nested").join("store.db"),
            busy_timeout_ms: 100,
        };
        let conn = open_store(&config).unwrap();
        let tables: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = 'emby_users'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(tables, 1);
    }
}
