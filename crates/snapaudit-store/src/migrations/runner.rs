//! Migration runner
//!
//! Reads the recorded migrations once, verifies their checksums against the
//! embedded SQL, then applies whatever is still pending, each in its own
//! transaction.

#![allow(clippy::result_large_err)]

use crate::errors::{checksum_mismatch, from_rusqlite, migration_error, Result};
use crate::migrations::checksums::compute_checksum;
use crate::migrations::embedded::{get_migrations, Migration};
use rusqlite::Connection;
use std::collections::HashMap;

const SCHEMA_VERSION_DDL: &str = "CREATE TABLE IF NOT EXISTS schema_version (
    id INTEGER PRIMARY KEY,
    migration_id TEXT NOT NULL UNIQUE,
    applied_at INTEGER NOT NULL,
    checksum TEXT NOT NULL
)";

/// Bring the schema up to date
///
/// # Errors
///
/// `ConstraintViolation` if an applied migration's SQL was edited since,
/// `Persistence` if a pending migration fails to run.
pub fn apply_migrations(conn: &mut Connection) -> Result<()> {
    conn.execute_batch(SCHEMA_VERSION_DDL).map_err(from_rusqlite)?;

    let recorded = recorded_checksums(conn)?;
    let mut pending = Vec::new();
    for migration in get_migrations() {
        match recorded.get(migration.id) {
            Some(stored) => {
                let embedded = compute_checksum(migration.sql);
                if *stored != embedded {
                    return Err(checksum_mismatch(migration.id, stored, &embedded));
                }
            }
            None => pending.push(migration),
        }
    }

    for migration in &pending {
        run(conn, migration)?;
    }
    Ok(())
}

/// Ids of applied migrations, in application order
///
/// # Errors
///
/// `Persistence` if `schema_version` cannot be read.
pub fn applied_migrations(conn: &Connection) -> Result<Vec<String>> {
    let mut stmt = conn
        .prepare("SELECT migration_id FROM schema_version ORDER BY id")
        .map_err(from_rusqlite)?;
    let ids = stmt
        .query_map([], |row| row.get(0))
        .map_err(from_rusqlite)?
        .collect::<std::result::Result<Vec<String>, _>>()
        .map_err(from_rusqlite)?;
    Ok(ids)
}

fn recorded_checksums(conn: &Connection) -> Result<HashMap<String, String>> {
    let mut stmt = conn
        .prepare("SELECT migration_id, checksum FROM schema_version")
        .map_err(from_rusqlite)?;
    let rows = stmt
        .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))
        .map_err(from_rusqlite)?
        .collect::<std::result::Result<HashMap<String, String>, _>>()
        .map_err(from_rusqlite)?;
    Ok(rows)
}

fn run(conn: &mut Connection, migration: &Migration) -> Result<()> {
    let tx = conn.transaction().map_err(from_rusqlite)?;

    tx.execute_batch(migration.sql)
        .map_err(|e| migration_error(migration.id, from_rusqlite(e)))?;
    tx.execute(
        "INSERT INTO schema_version (migration_id, applied_at, checksum) VALUES (?1, ?2, ?3)",
        rusqlite::params![
            migration.id,
            chrono::Utc::now().timestamp(),
            compute_checksum(migration.sql)
        ],
    )
    .map_err(from_rusqlite)?;

    tx.commit().map_err(from_rusqlite)?;

    tracing::info!(migration_id = migration.id, "Applied migration");
    Ok(())
}
