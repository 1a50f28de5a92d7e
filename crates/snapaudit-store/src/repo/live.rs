//! Live table persistence

#![allow(clippy::result_large_err)]

use crate::errors::{sqlite_error, Result};
use crate::repo::rows::{encode_ts, LiveRow, LIVE_COLUMNS};
use rusqlite::{Connection, OptionalExtension, Transaction};
use snapaudit_core::errors::{AuditError, ExError, ExErrorKind};
use snapaudit_core::model::{LiveRecord, ProfileFields};
use snapaudit_core::snapshot::{canonical_json, fields_digest};

/// Fetch the live record for `subject_id`, deleted or not
pub fn fetch<F: ProfileFields>(conn: &Connection, subject_id: &str) -> Result<Option<LiveRecord<F>>> {
    let table = F::KIND.live_table();
    let sql = format!("SELECT {} FROM {} WHERE subject_id = ?1", LIVE_COLUMNS, table);

    let row = conn
        .query_row(&sql, [subject_id], |row| LiveRow::read(table, row))
        .optional()
        .map_err(|e| sqlite_error("fetch_live", e))?;

    row.map(|r| r.decode::<F>()).transpose()
}

/// All live records ordered by `subject_id`
pub fn list<F: ProfileFields>(conn: &Connection, include_deleted: bool) -> Result<Vec<LiveRecord<F>>> {
    let table = F::KIND.live_table();
    let filter = if include_deleted { "" } else { "WHERE is_deleted = 0" };
    let sql = format!(
        "SELECT {} FROM {} {} ORDER BY subject_id",
        LIVE_COLUMNS, table, filter
    );

    let mut stmt = conn.prepare(&sql).map_err(|e| sqlite_error("list_live", e))?;
    let rows = stmt
        .query_map([], |row| LiveRow::read(table, row))
        .map_err(|e| sqlite_error("list_live", e))?
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| sqlite_error("list_live", e))?;

    rows.into_iter().map(|r| r.decode::<F>()).collect()
}

/// Insert a first-observation record
///
/// # Errors
///
/// `AlreadyExists` if a live record for the subject exists.
pub fn insert<F: ProfileFields>(tx: &Transaction, record: &LiveRecord<F>) -> Result<()> {
    let table = F::KIND.live_table();
    if exists(tx, table, &record.subject_id)? {
        return Err(ExError::new(ExErrorKind::AlreadyExists)
            .with_op("insert_live")
            .with_entity_id(record.subject_id.clone())
            .with_message(format!("{} already has a live record", F::KIND)));
    }

    let sql = format!(
        "INSERT INTO {} (subject_id, display_name, fields_json, fields_digest, remark, version,
            created_at, updated_at, created_by, updated_by, is_deleted, deleted_at, deleted_by)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
        table
    );
    tx.execute(
        &sql,
        rusqlite::params![
            record.subject_id,
            record.fields.display_name(),
            encode_fields(&record.fields)?,
            fields_digest(&record.fields).map_err(ExError::from)?,
            record.remark,
            record.version,
            encode_ts(&record.stamp.created_at),
            encode_ts(&record.stamp.updated_at),
            record.stamp.created_by,
            record.stamp.updated_by,
            record.stamp.is_deleted,
            record.stamp.deleted_at.as_ref().map(encode_ts),
            record.stamp.deleted_by,
        ],
    )
    .map_err(|e| sqlite_error("insert_live", e))?;

    Ok(())
}

/// Overwrite the live row with `record`, guarded by the version read earlier
///
/// The full field set is rewritten. `record.version` must already be the
/// new version.
///
/// # Errors
///
/// `Concurrency` if the stored version is no longer `expected_version`.
pub fn update_guarded<F: ProfileFields>(
    tx: &Transaction,
    record: &LiveRecord<F>,
    expected_version: i64,
) -> Result<()> {
    let table = F::KIND.live_table();
    let sql = format!(
        "UPDATE {} SET display_name = ?1, fields_json = ?2, fields_digest = ?3, remark = ?4,
            version = ?5, updated_at = ?6, updated_by = ?7, is_deleted = ?8, deleted_at = ?9,
            deleted_by = ?10
         WHERE subject_id = ?11 AND version = ?12",
        table
    );
    let affected = tx
        .execute(
            &sql,
            rusqlite::params![
                record.fields.display_name(),
                encode_fields(&record.fields)?,
                fields_digest(&record.fields).map_err(ExError::from)?,
                record.remark,
                record.version,
                encode_ts(&record.stamp.updated_at),
                record.stamp.updated_by,
                record.stamp.is_deleted,
                record.stamp.deleted_at.as_ref().map(encode_ts),
                record.stamp.deleted_by,
                record.subject_id,
                expected_version,
            ],
        )
        .map_err(|e| sqlite_error("update_live", e))?;

    if affected == 0 {
        let actual = current_version(tx, table, &record.subject_id)?;
        let err: ExError = AuditError::VersionConflict {
            subject_id: record.subject_id.clone(),
            expected: expected_version,
            actual,
        }
        .into();
        return Err(err.with_op("update_live"));
    }

    Ok(())
}

/// Subject ids present in the live table
pub fn subject_ids<F: ProfileFields>(conn: &Connection, include_deleted: bool) -> Result<Vec<String>> {
    let filter = if include_deleted { "" } else { "WHERE is_deleted = 0" };
    let sql = format!(
        "SELECT subject_id FROM {} {} ORDER BY subject_id",
        F::KIND.live_table(),
        filter
    );
    let mut stmt = conn.prepare(&sql).map_err(|e| sqlite_error("subject_ids", e))?;
    let ids = stmt
        .query_map([], |row| row.get(0))
        .map_err(|e| sqlite_error("subject_ids", e))?
        .collect::<std::result::Result<Vec<String>, _>>()
        .map_err(|e| sqlite_error("subject_ids", e))?;
    Ok(ids)
}

fn encode_fields<F: ProfileFields>(fields: &F) -> Result<String> {
    canonical_json(fields).map_err(ExError::from)
}

fn exists(conn: &Connection, table: &str, subject_id: &str) -> Result<bool> {
    Ok(current_version(conn, table, subject_id)?.is_some())
}

fn current_version(conn: &Connection, table: &str, subject_id: &str) -> Result<Option<i64>> {
    conn.query_row(
        &format!("SELECT version FROM {} WHERE subject_id = ?1", table),
        [subject_id],
        |row| row.get(0),
    )
    .optional()
    .map_err(|e| sqlite_error("current_version", e))
}
