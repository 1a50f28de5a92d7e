//! History table persistence
//!
//! Only [`append`] writes here; the schema's triggers reject any UPDATE or
//! DELETE on history rows.

#![allow(clippy::result_large_err)]

use crate::errors::{sqlite_error, Result};
use crate::repo::rows::{encode_ts, HistoryRow, HISTORY_COLUMNS};
use rusqlite::{Connection, Transaction};
use snapaudit_core::errors::ExError;
use snapaudit_core::model::{HistoryRecord, ProfileFields};
use snapaudit_core::snapshot::canonical_json;

/// Append a snapshot and return its assigned `history_id`
pub fn append<F: ProfileFields>(tx: &Transaction, record: &HistoryRecord<F>) -> Result<i64> {
    let sql = format!(
        "INSERT INTO {} (subject_id, action, fields_json, fields_digest, remark, source_version,
            source_created_at, source_updated_at, source_created_by, source_updated_by,
            source_is_deleted, source_deleted_at, source_deleted_by, recorded_at, recorded_by)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)",
        F::KIND.history_table()
    );
    let stamp = &record.source_stamp;
    tx.execute(
        &sql,
        rusqlite::params![
            record.subject_id,
            record.action.as_str(),
            canonical_json(&record.fields).map_err(ExError::from)?,
            record.fields_digest,
            record.remark,
            record.source_version,
            encode_ts(&stamp.created_at),
            encode_ts(&stamp.updated_at),
            stamp.created_by,
            stamp.updated_by,
            stamp.is_deleted,
            stamp.deleted_at.as_ref().map(encode_ts),
            stamp.deleted_by,
            encode_ts(&record.recorded_at),
            record.recorded_by,
        ],
    )
    .map_err(|e| sqlite_error("append_history", e))?;

    Ok(tx.last_insert_rowid())
}

/// Run a history SELECT whose WHERE/ORDER/LIMIT tail is `clause`
pub(crate) fn select<F: ProfileFields>(
    conn: &Connection,
    clause: &str,
    params: &[rusqlite::types::Value],
) -> Result<Vec<HistoryRecord<F>>> {
    let table = F::KIND.history_table();
    let sql = format!("SELECT {} FROM {} {}", HISTORY_COLUMNS, table, clause);

    let mut stmt = conn.prepare(&sql).map_err(|e| sqlite_error("read_history", e))?;
    let rows = stmt
        .query_map(rusqlite::params_from_iter(params.iter()), |row| {
            HistoryRow::read(table, row)
        })
        .map_err(|e| sqlite_error("read_history", e))?
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| sqlite_error("read_history", e))?;

    rows.into_iter().map(|r| r.decode::<F>()).collect()
}

/// Count history rows matching `clause`
pub(crate) fn count<F: ProfileFields>(
    conn: &Connection,
    clause: &str,
    params: &[rusqlite::types::Value],
) -> Result<u64> {
    let sql = format!(
        "SELECT COUNT(*) FROM {} {}",
        F::KIND.history_table(),
        clause
    );
    let n: i64 = conn
        .query_row(&sql, rusqlite::params_from_iter(params.iter()), |row| {
            row.get(0)
        })
        .map_err(|e| sqlite_error("count_history", e))?;
    Ok(n.max(0) as u64)
}
