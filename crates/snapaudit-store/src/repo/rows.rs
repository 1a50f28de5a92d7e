//! Raw row types and their conversion into domain records

#![allow(clippy::result_large_err)]

use crate::errors::{corrupt_row, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::Row;
use snapaudit_core::model::{AuditStamp, ChangeTag, HistoryRecord, LiveRecord, ProfileFields};

/// Fixed-width RFC 3339 with nanoseconds, so text order is time order
pub(crate) fn encode_ts(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

fn decode_ts(table: &str, subject_id: &str, raw: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| corrupt_row(table, subject_id, format!("bad timestamp '{}': {}", raw, e)))
}

fn decode_opt_ts(table: &str, subject_id: &str, raw: Option<&str>) -> Result<Option<DateTime<Utc>>> {
    raw.map(|r| decode_ts(table, subject_id, r)).transpose()
}

fn decode_fields<F: ProfileFields>(table: &str, subject_id: &str, json: &str) -> Result<F> {
    serde_json::from_str(json).map_err(|e| corrupt_row(table, subject_id, e))
}

/// Stamp columns as stored, before decoding
struct StampRow {
    created_at: String,
    updated_at: String,
    created_by: Option<i64>,
    updated_by: Option<i64>,
    is_deleted: bool,
    deleted_at: Option<String>,
    deleted_by: Option<i64>,
}

impl StampRow {
    /// Read seven stamp columns starting at `offset`
    fn read(row: &Row<'_>, offset: usize) -> rusqlite::Result<Self> {
        Ok(Self {
            created_at: row.get(offset)?,
            updated_at: row.get(offset + 1)?,
            created_by: row.get(offset + 2)?,
            updated_by: row.get(offset + 3)?,
            is_deleted: row.get(offset + 4)?,
            deleted_at: row.get(offset + 5)?,
            deleted_by: row.get(offset + 6)?,
        })
    }

    fn decode(self, table: &str, subject_id: &str) -> Result<AuditStamp> {
        Ok(AuditStamp {
            created_at: decode_ts(table, subject_id, &self.created_at)?,
            updated_at: decode_ts(table, subject_id, &self.updated_at)?,
            created_by: self.created_by,
            updated_by: self.updated_by,
            is_deleted: self.is_deleted,
            deleted_at: decode_opt_ts(table, subject_id, self.deleted_at.as_deref())?,
            deleted_by: self.deleted_by,
        })
    }
}

pub(crate) const LIVE_COLUMNS: &str = "subject_id, fields_json, remark, version, \
     created_at, updated_at, created_by, updated_by, is_deleted, deleted_at, deleted_by";

/// A live-table row as stored
pub(crate) struct LiveRow {
    table: &'static str,
    subject_id: String,
    fields_json: String,
    remark: Option<String>,
    version: i64,
    stamp: StampRow,
}

impl LiveRow {
    /// Read a row selected with [`LIVE_COLUMNS`]
    pub(crate) fn read(table: &'static str, row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            table,
            subject_id: row.get(0)?,
            fields_json: row.get(1)?,
            remark: row.get(2)?,
            version: row.get(3)?,
            stamp: StampRow::read(row, 4)?,
        })
    }

    pub(crate) fn decode<F: ProfileFields>(self) -> Result<LiveRecord<F>> {
        let fields = decode_fields(self.table, &self.subject_id, &self.fields_json)?;
        let stamp = self.stamp.decode(self.table, &self.subject_id)?;
        Ok(LiveRecord {
            subject_id: self.subject_id,
            fields,
            remark: self.remark,
            stamp,
            version: self.version,
        })
    }
}

pub(crate) const HISTORY_COLUMNS: &str = "history_id, subject_id, action, fields_json, \
     fields_digest, remark, source_version, source_created_at, source_updated_at, \
     source_created_by, source_updated_by, source_is_deleted, source_deleted_at, \
     source_deleted_by, recorded_at, recorded_by";

/// A history-table row as stored
pub(crate) struct HistoryRow {
    table: &'static str,
    history_id: i64,
    subject_id: String,
    action: String,
    fields_json: String,
    fields_digest: String,
    remark: Option<String>,
    source_version: i64,
    source_stamp: StampRow,
    recorded_at: String,
    recorded_by: Option<i64>,
}

impl HistoryRow {
    /// Read a row selected with [`HISTORY_COLUMNS`]
    pub(crate) fn read(table: &'static str, row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            table,
            history_id: row.get(0)?,
            subject_id: row.get(1)?,
            action: row.get(2)?,
            fields_json: row.get(3)?,
            fields_digest: row.get(4)?,
            remark: row.get(5)?,
            source_version: row.get(6)?,
            source_stamp: StampRow::read(row, 7)?,
            recorded_at: row.get(14)?,
            recorded_by: row.get(15)?,
        })
    }

    pub(crate) fn decode<F: ProfileFields>(self) -> Result<HistoryRecord<F>> {
        let table = self.table;
        let subject_id = self.subject_id;
        let action: ChangeTag = self
            .action
            .parse()
            .map_err(|e| corrupt_row(table, &subject_id, e))?;
        Ok(HistoryRecord {
            history_id: Some(self.history_id),
            fields: decode_fields(table, &subject_id, &self.fields_json)?,
            fields_digest: self.fields_digest,
            action,
            remark: self.remark,
            source_stamp: self.source_stamp.decode(table, &subject_id)?,
            source_version: self.source_version,
            recorded_at: decode_ts(table, &subject_id, &self.recorded_at)?,
            recorded_by: self.recorded_by,
            subject_id,
        })
    }
}
