//! Read-only access to live records

#![allow(clippy::result_large_err)]

use crate::errors::Result;
use crate::repo;
use rusqlite::Connection;
use snapaudit_core::errors::{AuditError, ExError};
use snapaudit_core::model::{LiveRecord, ProfileFields};

/// The live record for `subject_id`, including soft-deleted ones
///
/// # Errors
///
/// `NotFound` if the subject has never been observed.
pub fn get<F: ProfileFields>(conn: &Connection, subject_id: &str) -> Result<LiveRecord<F>> {
    repo::live::fetch::<F>(conn, subject_id)?.ok_or_else(|| {
        ExError::from(AuditError::LiveRecordNotFound {
            kind: F::KIND.to_string(),
            subject_id: subject_id.to_string(),
        })
        .with_op("get_live")
    })
}

/// Like [`get`], but absence is not an error
///
/// # Errors
///
/// `Persistence` or `Serialization` if the row cannot be read.
pub fn find<F: ProfileFields>(conn: &Connection, subject_id: &str) -> Result<Option<LiveRecord<F>>> {
    repo::live::fetch::<F>(conn, subject_id)
}

/// All live records ordered by subject id
///
/// # Errors
///
/// `Persistence` or `Serialization` if rows cannot be read.
pub fn list<F: ProfileFields>(conn: &Connection, include_deleted: bool) -> Result<Vec<LiveRecord<F>>> {
    repo::live::list::<F>(conn, include_deleted)
}
