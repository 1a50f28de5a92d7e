//! Error handling for snapaudit-store
//!
//! Wraps snapaudit-core `ExError` with SQLite-specific mapping

use rusqlite::ErrorCode;
use snapaudit_core::errors::{ExError, ExErrorKind};

/// Result type alias using ExError
pub type Result<T> = std::result::Result<T, ExError>;

/// Map a rusqlite error onto the canonical taxonomy
///
/// Lock contention that outlived the busy timeout is `Concurrency` and may
/// be retried from a fresh read. Everything else is `Persistence`.
pub fn from_rusqlite(err: rusqlite::Error) -> ExError {
    let kind = match &err {
        rusqlite::Error::SqliteFailure(e, _)
            if matches!(e.code, ErrorCode::DatabaseBusy | ErrorCode::DatabaseLocked) =>
        {
            ExErrorKind::Concurrency
        }
        _ => ExErrorKind::Persistence,
    };
    ExError::new(kind).with_op("sqlite").with_message(err.to_string())
}

/// Same as [`from_rusqlite`], tagged with the failing operation
pub fn sqlite_error(op: &str, err: rusqlite::Error) -> ExError {
    from_rusqlite(err).with_op(op)
}

/// A migration whose SQL failed to run; `cause` stays reachable as the source
pub fn migration_error(migration_id: &str, cause: ExError) -> ExError {
    ExError::new(ExErrorKind::Persistence)
        .with_op("migration")
        .with_message(format!(
            "Migration {} failed: {}",
            migration_id,
            cause.message()
        ))
        .with_source(cause)
}

/// Create a checksum mismatch error
pub fn checksum_mismatch(migration_id: &str, expected: &str, actual: &str) -> ExError {
    ExError::new(ExErrorKind::ConstraintViolation)
        .with_op("migration_checksum")
        .with_message(format!(
            "Checksum mismatch for migration {}: expected {}, got {}",
            migration_id, expected, actual
        ))
}

/// A stored row that cannot be decoded back into a record
pub fn corrupt_row(table: &str, subject_id: &str, reason: impl std::fmt::Display) -> ExError {
    ExError::new(ExErrorKind::Serialization)
        .with_op("decode_row")
        .with_entity_id(subject_id)
        .with_message(format!("Corrupt row in {}: {}", table, reason))
}

/// Create an IO error
pub fn io_error(operation: &str, err: std::io::Error) -> ExError {
    ExError::new(ExErrorKind::Io)
        .with_op(operation.to_string())
        .with_message(err.to_string())
}
