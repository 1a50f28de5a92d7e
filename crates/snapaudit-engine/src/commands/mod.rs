//! Command orchestration layer.
//!
//! Each operation runs in its own `IMMEDIATE` write transaction and
//! delegates the snapshot-before-update work to the store.

#![allow(clippy::result_large_err)]

pub mod emby;
pub mod engine_command;
pub mod platform;
pub mod reconcile;

use rusqlite::{Connection, Transaction, TransactionBehavior};
use snapaudit_store::errors::{sqlite_error, Result};

/// Run `f` in a write transaction, committing only on success
pub(crate) fn with_write_tx<T>(
    conn: &mut Connection,
    op: &str,
    f: impl FnOnce(&Transaction) -> Result<T>,
) -> Result<T> {
    let tx = conn
        .transaction_with_behavior(TransactionBehavior::Immediate)
        .map_err(|e| sqlite_error(op, e))?;
    let value = f(&tx)?;
    tx.commit().map_err(|e| sqlite_error(op, e))?;
    Ok(value)
}
