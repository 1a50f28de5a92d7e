//! Full reconciliation of Emby accounts against the server listing
//!
//! Every listed id is synced, live ids the listing no longer contains are
//! retired, and retired ids that reappear are restored before syncing. Each
//! subject commits in its own transaction, so one failing subject does not
//! roll back the others.

#![allow(clippy::result_large_err)]

use super::emby::{dto_id, sync_in};
use super::with_write_tx;
use rusqlite::Connection;
use serde_json::Value;
use snapaudit_core::errors::ExError;
use snapaudit_core::model::EmbyUserFields;
use snapaudit_store::audit::{self, live, ApplyOutcome};
use snapaudit_store::errors::Result;
use snapaudit_store::repo;
use std::collections::{BTreeMap, BTreeSet};

const REMARK_MISSING: &str = "missing from server listing";
const REMARK_REAPPEARED: &str = "reappeared in server listing";

/// Subject ids grouped by what the reconcile did to them
#[derive(Debug, Default)]
pub struct ReconcileReport {
    pub created: Vec<String>,
    pub updated: Vec<String>,
    pub unchanged: Vec<String>,
    /// Previously retired ids that were listed again
    pub restored: Vec<String>,
    pub retired: Vec<String>,
    /// Listing entries without a usable `Id`
    pub skipped: usize,
    pub failed: Vec<(String, ExError)>,
}

impl ReconcileReport {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }

    /// Subjects that received a new snapshot or live row
    pub fn written(&self) -> usize {
        self.created.len() + self.updated.len() + self.restored.len() + self.retired.len()
    }
}

/// Reconcile live Emby records with `dtos`, the server's full user listing
///
/// An empty listing is treated as a failed fetch and changes nothing.
///
/// # Errors
///
/// Only when the live subject ids cannot be read; per-subject failures are
/// collected in [`ReconcileReport::failed`].
pub fn reconcile_emby_users(
    conn: &mut Connection,
    dtos: &[Value],
    actor: Option<i64>,
) -> Result<ReconcileReport> {
    let mut report = ReconcileReport::default();
    if dtos.is_empty() {
        tracing::info!("Server listing is empty, nothing to reconcile");
        return Ok(report);
    }

    let mut listing: BTreeMap<String, &Value> = BTreeMap::new();
    for dto in dtos {
        match dto_id(dto) {
            Some(id) => {
                listing.insert(id, dto);
            }
            None => report.skipped += 1,
        }
    }

    for (subject_id, dto) in &listing {
        match reconcile_one(conn, subject_id, dto, actor) {
            Ok((restored, outcome)) => {
                let bucket = match outcome {
                    ApplyOutcome::Created(_) => &mut report.created,
                    _ if restored => &mut report.restored,
                    ApplyOutcome::Applied { .. } => &mut report.updated,
                    ApplyOutcome::Skipped(_) => &mut report.unchanged,
                };
                bucket.push(subject_id.clone());
            }
            Err(err) => {
                tracing::warn!(subject_id = %subject_id, error = %err, "Reconcile failed for subject");
                report.failed.push((subject_id.clone(), err));
            }
        }
    }

    let listed: BTreeSet<&String> = listing.keys().collect();
    let live_ids = repo::live::subject_ids::<EmbyUserFields>(conn, false)?;
    for subject_id in live_ids.into_iter().filter(|id| !listed.contains(id)) {
        let result = with_write_tx(conn, "reconcile_retire", |tx| {
            audit::retire::<EmbyUserFields>(tx, &subject_id, Some(REMARK_MISSING), actor)
        });
        match result {
            Ok(_) => report.retired.push(subject_id),
            Err(err) => {
                tracing::warn!(subject_id = %subject_id, error = %err, "Retire failed for subject");
                report.failed.push((subject_id, err));
            }
        }
    }

    Ok(report)
}

fn reconcile_one(
    conn: &mut Connection,
    subject_id: &str,
    dto: &Value,
    actor: Option<i64>,
) -> Result<(bool, ApplyOutcome<EmbyUserFields>)> {
    let fields = EmbyUserFields::from_user_dto(dto)
        .map_err(|e| ExError::from(e).with_entity_id(subject_id))?;

    with_write_tx(conn, "reconcile_subject", |tx| {
        let was_deleted = live::find::<EmbyUserFields>(tx, subject_id)?
            .is_some_and(|current| current.is_deleted());
        if was_deleted {
            audit::restore::<EmbyUserFields>(tx, subject_id, Some(REMARK_REAPPEARED), actor)?;
        }
        let outcome = sync_in(tx, subject_id, fields, false, None, actor)?;
        Ok((was_deleted, outcome))
    })
}
