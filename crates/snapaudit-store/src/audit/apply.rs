//! Transactional apply
//!
//! Within one transaction: read the live row, decide whether anything
//! changed, append a snapshot of the pre-change state to history, then
//! overwrite the live row under a version guard. Either both writes commit
//! or neither does.

#![allow(clippy::result_large_err)]

use crate::errors::{sqlite_error, Result};
use crate::repo;
use chrono::Utc;
use rusqlite::{Connection, Transaction, TransactionBehavior};
use snapaudit_core::diff::{compose_remark, detect, ChangeSet};
use snapaudit_core::errors::{AuditError, ExError, ExErrorKind};
use snapaudit_core::model::{ChangeTag, LiveRecord, ProfileFields};
use snapaudit_core::snapshot::capture;
use snapaudit_core::{log_op_end, log_op_error, log_op_start};
use std::time::Instant;

/// A proposed new state for one subject
#[derive(Debug, Clone)]
pub struct ChangeRequest<F: ProfileFields> {
    pub subject_id: String,
    pub candidate: F,
    /// Explicit classification; resolved by [`ChangeTag::resolve`] when absent
    pub tag: Option<ChangeTag>,
    /// Record a snapshot even when nothing differs
    pub force: bool,
    /// Caller's description, placed first in the new remark
    pub remark: Option<String>,
    pub actor: Option<i64>,
    /// Reject the change unless the live record is still at this version
    pub expected_version: Option<i64>,
    /// Insert a live record when none exists instead of failing
    pub create_if_missing: bool,
}

impl<F: ProfileFields> ChangeRequest<F> {
    pub fn new(subject_id: impl Into<String>, candidate: F) -> Self {
        Self {
            subject_id: subject_id.into(),
            candidate,
            tag: None,
            force: false,
            remark: None,
            actor: None,
            expected_version: None,
            create_if_missing: false,
        }
    }

    #[must_use]
    pub fn with_tag(mut self, tag: ChangeTag) -> Self {
        self.tag = Some(tag);
        self
    }

    #[must_use]
    pub fn forced(mut self) -> Self {
        self.force = true;
        self
    }

    #[must_use]
    pub fn with_remark(mut self, remark: impl Into<String>) -> Self {
        self.remark = Some(remark.into());
        self
    }

    #[must_use]
    pub fn by(mut self, actor: Option<i64>) -> Self {
        self.actor = actor;
        self
    }

    #[must_use]
    pub fn expecting_version(mut self, version: i64) -> Self {
        self.expected_version = Some(version);
        self
    }

    #[must_use]
    pub fn or_create(mut self) -> Self {
        self.create_if_missing = true;
        self
    }
}

/// What an apply did
#[derive(Debug, Clone, PartialEq)]
pub enum ApplyOutcome<F: ProfileFields> {
    /// First observation: live record inserted, nothing to snapshot
    Created(LiveRecord<F>),
    /// Prior state appended to history and live record updated
    Applied {
        record: LiveRecord<F>,
        history_id: i64,
        change_set: ChangeSet,
    },
    /// Nothing differed and force was off; no writes
    Skipped(LiveRecord<F>),
}

impl<F: ProfileFields> ApplyOutcome<F> {
    /// True when the live record was written
    pub fn applied(&self) -> bool {
        !matches!(self, ApplyOutcome::Skipped(_))
    }

    /// The live record after the call
    pub fn record(&self) -> &LiveRecord<F> {
        match self {
            ApplyOutcome::Created(record)
            | ApplyOutcome::Skipped(record)
            | ApplyOutcome::Applied { record, .. } => record,
        }
    }

    pub fn into_record(self) -> LiveRecord<F> {
        match self {
            ApplyOutcome::Created(record)
            | ApplyOutcome::Skipped(record)
            | ApplyOutcome::Applied { record, .. } => record,
        }
    }

    pub fn history_id(&self) -> Option<i64> {
        match self {
            ApplyOutcome::Applied { history_id, .. } => Some(*history_id),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ApplyOutcome::Created(_) => "created",
            ApplyOutcome::Applied { .. } => "applied",
            ApplyOutcome::Skipped(_) => "skipped",
        }
    }
}

/// Apply `request` inside the caller's transaction
///
/// Nothing is committed here; the caller commits `tx`, and dropping it
/// rolls back both the history append and the live update.
///
/// # Errors
///
/// - `InvalidInput`: blank subject id, or restore of a record that is not deleted
/// - `NotFound`: no live record and `create_if_missing` is off
/// - `Deleted`: the live record is soft-deleted and the tag is not `restore`
/// - `Concurrency`: version guard failed or the database stayed locked
/// - `Persistence` / `Serialization`: storage or encoding failure
pub fn apply_change<F: ProfileFields>(
    tx: &Transaction,
    request: &ChangeRequest<F>,
) -> Result<ApplyOutcome<F>> {
    let start = Instant::now();
    log_op_start!(
        "apply_change",
        entity_kind = F::KIND.as_str(),
        subject_id = %request.subject_id
    );

    let result = apply_inner(tx, request);

    let duration_ms = start.elapsed().as_millis() as u64;
    match &result {
        Ok(outcome) => {
            log_op_end!(
                "apply_change",
                duration_ms = duration_ms,
                subject_id = %request.subject_id,
                outcome = outcome.label(),
                version = outcome.record().version
            );
        }
        Err(err) => {
            log_op_error!(
                "apply_change",
                err,
                duration_ms = duration_ms,
                subject_id = %request.subject_id
            );
        }
    }

    result
}

fn apply_inner<F: ProfileFields>(
    tx: &Transaction,
    request: &ChangeRequest<F>,
) -> Result<ApplyOutcome<F>> {
    let subject_id = request.subject_id.as_str();
    if subject_id.trim().is_empty() {
        return Err(ExError::from(AuditError::InvalidSubjectId {
            reason: "subject id must not be blank".to_string(),
        })
        .with_op("apply_change"));
    }

    let now = Utc::now();
    let current = repo::live::fetch::<F>(tx, subject_id)?;

    let Some(current) = current else {
        if !request.create_if_missing {
            return Err(ExError::from(AuditError::LiveRecordNotFound {
                kind: F::KIND.to_string(),
                subject_id: subject_id.to_string(),
            })
            .with_op("apply_change"));
        }
        if let Some(expected) = request.expected_version {
            return Err(ExError::from(AuditError::VersionConflict {
                subject_id: subject_id.to_string(),
                expected,
                actual: None,
            })
            .with_op("apply_change"));
        }

        let change_set = detect(None, &request.candidate, request.force)?;
        let remark = compose_remark(&change_set, request.remark.as_deref());
        let record = LiveRecord::new(
            subject_id,
            request.candidate.clone(),
            Some(remark),
            now,
            request.actor,
        );
        repo::live::insert(tx, &record)?;
        return Ok(ApplyOutcome::Created(record));
    };

    if let Some(expected) = request.expected_version {
        if expected != current.version {
            return Err(ExError::from(AuditError::VersionConflict {
                subject_id: subject_id.to_string(),
                expected,
                actual: Some(current.version),
            })
            .with_op("apply_change"));
        }
    }

    let tag = ChangeTag::resolve(request.tag, request.remark.as_deref());
    if current.is_deleted() && tag != ChangeTag::Restore {
        return Err(ExError::from(AuditError::LiveRecordDeleted {
            kind: F::KIND.to_string(),
            subject_id: subject_id.to_string(),
        })
        .with_op("apply_change"));
    }
    if !current.is_deleted() && tag == ChangeTag::Restore {
        return Err(ExError::new(ExErrorKind::InvalidInput)
            .with_op("apply_change")
            .with_entity_id(subject_id)
            .with_message("only a deleted record can be restored"));
    }

    let change_set = detect(Some(&current.fields), &request.candidate, request.force)?;
    if !change_set.changed {
        return Ok(ApplyOutcome::Skipped(current));
    }

    let remark = compose_remark(&change_set, request.remark.as_deref());
    let snapshot = capture(&current, tag, now, request.actor)?;
    let history_id = repo::history::append(tx, &snapshot)?;

    let next = current.advance(request.candidate.clone(), remark, tag, now, request.actor);
    repo::live::update_guarded(tx, &next, current.version)?;

    tracing::debug!(
        subject_id = %subject_id,
        history_id,
        action = tag.as_str(),
        "Recorded snapshot"
    );

    Ok(ApplyOutcome::Applied {
        record: next,
        history_id,
        change_set,
    })
}

/// Apply `request` in its own write transaction and commit
///
/// The transaction is opened `IMMEDIATE`, so the write lock is held from the
/// initial read; a concurrent writer waits up to the busy timeout and then
/// sees this writer's committed state.
///
/// # Errors
///
/// As [`apply_change`], plus `Concurrency` if the lock cannot be taken and
/// `Persistence` if the commit fails.
pub fn commit_change<F: ProfileFields>(
    conn: &mut Connection,
    request: &ChangeRequest<F>,
) -> Result<ApplyOutcome<F>> {
    let tx = conn
        .transaction_with_behavior(TransactionBehavior::Immediate)
        .map_err(|e| sqlite_error("commit_change", e))?;

    let outcome = apply_change(&tx, request)?;

    tx.commit().map_err(|e| sqlite_error("commit_change", e))?;

    Ok(outcome)
}

/// Soft-delete the subject, recording its state under `delete`
///
/// # Errors
///
/// `NotFound` if there is no live record, `Deleted` if it is already retired.
pub fn retire<F: ProfileFields>(
    tx: &Transaction,
    subject_id: &str,
    reason: Option<&str>,
    actor: Option<i64>,
) -> Result<ApplyOutcome<F>> {
    transition::<F>(tx, subject_id, ChangeTag::Delete, reason, actor)
}

/// Undo a soft delete, recording the deleted state under `restore`
///
/// # Errors
///
/// `NotFound` if there is no live record, `InvalidInput` if it is not deleted.
pub fn restore<F: ProfileFields>(
    tx: &Transaction,
    subject_id: &str,
    reason: Option<&str>,
    actor: Option<i64>,
) -> Result<ApplyOutcome<F>> {
    transition::<F>(tx, subject_id, ChangeTag::Restore, reason, actor)
}

fn transition<F: ProfileFields>(
    tx: &Transaction,
    subject_id: &str,
    tag: ChangeTag,
    reason: Option<&str>,
    actor: Option<i64>,
) -> Result<ApplyOutcome<F>> {
    let current = repo::live::fetch::<F>(tx, subject_id)?.ok_or_else(|| {
        ExError::from(AuditError::LiveRecordNotFound {
            kind: F::KIND.to_string(),
            subject_id: subject_id.to_string(),
        })
        .with_op(tag.as_str())
    })?;

    let mut request = ChangeRequest::new(subject_id, current.fields)
        .with_tag(tag)
        .forced()
        .by(actor)
        .expecting_version(current.version);
    request.remark = reason.map(|r| format!("{} ({})", r, tag));

    apply_change(tx, &request)
}
