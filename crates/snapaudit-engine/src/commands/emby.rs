//! Emby account operations

#![allow(clippy::result_large_err)]

use super::with_write_tx;
use chrono::{SecondsFormat, Utc};
use rusqlite::{Connection, Transaction};
use serde_json::Value;
use snapaudit_core::errors::{ExError, ExErrorKind};
use snapaudit_core::model::emby_user::{
    EXTRA_DISABLED_AT, EXTRA_DISABLED_BY, EXTRA_DISABLED_REASON, EXTRA_IS_DISABLED,
};
use snapaudit_core::model::{AccountStatus, ChangeTag, EmbyUserFields};
use snapaudit_store::audit::{self, live, ApplyOutcome, ChangeRequest};
use snapaudit_store::errors::Result;

/// Parse a DTO, rejecting one whose `Id` names a different subject
pub(crate) fn parse_dto(subject_id: &str, user_dto: &Value) -> Result<EmbyUserFields> {
    if let Some(id) = dto_id(user_dto) {
        if id != subject_id {
            return Err(ExError::new(ExErrorKind::InvalidInput)
                .with_op("parse_user_dto")
                .with_entity_id(subject_id)
                .with_message(format!("DTO Id '{}' does not match subject", id)));
        }
    }
    EmbyUserFields::from_user_dto(user_dto)
        .map_err(|e| ExError::from(e).with_entity_id(subject_id))
}

/// The `Id` of an Emby user DTO, if present
pub(crate) fn dto_id(user_dto: &Value) -> Option<String> {
    match user_dto.get("Id")? {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Record the server's current view of an account inside `tx`
///
/// The first observation inserts the live record. Later observations keep
/// the locally maintained password hash and ban markers.
pub(crate) fn sync_in(
    tx: &Transaction,
    subject_id: &str,
    fields: EmbyUserFields,
    force: bool,
    remark: Option<&str>,
    actor: Option<i64>,
) -> Result<ApplyOutcome<EmbyUserFields>> {
    let candidate = match live::find::<EmbyUserFields>(tx, subject_id)? {
        Some(current) => fields.with_local_state(&current.fields),
        None => fields,
    };

    let mut request = ChangeRequest::new(subject_id, candidate).or_create().by(actor);
    request.force = force;
    request.remark = remark.map(str::to_string);

    audit::apply_change(tx, &request)
}

pub fn sync_profile(
    conn: &mut Connection,
    subject_id: &str,
    user_dto: &Value,
    force: bool,
    remark: Option<&str>,
    actor: Option<i64>,
) -> Result<ApplyOutcome<EmbyUserFields>> {
    let fields = parse_dto(subject_id, user_dto)?;
    with_write_tx(conn, "sync_emby_profile", |tx| {
        sync_in(tx, subject_id, fields, force, remark, actor)
    })
}

/// Disable an account and stamp the ban markers into `extra_data`
///
/// `user_dto` is the server's view after the policy change, when the caller
/// has it; otherwise the stored DTO is kept.
pub fn ban(
    conn: &mut Connection,
    subject_id: &str,
    reason: &str,
    actor: Option<i64>,
    user_dto: Option<&Value>,
) -> Result<ApplyOutcome<EmbyUserFields>> {
    let refreshed = user_dto.map(|dto| parse_dto(subject_id, dto)).transpose()?;

    with_write_tx(conn, "ban_emby_user", |tx| {
        let current = live::get::<EmbyUserFields>(tx, subject_id)?;
        let mut candidate = match refreshed {
            Some(fields) => fields.with_local_state(&current.fields),
            None => current.fields.clone(),
        };

        candidate.status = AccountStatus::Disabled;
        candidate.extra_data = candidate
            .extra_data
            .with(EXTRA_IS_DISABLED, true)
            .with(EXTRA_DISABLED_REASON, reason)
            .with(
                EXTRA_DISABLED_AT,
                Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
            )
            .with(EXTRA_DISABLED_BY, actor.map_or(Value::Null, Value::from));

        let request = ChangeRequest::new(subject_id, candidate)
            .with_tag(ChangeTag::Ban)
            .forced()
            .with_remark(format!("{} ({})", reason, ChangeTag::Ban))
            .by(actor)
            .expecting_version(current.version);

        audit::apply_change(tx, &request)
    })
}

/// Re-enable an account and clear the ban markers
pub fn unban(
    conn: &mut Connection,
    subject_id: &str,
    reason: &str,
    actor: Option<i64>,
    user_dto: Option<&Value>,
) -> Result<ApplyOutcome<EmbyUserFields>> {
    let refreshed = user_dto.map(|dto| parse_dto(subject_id, dto)).transpose()?;

    with_write_tx(conn, "unban_emby_user", |tx| {
        let current = live::get::<EmbyUserFields>(tx, subject_id)?;
        let mut candidate = match refreshed {
            Some(fields) => fields.with_local_state(&current.fields),
            None => current.fields.clone(),
        };

        candidate.status = AccountStatus::Active;
        candidate.extra_data = candidate
            .extra_data
            .with(EXTRA_IS_DISABLED, false)
            .without(EXTRA_DISABLED_REASON)
            .without(EXTRA_DISABLED_AT)
            .without(EXTRA_DISABLED_BY);

        let request = ChangeRequest::new(subject_id, candidate)
            .with_tag(ChangeTag::Unban)
            .forced()
            .with_remark(format!("{} ({})", reason, ChangeTag::Unban))
            .by(actor)
            .expecting_version(current.version);

        audit::apply_change(tx, &request)
    })
}

pub fn retire(
    conn: &mut Connection,
    subject_id: &str,
    reason: Option<&str>,
    actor: Option<i64>,
) -> Result<ApplyOutcome<EmbyUserFields>> {
    with_write_tx(conn, "retire_emby_user", |tx| {
        audit::retire::<EmbyUserFields>(tx, subject_id, reason, actor)
    })
}

pub fn restore(
    conn: &mut Connection,
    subject_id: &str,
    reason: Option<&str>,
    actor: Option<i64>,
) -> Result<ApplyOutcome<EmbyUserFields>> {
    with_write_tx(conn, "restore_emby_user", |tx| {
        audit::restore::<EmbyUserFields>(tx, subject_id, reason, actor)
    })
}
