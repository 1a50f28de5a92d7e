//! Chat-platform account operations

#![allow(clippy::result_large_err)]

use super::with_write_tx;
use chrono::{SecondsFormat, Utc};
use rusqlite::Connection;
use serde_json::Value;
use snapaudit_core::model::{AccountStatus, ChangeTag, PlatformUserFields};
use snapaudit_store::audit::{self, live, ApplyOutcome, ChangeRequest};
use snapaudit_store::errors::Result;

/// Keys written into `extra` while a platform account is banned
pub const EXTRA_BAN_REASON: &str = "ban_reason";
pub const EXTRA_BANNED_AT: &str = "banned_at";
pub const EXTRA_BANNED_BY: &str = "banned_by";

/// Record the platform's current profile, keeping the local ban state
pub fn sync_profile(
    conn: &mut Connection,
    subject_id: &str,
    fields: PlatformUserFields,
    actor: Option<i64>,
) -> Result<ApplyOutcome<PlatformUserFields>> {
    with_write_tx(conn, "sync_platform_profile", |tx| {
        let candidate = match live::find::<PlatformUserFields>(tx, subject_id)? {
            Some(current) => fields.with_local_state(&current.fields),
            None => fields,
        };
        let request = ChangeRequest::new(subject_id, candidate).or_create().by(actor);
        audit::apply_change(tx, &request)
    })
}

pub fn ban(
    conn: &mut Connection,
    subject_id: &str,
    reason: &str,
    actor: Option<i64>,
) -> Result<ApplyOutcome<PlatformUserFields>> {
    with_write_tx(conn, "ban_platform_user", |tx| {
        let current = live::get::<PlatformUserFields>(tx, subject_id)?;
        let mut candidate = current.fields.clone();
        candidate.status = AccountStatus::Banned;
        candidate.extra = candidate
            .extra
            .with(EXTRA_BAN_REASON, reason)
            .with(
                EXTRA_BANNED_AT,
                Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
            )
            .with(EXTRA_BANNED_BY, actor.map_or(Value::Null, Value::from));

        let request = ChangeRequest::new(subject_id, candidate)
            .with_tag(ChangeTag::Ban)
            .forced()
            .with_remark(format!("{} ({})", reason, ChangeTag::Ban))
            .by(actor)
            .expecting_version(current.version);
        audit::apply_change(tx, &request)
    })
}

pub fn unban(
    conn: &mut Connection,
    subject_id: &str,
    reason: &str,
    actor: Option<i64>,
) -> Result<ApplyOutcome<PlatformUserFields>> {
    with_write_tx(conn, "unban_platform_user", |tx| {
        let current = live::get::<PlatformUserFields>(tx, subject_id)?;
        let mut candidate = current.fields.clone();
        candidate.status = AccountStatus::Active;
        candidate.extra = candidate
            .extra
            .without(EXTRA_BAN_REASON)
            .without(EXTRA_BANNED_AT)
            .without(EXTRA_BANNED_BY);

        let request = ChangeRequest::new(subject_id, candidate)
            .with_tag(ChangeTag::Unban)
            .forced()
            .with_remark(format!("{} ({})", reason, ChangeTag::Unban))
            .by(actor)
            .expecting_version(current.version);
        audit::apply_change(tx, &request)
    })
}
