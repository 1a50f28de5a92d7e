//! Engine command dispatch
//!
//! One enum for every upstream operation that mutates an audited entity;
//! `apply_engine_command` routes it to its handler and brackets the call
//! with the canonical log events.

#![allow(clippy::result_large_err)]

use super::{emby, platform, reconcile};
use crate::commands::reconcile::ReconcileReport;
use crate::context::EngineContext;
use rusqlite::Connection;
use serde_json::Value;
use snapaudit_core::model::{EmbyUserFields, PlatformUserFields};
use snapaudit_core::{log_op_end, log_op_error, log_op_start};
use snapaudit_store::audit::ApplyOutcome;
use snapaudit_store::errors::Result;
use std::time::Instant;

/// An upstream operation on an audited entity
#[derive(Debug, Clone)]
pub enum EngineCommand {
    /// Record the media server's view of one account
    SyncEmbyProfile {
        subject_id: String,
        user_dto: Value,
        force: bool,
        remark: Option<String>,
        actor: Option<i64>,
    },
    BanEmbyUser {
        subject_id: String,
        reason: String,
        actor: Option<i64>,
        /// Server view after the policy change, if the caller fetched it
        user_dto: Option<Value>,
    },
    UnbanEmbyUser {
        subject_id: String,
        reason: String,
        actor: Option<i64>,
        user_dto: Option<Value>,
    },
    RetireEmbyUser {
        subject_id: String,
        reason: Option<String>,
        actor: Option<i64>,
    },
    RestoreEmbyUser {
        subject_id: String,
        reason: Option<String>,
        actor: Option<i64>,
    },
    /// Full sync against the server's user listing
    ReconcileEmbyUsers {
        dtos: Vec<Value>,
        actor: Option<i64>,
    },
    SyncPlatformProfile {
        subject_id: String,
        fields: PlatformUserFields,
        actor: Option<i64>,
    },
    BanPlatformUser {
        subject_id: String,
        reason: String,
        actor: Option<i64>,
    },
    UnbanPlatformUser {
        subject_id: String,
        reason: String,
        actor: Option<i64>,
    },
}

impl EngineCommand {
    /// Operation name used in log events and errors
    pub fn op_name(&self) -> &'static str {
        match self {
            EngineCommand::SyncEmbyProfile { .. } => "sync_emby_profile",
            EngineCommand::BanEmbyUser { .. } => "ban_emby_user",
            EngineCommand::UnbanEmbyUser { .. } => "unban_emby_user",
            EngineCommand::RetireEmbyUser { .. } => "retire_emby_user",
            EngineCommand::RestoreEmbyUser { .. } => "restore_emby_user",
            EngineCommand::ReconcileEmbyUsers { .. } => "reconcile_emby_users",
            EngineCommand::SyncPlatformProfile { .. } => "sync_platform_profile",
            EngineCommand::BanPlatformUser { .. } => "ban_platform_user",
            EngineCommand::UnbanPlatformUser { .. } => "unban_platform_user",
        }
    }

    /// The single subject this command targets, if any
    pub fn subject_id(&self) -> Option<&str> {
        match self {
            EngineCommand::SyncEmbyProfile { subject_id, .. }
            | EngineCommand::BanEmbyUser { subject_id, .. }
            | EngineCommand::UnbanEmbyUser { subject_id, .. }
            | EngineCommand::RetireEmbyUser { subject_id, .. }
            | EngineCommand::RestoreEmbyUser { subject_id, .. }
            | EngineCommand::SyncPlatformProfile { subject_id, .. }
            | EngineCommand::BanPlatformUser { subject_id, .. }
            | EngineCommand::UnbanPlatformUser { subject_id, .. } => Some(subject_id),
            EngineCommand::ReconcileEmbyUsers { .. } => None,
        }
    }
}

/// Result of applying an engine command
#[derive(Debug)]
pub enum EngineCommandResult {
    EmbyUser(ApplyOutcome<EmbyUserFields>),
    PlatformUser(ApplyOutcome<PlatformUserFields>),
    Reconciled(ReconcileReport),
}

impl EngineCommandResult {
    /// Short label for logs and CLI output
    pub fn label(&self) -> &'static str {
        match self {
            EngineCommandResult::EmbyUser(outcome) => outcome.label(),
            EngineCommandResult::PlatformUser(outcome) => outcome.label(),
            EngineCommandResult::Reconciled(_) => "reconciled",
        }
    }
}

/// Apply an engine command against the store
///
/// Errors come back carrying the context's request and trace ids.
///
/// # Errors
///
/// Whatever the routed operation returns: `NotFound`, `Deleted`,
/// `InvalidInput`, `Concurrency`, `Persistence` or `Serialization`.
pub fn apply_engine_command(
    cmd: EngineCommand,
    conn: &mut Connection,
    ctx: &EngineContext,
) -> Result<EngineCommandResult> {
    let op = cmd.op_name();
    let subject_id = cmd.subject_id().unwrap_or("*").to_string();
    let request_id = ctx.request.request_id.clone();
    let start = Instant::now();
    log_op_start!(op, request_id = %request_id, subject_id = %subject_id);

    let result = dispatch(cmd, conn).map_err(|err| ctx.annotate(err));

    let duration_ms = start.elapsed().as_millis() as u64;
    match &result {
        Ok(res) => {
            log_op_end!(
                op,
                duration_ms = duration_ms,
                request_id = %request_id,
                subject_id = %subject_id,
                outcome = res.label()
            );
        }
        Err(err) => {
            log_op_error!(
                op,
                err,
                duration_ms = duration_ms,
                request_id = %request_id,
                subject_id = %subject_id
            );
        }
    }

    result
}

fn dispatch(cmd: EngineCommand, conn: &mut Connection) -> Result<EngineCommandResult> {
    match cmd {
        EngineCommand::SyncEmbyProfile {
            subject_id,
            user_dto,
            force,
            remark,
            actor,
        } => emby::sync_profile(
            conn,
            &subject_id,
            &user_dto,
            force,
            remark.as_deref(),
            actor,
        )
        .map(EngineCommandResult::EmbyUser),

        EngineCommand::BanEmbyUser {
            subject_id,
            reason,
            actor,
            user_dto,
        } => emby::ban(conn, &subject_id, &reason, actor, user_dto.as_ref())
            .map(EngineCommandResult::EmbyUser),

        EngineCommand::UnbanEmbyUser {
            subject_id,
            reason,
            actor,
            user_dto,
        } => emby::unban(conn, &subject_id, &reason, actor, user_dto.as_ref())
            .map(EngineCommandResult::EmbyUser),

        EngineCommand::RetireEmbyUser {
            subject_id,
            reason,
            actor,
        } => emby::retire(conn, &subject_id, reason.as_deref(), actor)
            .map(EngineCommandResult::EmbyUser),

        EngineCommand::RestoreEmbyUser {
            subject_id,
            reason,
            actor,
        } => emby::restore(conn, &subject_id, reason.as_deref(), actor)
            .map(EngineCommandResult::EmbyUser),

        EngineCommand::ReconcileEmbyUsers { dtos, actor } => {
            reconcile::reconcile_emby_users(conn, &dtos, actor).map(EngineCommandResult::Reconciled)
        }

        EngineCommand::SyncPlatformProfile {
            subject_id,
            fields,
            actor,
        } => platform::sync_profile(conn, &subject_id, fields, actor)
            .map(EngineCommandResult::PlatformUser),

        EngineCommand::BanPlatformUser {
            subject_id,
            reason,
            actor,
        } => platform::ban(conn, &subject_id, &reason, actor).map(EngineCommandResult::PlatformUser),

        EngineCommand::UnbanPlatformUser {
            subject_id,
            reason,
            actor,
        } => platform::unban(conn, &subject_id, &reason, actor)
            .map(EngineCommandResult::PlatformUser),
    }
}
