//! Emby account commands

use super::{context, open, print_outcome, read_json, CliResult};
use clap::{Args, Subcommand};
use serde_json::Value;
use snapaudit_core::StoreConfig;
use snapaudit_engine::{apply_engine_command, EngineCommand, EngineCommandResult, ReconcileReport};
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct EmbyArgs {
    #[command(subcommand)]
    pub command: EmbyCommand,
}

#[derive(Debug, Subcommand)]
pub enum EmbyCommand {
    /// Record one user DTO as returned by the server
    Sync(SyncArgs),
    /// Reconcile against a full user listing
    Reconcile(ReconcileArgs),
    Ban(ReasonArgs),
    Unban(ReasonArgs),
    /// Soft-delete a user
    Retire(SubjectArgs),
    /// Undo a soft delete
    Restore(SubjectArgs),
}

#[derive(Debug, Args)]
pub struct SyncArgs {
    /// JSON file holding one UserDto
    #[arg(long)]
    pub file: PathBuf,

    /// Subject id; defaults to the DTO's `Id`
    #[arg(long)]
    pub id: Option<String>,

    /// Record a snapshot even if nothing changed
    #[arg(long)]
    pub force: bool,

    #[arg(long)]
    pub remark: Option<String>,

    #[arg(long)]
    pub actor: Option<i64>,
}

#[derive(Debug, Args)]
pub struct ReconcileArgs {
    /// JSON file holding an array of UserDto, or a query result with `Items`
    #[arg(long)]
    pub file: PathBuf,

    #[arg(long)]
    pub actor: Option<i64>,
}

#[derive(Debug, Args)]
pub struct ReasonArgs {
    #[arg(long)]
    pub id: String,

    #[arg(long)]
    pub reason: String,

    #[arg(long)]
    pub actor: Option<i64>,

    /// Server view of the user after the change
    #[arg(long)]
    pub dto: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct SubjectArgs {
    #[arg(long)]
    pub id: String,

    #[arg(long)]
    pub reason: Option<String>,

    #[arg(long)]
    pub actor: Option<i64>,
}

pub fn execute(args: EmbyArgs, config: &StoreConfig) -> CliResult {
    let cmd = match args.command {
        EmbyCommand::Sync(a) => {
            let user_dto = read_json(&a.file)?;
            let subject_id = match a.id {
                Some(id) => id,
                None => user_dto
                    .get("Id")
                    .and_then(Value::as_str)
                    .map(str::to_string)
                    .ok_or("DTO has no Id; pass --id")?,
            };
            EngineCommand::SyncEmbyProfile {
                subject_id,
                user_dto,
                force: a.force,
                remark: a.remark,
                actor: a.actor,
            }
        }
        EmbyCommand::Reconcile(a) => EngineCommand::ReconcileEmbyUsers {
            dtos: listing(read_json(&a.file)?)?,
            actor: a.actor,
        },
        EmbyCommand::Ban(a) => EngineCommand::BanEmbyUser {
            user_dto: a.dto.as_deref().map(read_json).transpose()?,
            subject_id: a.id,
            reason: a.reason,
            actor: a.actor,
        },
        EmbyCommand::Unban(a) => EngineCommand::UnbanEmbyUser {
            user_dto: a.dto.as_deref().map(read_json).transpose()?,
            subject_id: a.id,
            reason: a.reason,
            actor: a.actor,
        },
        EmbyCommand::Retire(a) => EngineCommand::RetireEmbyUser {
            subject_id: a.id,
            reason: a.reason,
            actor: a.actor,
        },
        EmbyCommand::Restore(a) => EngineCommand::RestoreEmbyUser {
            subject_id: a.id,
            reason: a.reason,
            actor: a.actor,
        },
    };

    let mut conn = open(config)?;
    match apply_engine_command(cmd, &mut conn, &context())? {
        EngineCommandResult::EmbyUser(outcome) => print_outcome(&outcome),
        EngineCommandResult::Reconciled(report) => print_report(&report),
        EngineCommandResult::PlatformUser(outcome) => print_outcome(&outcome),
    }
    Ok(())
}

fn listing(value: Value) -> CliResult<Vec<Value>> {
    match value {
        Value::Array(items) => Ok(items),
        Value::Object(mut obj) => match obj.remove("Items") {
            Some(Value::Array(items)) => Ok(items),
            _ => Err("listing object has no Items array".into()),
        },
        _ => Err("listing must be an array or an object with Items".into()),
    }
}

fn print_report(report: &ReconcileReport) {
    println!("Reconciled:");
    println!("  created: {}", report.created.len());
    println!("  updated: {}", report.updated.len());
    println!("  unchanged: {}", report.unchanged.len());
    println!("  restored: {}", report.restored.len());
    println!("  retired: {}", report.retired.len());
    if report.skipped > 0 {
        println!("  skipped (no Id): {}", report.skipped);
    }
    for (subject_id, err) in &report.failed {
        println!("  failed {}: {}", subject_id, err);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_listing_accepts_array_and_query_result() {
        assert_eq!(listing(json!([{"Id": "a"}])).unwrap().len(), 1);
        assert_eq!(
            listing(json!({"Items": [{"Id": "a"}, {"Id": "b"}], "TotalRecordCount": 2}))
                .unwrap()
                .len(),
            2
        );
        assert!(listing(json!({"Id": "a"})).is_err());
        assert!(listing(json!("a")).is_err());
    }
}
