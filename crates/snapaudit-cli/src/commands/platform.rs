//! Chat-platform account commands

use super::{context, open, print_outcome, read_json, CliResult};
use clap::{Args, Subcommand};
use snapaudit_core::model::PlatformUserFields;
use snapaudit_core::StoreConfig;
use snapaudit_engine::{apply_engine_command, EngineCommand, EngineCommandResult};
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct PlatformArgs {
    #[command(subcommand)]
    pub command: PlatformCommand,
}

#[derive(Debug, Subcommand)]
pub enum PlatformCommand {
    /// Record a profile as reported by the platform
    Sync {
        #[arg(long)]
        id: String,
        /// JSON file holding the profile fields
        #[arg(long)]
        file: PathBuf,
        #[arg(long)]
        actor: Option<i64>,
    },
    Ban {
        #[arg(long)]
        id: String,
        #[arg(long)]
        reason: String,
        #[arg(long)]
        actor: Option<i64>,
    },
    Unban {
        #[arg(long)]
        id: String,
        #[arg(long)]
        reason: String,
        #[arg(long)]
        actor: Option<i64>,
    },
}

pub fn execute(args: PlatformArgs, config: &StoreConfig) -> CliResult {
    let cmd = match args.command {
        PlatformCommand::Sync { id, file, actor } => {
            let fields: PlatformUserFields = serde_json::from_value(read_json(&file)?)?;
            EngineCommand::SyncPlatformProfile {
                subject_id: id,
                fields,
                actor,
            }
        }
        PlatformCommand::Ban { id, reason, actor } => EngineCommand::BanPlatformUser {
            subject_id: id,
            reason,
            actor,
        },
        PlatformCommand::Unban { id, reason, actor } => EngineCommand::UnbanPlatformUser {
            subject_id: id,
            reason,
            actor,
        },
    };

    let mut conn = open(config)?;
    match apply_engine_command(cmd, &mut conn, &context())? {
        EngineCommandResult::PlatformUser(outcome) => print_outcome(&outcome),
        other => return Err(format!("unexpected result: {}", other.label()).into()),
    }
    Ok(())
}
