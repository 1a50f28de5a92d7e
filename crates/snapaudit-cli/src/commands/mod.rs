//! Subcommand implementations

pub mod emby;
pub mod history;
pub mod migrate;
pub mod platform;

use rusqlite::Connection;
use serde_json::Value;
use snapaudit_core::model::ProfileFields;
use snapaudit_core::StoreConfig;
use snapaudit_engine::EngineContext;
use snapaudit_store::ApplyOutcome;
use std::path::{Path, PathBuf};

pub type CliResult<T = ()> = Result<T, Box<dyn std::error::Error>>;

pub fn load_config(file: Option<&Path>, db: Option<PathBuf>) -> CliResult<StoreConfig> {
    let mut config = match file {
        Some(path) => StoreConfig::load_from(path)?,
        None => StoreConfig::load_with_dotenv()?,
    };
    if let Some(db) = db {
        config.database.path = db;
    }
    Ok(config)
}

/// Open the configured database, migrating it if needed
pub fn open(config: &StoreConfig) -> CliResult<Connection> {
    Ok(snapaudit_store::db::open_store(&config.database)?)
}

pub fn read_json(path: &Path) -> CliResult<Value> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| format!("cannot read {}: {}", path.display(), e))?;
    Ok(serde_json::from_str(&text)?)
}

pub fn context() -> EngineContext {
    EngineContext::new()
}

pub fn print_outcome<F: ProfileFields>(outcome: &ApplyOutcome<F>) {
    let record = outcome.record();
    println!("{} {}:", outcome.label(), F::KIND);
    println!("  subject_id: {}", record.subject_id);
    println!("  display_name: {}", record.fields.display_name());
    println!("  version: {}", record.version);
    if record.is_deleted() {
        println!("  deleted: true");
    }
    if let Some(history_id) = outcome.history_id() {
        println!("  history_id: {}", history_id);
    }
    if let Some(remark) = &record.remark {
        println!("  remark: {}", remark);
    }
}
