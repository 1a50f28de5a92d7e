//! Schema migration command

use super::{open, CliResult};
use snapaudit_core::StoreConfig;
use snapaudit_store::migrations::applied_migrations;

pub fn execute(config: &StoreConfig) -> CliResult {
    let conn = open(config)?;
    println!("Database ready: {}", config.database.path.display());
    for id in applied_migrations(&conn)? {
        println!("  applied: {}", id);
    }
    Ok(())
}
