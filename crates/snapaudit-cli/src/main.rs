//! snapaudit CLI
//!
//! Command-line access to the audited entity store

use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;

#[derive(Debug, Parser)]
#[command(name = "snapaudit")]
#[command(about = "snapaudit - Snapshot-audited account store", long_about = None)]
struct Cli {
    /// Config file to read instead of ./snapaudit.toml
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Database path, overriding the configured one
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Create or upgrade the database schema
    Migrate,
    /// Emby account operations
    Emby(commands::emby::EmbyArgs),
    /// Chat-platform account operations
    Platform(commands::platform::PlatformArgs),
    /// Show a subject's audit trail
    History(commands::history::HistoryArgs),
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> commands::CliResult {
    let config = commands::load_config(cli.config.as_deref(), cli.db)?;
    snapaudit_core::logging_facility::init(config.logging.profile);

    match cli.command {
        Commands::Migrate => commands::migrate::execute(&config),
        Commands::Emby(args) => commands::emby::execute(args, &config),
        Commands::Platform(args) => commands::platform::execute(args, &config),
        Commands::History(args) => commands::history::execute(args, &config),
    }
}
