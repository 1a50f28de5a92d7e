//! Audit trail listing

use super::{open, CliResult};
use clap::{Args, ValueEnum};
use rusqlite::Connection;
use snapaudit_core::model::{
    ChangeTag, EmbyUserFields, HistoryRecord, PlatformUserFields, ProfileFields,
};
use snapaudit_core::StoreConfig;
use snapaudit_store::audit::{read_page, trail};
use snapaudit_store::{HistoryCursor, HistoryQuery};

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum KindArg {
    Emby,
    Platform,
}

#[derive(Debug, Args)]
pub struct HistoryArgs {
    #[arg(long, value_enum)]
    pub kind: KindArg,

    #[arg(long)]
    pub id: String,

    #[arg(long)]
    pub newest_first: bool,

    /// Only these actions (repeatable)
    #[arg(long = "action", value_parser = parse_action)]
    pub actions: Vec<ChangeTag>,

    /// Page size; defaults to the configured trail page size
    #[arg(long)]
    pub limit: Option<u32>,

    /// Continue after this cursor
    #[arg(long)]
    pub after: Option<HistoryCursor>,

    /// Print every matching row instead of one page
    #[arg(long, conflicts_with = "after")]
    pub all: bool,
}

fn parse_action(s: &str) -> Result<ChangeTag, String> {
    s.parse::<ChangeTag>().map_err(|e| e.to_string())
}

pub fn execute(args: HistoryArgs, config: &StoreConfig) -> CliResult {
    let conn = open(config)?;
    match args.kind {
        KindArg::Emby => list::<EmbyUserFields>(&conn, &args, config),
        KindArg::Platform => list::<PlatformUserFields>(&conn, &args, config),
    }
}

fn list<F: ProfileFields>(conn: &Connection, args: &HistoryArgs, config: &StoreConfig) -> CliResult {
    let mut query = HistoryQuery::for_subject(args.id.as_str())
        .with_actions(args.actions.iter().copied())
        .with_limit(args.limit.unwrap_or(config.trail.page_size));
    if args.newest_first {
        query = query.newest_first();
    }
    if let Some(cursor) = args.after {
        query = query.starting_after(cursor);
    }

    if args.all {
        let mut rows = 0;
        for record in trail::<F>(conn, query) {
            print_row(&record?);
            rows += 1;
        }
        println!("{} row(s)", rows);
        return Ok(());
    }

    let page = read_page::<F>(conn, &query)?;
    for record in &page.items {
        print_row(record);
    }
    println!("{} row(s)", page.items.len());
    if let Some(next) = page.next {
        println!("next: {}", next);
    }
    Ok(())
}

fn print_row<F: ProfileFields>(record: &HistoryRecord<F>) {
    println!(
        "#{} {} {} v{} {}",
        record.history_id.unwrap_or_default(),
        record.recorded_at.to_rfc3339(),
        record.action,
        record.source_version,
        record.fields.display_name()
    );
    if let Some(remark) = &record.remark {
        println!("    remark: {}", remark);
    }
}
