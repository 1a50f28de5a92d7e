//! snapaudit store - SQLite persistence for audited entities
//!
//! Provides:
//! - Connection setup (WAL, busy timeout) and embedded migrations
//! - Live and history repositories, one table pair per audited kind
//! - The transactional apply that snapshots before every update
//! - The read-only audit trail reader

pub mod audit;
pub mod db;
pub mod errors;
pub mod migrations;
pub mod repo;

// Re-export key types
pub use audit::{
    commit_change, ApplyOutcome, ChangeRequest, HistoryCursor, HistoryPage, HistoryQuery,
    HistoryTrail, TrailOrder,
};
pub use errors::Result;
