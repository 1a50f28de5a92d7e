//! Snapshot-before-update auditing over the repositories
//!
//! - [`apply_change`] / [`commit_change`]: detect, snapshot, append, update
//! - [`retire`] / [`restore`]: soft-delete transitions, always recorded
//! - [`reader`]: read-only access to the audit trail
//! - [`live`]: read-only access to live records

pub mod apply;
pub mod live;
pub mod reader;

pub use apply::{apply_change, commit_change, restore, retire, ApplyOutcome, ChangeRequest};
pub use reader::{
    count, read_page, trail, HistoryCursor, HistoryPage, HistoryQuery, HistoryTrail, TrailOrder,
};
