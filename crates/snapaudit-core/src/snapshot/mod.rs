//! Snapshot construction and canonical digests.
//!
//! A snapshot is an owned copy of a live record's state taken immediately
//! before a change is applied. Nothing in a [`HistoryRecord`] borrows from
//! the live record, so later mutation of the live record cannot reach it.
//!
//! [`HistoryRecord`]: crate::model::HistoryRecord

pub mod capture;
pub mod digest;

pub use capture::capture;
pub use digest::{canonical_json, fields_digest};
