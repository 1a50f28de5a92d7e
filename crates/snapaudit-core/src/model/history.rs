use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::audit_stamp::AuditStamp;
use super::change_tag::ChangeTag;
use super::profile::ProfileFields;

/// Immutable snapshot of a live record's state before a change
///
/// `subject_id` references the live record by value only. `remark`,
/// `source_stamp` and `source_version` are the live record's own values at
/// capture time, so every row describes itself without a join.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound = "F: ProfileFields")]
pub struct HistoryRecord<F: ProfileFields> {
    /// Assigned by the store on append; `None` until persisted
    pub history_id: Option<i64>,

    pub subject_id: String,

    /// Full copy of the pre-change field set
    pub fields: F,

    /// SHA-256 of the canonical JSON encoding of `fields`
    pub fields_digest: String,

    pub action: ChangeTag,

    /// The live record's remark before the change
    pub remark: Option<String>,

    pub source_stamp: AuditStamp,
    pub source_version: i64,

    pub recorded_at: DateTime<Utc>,
    pub recorded_by: Option<i64>,
}

impl<F: ProfileFields> HistoryRecord<F> {
    #[must_use]
    pub fn with_history_id(mut self, history_id: i64) -> Self {
        self.history_id = Some(history_id);
        self
    }
}
