use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::audit_stamp::AuditStamp;
use super::change_tag::ChangeTag;
use super::profile::ProfileFields;

/// Current authoritative state of one audited subject
///
/// There is at most one live record per `subject_id`. Records are only ever
/// soft-deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound = "F: ProfileFields")]
pub struct LiveRecord<F: ProfileFields> {
    /// Stable external identifier, never changes
    pub subject_id: String,

    pub fields: F,

    /// Description of the most recently applied change
    pub remark: Option<String>,

    pub stamp: AuditStamp,

    /// Optimistic concurrency counter; starts at 1, +1 per applied change
    pub version: i64,
}

impl<F: ProfileFields> LiveRecord<F> {
    /// A record seen for the first time
    pub fn new(
        subject_id: impl Into<String>,
        fields: F,
        remark: Option<String>,
        at: DateTime<Utc>,
        by: Option<i64>,
    ) -> Self {
        Self {
            subject_id: subject_id.into(),
            fields,
            remark,
            stamp: AuditStamp::created(at, by),
            version: 1,
        }
    }

    pub fn is_deleted(&self) -> bool {
        self.stamp.is_deleted
    }

    /// The state this record moves to when `fields` are applied under `tag`
    ///
    /// `delete` sets the soft-delete markers and `restore` clears them.
    #[must_use]
    pub fn advance(
        &self,
        fields: F,
        remark: String,
        tag: ChangeTag,
        at: DateTime<Utc>,
        by: Option<i64>,
    ) -> Self {
        let stamp = match tag {
            ChangeTag::Delete => self.stamp.retired(at, by),
            ChangeTag::Restore => self.stamp.restored(at, by),
            _ => self.stamp.touched(at, by),
        };
        Self {
            subject_id: self.subject_id.clone(),
            fields,
            remark: Some(remark),
            stamp,
            version: self.version + 1,
        }
    }
}
