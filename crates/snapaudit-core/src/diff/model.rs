//! Change detector output types.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One named field that differs between two states
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldChange {
    pub field: String,
    pub before: String,
    pub after: String,
}

impl FieldChange {
    pub fn new(field: impl Into<String>, before: impl Into<String>, after: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            before: before.into(),
            after: after.into(),
        }
    }
}

impl fmt::Display for FieldChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: '{}' -> '{}'", self.field, self.before, self.after)
    }
}

/// Result of comparing a candidate state against the live state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeSet {
    /// True when the change must be recorded (real difference or forced)
    pub changed: bool,
    /// True when the caller asked for a snapshot regardless of difference
    pub forced: bool,
    /// True when there was no live state to compare against
    pub first_observation: bool,
    /// Named field differences, in field declaration order
    pub changes: Vec<FieldChange>,
    /// Digest of the live fields, if any
    pub before_digest: Option<String>,
    /// Digest of the candidate fields
    pub after_digest: String,
}

impl ChangeSet {
    /// True when the audited fields actually differ
    pub fn content_changed(&self) -> bool {
        self.before_digest.as_deref() != Some(self.after_digest.as_str())
    }
}
