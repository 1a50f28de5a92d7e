use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Audit metadata carried by every live record
///
/// Actors are upstream user ids (Telegram ids); `None` means the change came
/// from the system itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditStamp {
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub created_by: Option<i64>,
    pub updated_by: Option<i64>,
    pub is_deleted: bool,
    pub deleted_at: Option<DateTime<Utc>>,
    pub deleted_by: Option<i64>,
}

impl AuditStamp {
    /// Stamp for a record first observed at `at`
    pub fn created(at: DateTime<Utc>, by: Option<i64>) -> Self {
        Self {
            created_at: at,
            updated_at: at,
            created_by: by,
            updated_by: by,
            is_deleted: false,
            deleted_at: None,
            deleted_by: None,
        }
    }

    #[must_use]
    pub fn touched(&self, at: DateTime<Utc>, by: Option<i64>) -> Self {
        Self {
            updated_at: at,
            updated_by: by,
            ..self.clone()
        }
    }

    /// Touch and mark soft-deleted
    #[must_use]
    pub fn retired(&self, at: DateTime<Utc>, by: Option<i64>) -> Self {
        Self {
            is_deleted: true,
            deleted_at: Some(at),
            deleted_by: by,
            ..self.touched(at, by)
        }
    }

    /// Touch and clear the soft-delete markers
    #[must_use]
    pub fn restored(&self, at: DateTime<Utc>, by: Option<i64>) -> Self {
        Self {
            is_deleted: false,
            deleted_at: None,
            deleted_by: None,
            ..self.touched(at, by)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_touched_keeps_creation() {
        let t0 = Utc::now();
        let t1 = t0 + Duration::seconds(5);
        let stamp = AuditStamp::created(t0, Some(1)).touched(t1, Some(2));

        assert_eq!(stamp.created_at, t0);
        assert_eq!(stamp.created_by, Some(1));
        assert_eq!(stamp.updated_at, t1);
        assert_eq!(stamp.updated_by, Some(2));
    }

    #[test]
    fn test_retire_then_restore() {
        let t0 = Utc::now();
        let retired = AuditStamp::created(t0, None).retired(t0, Some(9));
        assert!(retired.is_deleted);
        assert_eq!(retired.deleted_by, Some(9));

        let restored = retired.restored(t0, Some(9));
        assert!(!restored.is_deleted);
        assert!(restored.deleted_at.is_none());
        assert!(restored.deleted_by.is_none());
    }
}
