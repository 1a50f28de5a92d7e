//! Snapshot constructor.

use chrono::{DateTime, Utc};

use crate::errors::Result;
use crate::model::{ChangeTag, HistoryRecord, LiveRecord, ProfileFields};
use crate::snapshot::digest::fields_digest;

/// Capture the current state of `live` as an unpersisted history record
///
/// Every audited field is cloned, including both metadata maps, together
/// with the live remark, stamp and version. `history_id` stays `None` until
/// the store appends the record.
///
/// # Errors
///
/// `Serialization` if the field set cannot be digested.
pub fn capture<F: ProfileFields>(
    live: &LiveRecord<F>,
    action: ChangeTag,
    recorded_at: DateTime<Utc>,
    recorded_by: Option<i64>,
) -> Result<HistoryRecord<F>> {
    Ok(HistoryRecord {
        history_id: None,
        subject_id: live.subject_id.clone(),
        fields: live.fields.clone(),
        fields_digest: fields_digest(&live.fields)?,
        action,
        remark: live.remark.clone(),
        source_stamp: live.stamp.clone(),
        source_version: live.version,
        recorded_at,
        recorded_by,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{EmbyUserFields, Metadata};
    use serde_json::json;

    #[test]
    fn test_capture_copies_state_and_provenance() {
        let fields = EmbyUserFields::from_user_dto(&json!({"Name": "alice"})).unwrap();
        let live = LiveRecord::new("e-1", fields, Some("created".into()), Utc::now(), Some(7));

        let snap = capture(&live, ChangeTag::Update, Utc::now(), Some(8)).unwrap();

        assert_eq!(snap.subject_id, "e-1");
        assert_eq!(snap.fields, live.fields);
        assert_eq!(snap.remark.as_deref(), Some("created"));
        assert_eq!(snap.source_version, 1);
        assert_eq!(snap.source_stamp, live.stamp);
        assert_eq!(snap.recorded_by, Some(8));
        assert!(snap.history_id.is_none());
    }

    #[test]
    fn test_capture_survives_live_mutation() {
        let fields = EmbyUserFields::from_user_dto(&json!({"Name": "alice"})).unwrap();
        let mut live = LiveRecord::new("e-1", fields, None, Utc::now(), None);

        let snap = capture(&live, ChangeTag::Ban, Utc::now(), None).unwrap();
        live.fields.name = "mallory".to_string();
        live.fields.extra_data = Metadata::new().with("is_disabled", true);

        assert_eq!(snap.fields.name, "alice");
        assert!(snap.fields.extra_data.is_empty());
    }
}
