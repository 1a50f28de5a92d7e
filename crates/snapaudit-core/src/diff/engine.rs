//! Change detector.

use crate::diff::model::ChangeSet;
use crate::errors::Result;
use crate::model::ProfileFields;
use crate::snapshot::digest::fields_digest;

/// Compare `candidate` against the `current` live fields
///
/// - `current == None` is a first observation and always reports `changed`.
/// - `force` reports `changed` even when the digests match; the named
///   changes are still computed so the remark stays accurate.
///
/// # Errors
///
/// `Serialization` if either field set cannot be encoded as JSON.
pub fn detect<F: ProfileFields>(
    current: Option<&F>,
    candidate: &F,
    force: bool,
) -> Result<ChangeSet> {
    let after_digest = fields_digest(candidate)?;

    let Some(current) = current else {
        return Ok(ChangeSet {
            changed: true,
            forced: force,
            first_observation: true,
            changes: Vec::new(),
            before_digest: None,
            after_digest,
        });
    };

    let before_digest = fields_digest(current)?;
    let differs = before_digest != after_digest;

    Ok(ChangeSet {
        changed: differs || force,
        forced: force,
        first_observation: false,
        changes: if differs {
            current.field_changes(candidate)
        } else {
            Vec::new()
        },
        before_digest: Some(before_digest),
        after_digest,
    })
}
