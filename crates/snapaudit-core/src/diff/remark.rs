//! Remark composition for applied changes.

use crate::diff::model::ChangeSet;

const FIRST_OBSERVATION: &str = "first observation";
const METADATA_CHANGED: &str = "metadata changed";
const FORCED_WITHOUT_CHANGES: &str = "forced snapshot without field changes";

/// Describe an applied change for the live record's remark
///
/// The caller's remark comes first, then the named field changes joined by
/// `"; "`. Without either, a fixed description of why the change was
/// recorded is used. Parts are joined by `" | "`.
pub fn compose_remark(change_set: &ChangeSet, extra_remark: Option<&str>) -> String {
    let extra = extra_remark.map(str::trim).filter(|r| !r.is_empty());

    let mut parts: Vec<String> = Vec::new();
    if let Some(extra) = extra {
        parts.push(extra.to_string());
    }

    if !change_set.changes.is_empty() {
        parts.push(
            change_set
                .changes
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join("; "),
        );
    } else if extra.is_none() {
        let fallback = if change_set.first_observation {
            FIRST_OBSERVATION
        } else if change_set.content_changed() {
            METADATA_CHANGED
        } else {
            FORCED_WITHOUT_CHANGES
        };
        parts.push(fallback.to_string());
    }

    parts.join(" | ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diff::model::FieldChange;

    fn change_set(changes: Vec<FieldChange>, before: Option<&str>, after: &str) -> ChangeSet {
        ChangeSet {
            changed: true,
            forced: false,
            first_observation: before.is_none(),
            changes,
            before_digest: before.map(str::to_string),
            after_digest: after.to_string(),
        }
    }

    #[test]
    fn test_extra_remark_then_changes() {
        let cs = change_set(
            vec![
                FieldChange::new("name", "a", "b"),
                FieldChange::new("status", "active", "disabled"),
            ],
            Some("d1"),
            "d2",
        );
        assert_eq!(
            compose_remark(&cs, Some("spam (ban)")),
            "spam (ban) | name: 'a' -> 'b'; status: 'active' -> 'disabled'"
        );
    }

    #[test]
    fn test_fallbacks() {
        assert_eq!(
            compose_remark(&change_set(vec![], Some("d1"), "d2"), None),
            "metadata changed"
        );
        assert_eq!(
            compose_remark(&change_set(vec![], Some("d1"), "d1"), None),
            "forced snapshot without field changes"
        );
        assert_eq!(
            compose_remark(&change_set(vec![], None, "d1"), None),
            "first observation"
        );
    }

    #[test]
    fn test_extra_remark_alone_suppresses_fallback() {
        let cs = change_set(vec![], Some("d1"), "d1");
        assert_eq!(compose_remark(&cs, Some("manual")), "manual");
    }

    #[test]
    fn test_blank_extra_remark_is_ignored() {
        let cs = change_set(vec![], Some("d1"), "d2");
        assert_eq!(compose_remark(&cs, Some("   ")), "metadata changed");
    }
}
