use crate::errors::AuditError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Classification of a recorded change
///
/// Persisted as lowercase text in the `action` column of history tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeTag {
    Update,
    SystemUpdate,
    Ban,
    Unban,
    Delete,
    Restore,
}

impl ChangeTag {
    pub const ALL: [ChangeTag; 6] = [
        ChangeTag::Update,
        ChangeTag::SystemUpdate,
        ChangeTag::Ban,
        ChangeTag::Unban,
        ChangeTag::Delete,
        ChangeTag::Restore,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeTag::Update => "update",
            ChangeTag::SystemUpdate => "system_update",
            ChangeTag::Ban => "ban",
            ChangeTag::Unban => "unban",
            ChangeTag::Delete => "delete",
            ChangeTag::Restore => "restore",
        }
    }

    /// Resolve the tag for an apply
    ///
    /// An explicit tag always wins. Otherwise a caller-supplied remark marks
    /// the change as `system_update`, and anything else is a plain `update`.
    /// Force mode plays no part in the choice.
    pub fn resolve(explicit: Option<ChangeTag>, remark: Option<&str>) -> ChangeTag {
        match (explicit, remark) {
            (Some(tag), _) => tag,
            (None, Some(r)) if !r.trim().is_empty() => ChangeTag::SystemUpdate,
            (None, _) => ChangeTag::Update,
        }
    }
}

impl fmt::Display for ChangeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChangeTag {
    type Err = AuditError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ChangeTag::ALL
            .into_iter()
            .find(|tag| tag.as_str() == s)
            .ok_or_else(|| AuditError::UnknownChangeTag { tag: s.to_string() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_form_parses_back() {
        for tag in ChangeTag::ALL {
            assert_eq!(tag.to_string().parse::<ChangeTag>().unwrap(), tag);
        }
    }

    #[test]
    fn test_unknown_tag_is_rejected() {
        let err = "purge".parse::<ChangeTag>().unwrap_err();
        assert_eq!(
            err,
            AuditError::UnknownChangeTag {
                tag: "purge".to_string()
            }
        );
    }

    #[test]
    fn test_serde_matches_text_form() {
        assert_eq!(
            serde_json::to_string(&ChangeTag::SystemUpdate).unwrap(),
            "\"system_update\""
        );
    }

    #[test]
    fn test_resolve_precedence() {
        assert_eq!(
            ChangeTag::resolve(Some(ChangeTag::Ban), Some("auto ban")),
            ChangeTag::Ban
        );
        assert_eq!(
            ChangeTag::resolve(None, Some("auto sync")),
            ChangeTag::SystemUpdate
        );
        assert_eq!(ChangeTag::resolve(None, Some("  ")), ChangeTag::Update);
        assert_eq!(ChangeTag::resolve(None, None), ChangeTag::Update);
    }
}
