use crate::diff::FieldChange;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The audited entity kinds
///
/// Each kind owns one live table and one append-only history table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    EmbyUser,
    PlatformUser,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::EmbyUser => "emby_user",
            EntityKind::PlatformUser => "platform_user",
        }
    }

    pub fn live_table(&self) -> &'static str {
        match self {
            EntityKind::EmbyUser => "emby_users",
            EntityKind::PlatformUser => "platform_users",
        }
    }

    pub fn history_table(&self) -> &'static str {
        match self {
            EntityKind::EmbyUser => "emby_user_history",
            EntityKind::PlatformUser => "platform_user_history",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An audited mutable field set
///
/// Implementors enumerate their fields explicitly. Equality and the
/// canonical JSON encoding cover exactly the audited fields, never ids,
/// remarks or timestamps.
pub trait ProfileFields:
    Clone + PartialEq + fmt::Debug + Serialize + DeserializeOwned + Send + Sync + 'static
{
    const KIND: EntityKind;

    /// Short label used in logs and CLI output
    fn display_name(&self) -> String;

    /// Per-field, human-readable differences from `self` to `next`
    ///
    /// Raw metadata maps are not itemised here.
    fn field_changes(&self, next: &Self) -> Vec<FieldChange>;
}

/// Render an optional value for a change description
pub(crate) fn render_opt<T: fmt::Display>(value: &Option<T>) -> String {
    match value {
        Some(v) => v.to_string(),
        None => "none".to_string(),
    }
}

/// Push a change for `field` when the values differ
pub(crate) fn push_if_changed<T: PartialEq>(
    changes: &mut Vec<FieldChange>,
    field: &str,
    before: &T,
    after: &T,
    render: impl Fn(&T) -> String,
) {
    if before != after {
        changes.push(FieldChange::new(field, render(before), render(after)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tables_per_kind() {
        assert_eq!(EntityKind::EmbyUser.live_table(), "emby_users");
        assert_eq!(EntityKind::EmbyUser.history_table(), "emby_user_history");
        assert_eq!(EntityKind::PlatformUser.live_table(), "platform_users");
        assert_eq!(
            EntityKind::PlatformUser.history_table(),
            "platform_user_history"
        );
    }

    #[test]
    fn test_render_opt() {
        assert_eq!(render_opt(&Some(3)), "3");
        assert_eq!(render_opt::<i32>(&None), "none");
    }
}
