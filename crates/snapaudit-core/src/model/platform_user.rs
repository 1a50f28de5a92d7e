use serde::{Deserialize, Serialize};

use super::metadata::Metadata;
use super::profile::{push_if_changed, render_opt, EntityKind, ProfileFields};
use super::status::AccountStatus;
use crate::diff::FieldChange;

/// Audited profile of a chat-platform (Telegram) user
///
/// Missing keys deserialize to their defaults, so a bare platform `User`
/// object is accepted as-is.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PlatformUserFields {
    pub is_bot: bool,
    pub first_name: String,
    pub last_name: Option<String>,
    pub username: Option<String>,
    pub language_code: Option<String>,
    pub is_premium: Option<bool>,
    pub added_to_attachment_menu: Option<bool>,
    pub status: AccountStatus,
    pub extra: Metadata,
}

impl PlatformUserFields {
    pub fn is_banned(&self) -> bool {
        self.status == AccountStatus::Banned
    }

    /// Keep the local ban state when a fresh profile arrives from the platform
    #[must_use]
    pub fn with_local_state(mut self, live: &PlatformUserFields) -> Self {
        self.status = live.status;
        self.extra = live.extra.clone();
        self
    }
}

impl ProfileFields for PlatformUserFields {
    const KIND: EntityKind = EntityKind::PlatformUser;

    fn display_name(&self) -> String {
        match (&self.username, &self.last_name) {
            (Some(username), _) => format!("@{}", username),
            (None, Some(last)) => format!("{} {}", self.first_name, last),
            (None, None) => self.first_name.clone(),
        }
    }

    fn field_changes(&self, next: &Self) -> Vec<FieldChange> {
        let mut changes = Vec::new();
        push_if_changed(&mut changes, "is_bot", &self.is_bot, &next.is_bot, |v| {
            v.to_string()
        });
        push_if_changed(
            &mut changes,
            "first_name",
            &self.first_name,
            &next.first_name,
            |v| v.clone(),
        );
        push_if_changed(
            &mut changes,
            "last_name",
            &self.last_name,
            &next.last_name,
            render_opt,
        );
        push_if_changed(
            &mut changes,
            "username",
            &self.username,
            &next.username,
            render_opt,
        );
        push_if_changed(
            &mut changes,
            "language_code",
            &self.language_code,
            &next.language_code,
            render_opt,
        );
        push_if_changed(
            &mut changes,
            "is_premium",
            &self.is_premium,
            &next.is_premium,
            render_opt,
        );
        push_if_changed(
            &mut changes,
            "added_to_attachment_menu",
            &self.added_to_attachment_menu,
            &next.added_to_attachment_menu,
            render_opt,
        );
        push_if_changed(&mut changes, "status", &self.status, &next.status, |v| {
            v.to_string()
        });
        changes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> PlatformUserFields {
        PlatformUserFields {
            first_name: "Bob".to_string(),
            username: Some("bob".to_string()),
            language_code: Some("en".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_display_name_prefers_username() {
        assert_eq!(user().display_name(), "@bob");
        let anon = PlatformUserFields {
            username: None,
            last_name: Some("Stone".to_string()),
            ..user()
        };
        assert_eq!(anon.display_name(), "Bob Stone");
    }

    #[test]
    fn test_field_changes_lists_each_field() {
        let before = user();
        let after = PlatformUserFields {
            username: None,
            is_premium: Some(true),
            ..user()
        };
        let rendered: Vec<String> = before
            .field_changes(&after)
            .iter()
            .map(ToString::to_string)
            .collect();
        assert_eq!(
            rendered,
            vec![
                "username: 'bob' -> 'none'".to_string(),
                "is_premium: 'none' -> 'true'".to_string(),
            ]
        );
    }

    #[test]
    fn test_with_local_state_keeps_ban() {
        let live = PlatformUserFields {
            status: AccountStatus::Banned,
            ..user()
        };
        let fresh = PlatformUserFields {
            first_name: "Robert".to_string(),
            ..user()
        }
        .with_local_state(&live);
        assert!(fresh.is_banned());
        assert_eq!(fresh.first_name, "Robert");
    }

    #[test]
    fn test_bare_platform_user_deserializes_with_defaults() {
        let fields: PlatformUserFields = serde_json::from_value(serde_json::json!({
            "id": 42,
            "is_bot": false,
            "first_name": "Ann",
            "username": "ann"
        }))
        .unwrap();
        assert_eq!(fields.first_name, "Ann");
        assert_eq!(fields.status, AccountStatus::Active);
        assert!(fields.extra.is_empty());
    }
}
