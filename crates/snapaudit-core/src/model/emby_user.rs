use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use snapaudit_core_types::Sensitive;

use super::metadata::Metadata;
use super::profile::{push_if_changed, render_opt, EntityKind, ProfileFields};
use super::status::AccountStatus;
use crate::diff::FieldChange;
use crate::errors::{AuditError, Result};

/// Keys written into `extra_data` while an Emby account is banned
pub const EXTRA_IS_DISABLED: &str = "is_disabled";
pub const EXTRA_DISABLED_REASON: &str = "disabled_reason";
pub const EXTRA_DISABLED_AT: &str = "disabled_at";
pub const EXTRA_DISABLED_BY: &str = "disabled_by";

/// Audited fields of an Emby media-server account
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbyUserFields {
    pub name: String,
    pub status: AccountStatus,
    pub password_hash: Option<Sensitive<String>>,
    pub date_created: Option<DateTime<Utc>>,
    pub last_login_date: Option<DateTime<Utc>>,
    pub last_activity_date: Option<DateTime<Utc>>,

    /// The raw user object as last returned by the Emby server
    pub user_dto: Metadata,

    /// Locally maintained annotations (ban markers and the like)
    pub extra_data: Metadata,
}

impl EmbyUserFields {
    /// Interpret an Emby `UserDto` object
    ///
    /// Reads `Name`, the three ISO 8601 date fields and `Policy.IsDisabled`.
    /// A date that cannot be read is left empty rather than failing the DTO.
    /// The password hash and `extra_data` are local state the DTO does not
    /// carry; they come back empty and callers merge them from the live
    /// record.
    ///
    /// # Errors
    ///
    /// `InvalidUserDto` when the DTO is not an object or `Name` is not a
    /// string.
    pub fn from_user_dto(dto: &Value) -> Result<Self> {
        let user_dto = Metadata::from_object(dto).ok_or_else(|| AuditError::InvalidUserDto {
            reason: "user DTO must be a JSON object".to_string(),
        })?;

        let name = match dto.get("Name") {
            None | Some(Value::Null) => String::new(),
            Some(Value::String(s)) => s.clone(),
            Some(other) => {
                return Err(AuditError::InvalidUserDto {
                    reason: format!("Name must be a string, got {}", other),
                })
            }
        };

        let is_disabled = dto
            .get("Policy")
            .and_then(|p| p.get("IsDisabled"))
            .and_then(Value::as_bool)
            .unwrap_or(false);

        Ok(Self {
            name,
            status: if is_disabled {
                AccountStatus::Disabled
            } else {
                AccountStatus::Active
            },
            password_hash: None,
            date_created: parse_dto_date(dto, "DateCreated"),
            last_login_date: parse_dto_date(dto, "LastLoginDate"),
            last_activity_date: parse_dto_date(dto, "LastActivityDate"),
            user_dto,
            extra_data: Metadata::new(),
        })
    }

    /// Carry over local state that an external DTO never contains
    #[must_use]
    pub fn with_local_state(mut self, live: &EmbyUserFields) -> Self {
        self.password_hash = live.password_hash.clone();
        self.extra_data = live.extra_data.clone();
        self
    }

    pub fn is_disabled(&self) -> bool {
        self.status == AccountStatus::Disabled
    }
}

/// Offset-less forms Emby and older exports produce; read as UTC
const NAIVE_DATE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Read an optional ISO 8601 date from the DTO
///
/// Values with an offset are converted to UTC, offset-less ones are taken
/// as UTC, and a bare date means midnight UTC. Anything else is dropped with
/// a warning so one bad field never blocks a sync.
fn parse_dto_date(dto: &Value, key: &str) -> Option<DateTime<Utc>> {
    let raw = match dto.get(key) {
        None | Some(Value::Null) => return None,
        Some(Value::String(s)) => s.trim(),
        Some(other) => {
            tracing::warn!(field = key, value = %other, "Ignoring non-string Emby date");
            return None;
        }
    };
    if raw.is_empty() {
        return None;
    }

    let parsed = DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
        .or_else(|| {
            NAIVE_DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
                .or_else(|| {
                    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                        .ok()
                        .and_then(|d| d.and_hms_opt(0, 0, 0))
                })
                .map(|naive| naive.and_utc())
        });

    if parsed.is_none() {
        tracing::warn!(field = key, value = raw, "Ignoring unparseable Emby date");
    }
    parsed
}

impl ProfileFields for EmbyUserFields {
    const KIND: EntityKind = EntityKind::EmbyUser;

    fn display_name(&self) -> String {
        self.name.clone()
    }

    fn field_changes(&self, next: &Self) -> Vec<FieldChange> {
        let mut changes = Vec::new();
        push_if_changed(&mut changes, "name", &self.name, &next.name, |v| {
            v.clone()
        });
        push_if_changed(&mut changes, "status", &self.status, &next.status, |v| {
            v.to_string()
        });
        push_if_changed(
            &mut changes,
            "password_hash",
            &self.password_hash,
            &next.password_hash,
            render_opt,
        );
        push_if_changed(
            &mut changes,
            "date_created",
            &self.date_created,
            &next.date_created,
            render_opt,
        );
        push_if_changed(
            &mut changes,
            "last_login_date",
            &self.last_login_date,
            &next.last_login_date,
            render_opt,
        );
        push_if_changed(
            &mut changes,
            "last_activity_date",
            &self.last_activity_date,
            &next.last_activity_date,
            render_opt,
        );
        changes
    }
}
