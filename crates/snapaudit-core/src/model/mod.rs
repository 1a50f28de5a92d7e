//! Audited entity models
//!
//! Each audited kind is an explicit field struct implementing
//! [`ProfileFields`]. Live and history records are generic over it, so the
//! snapshot constructor and the store never copy attributes by name.

pub mod audit_stamp;
pub mod change_tag;
pub mod emby_user;
pub mod history;
pub mod live;
pub mod metadata;
pub mod platform_user;
pub mod profile;
pub mod status;

pub use audit_stamp::AuditStamp;
pub use change_tag::ChangeTag;
pub use emby_user::EmbyUserFields;
pub use history::HistoryRecord;
pub use live::LiveRecord;
pub use metadata::Metadata;
pub use platform_user::PlatformUserFields;
pub use profile::{EntityKind, ProfileFields};
pub use status::AccountStatus;
