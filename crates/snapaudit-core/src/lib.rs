//! snapaudit core - audited entity model and change semantics
//!
//! This crate holds everything about snapshot-before-update auditing that
//! does not touch storage:
//! - Live and history record models for the audited kinds (Emby users,
//!   platform users)
//! - The change detector and remark composition
//! - The snapshot constructor and canonical field digests
//! - Error, logging and configuration facilities shared by the store,
//!   engine and CLI crates

pub mod config;
pub mod diff;
pub mod errors;
pub mod logging_facility;
pub mod model;
pub mod snapshot;

// Logging macros expand to paths under these re-exports
pub use snapaudit_core_types;
#[doc(hidden)]
pub use tracing;

pub use config::{ConfigError, StoreConfig};
pub use diff::{compose_remark, detect, ChangeSet, FieldChange};
pub use errors::{AuditError, ExError, ExErrorKind, Result};
pub use model::{
    AccountStatus, AuditStamp, ChangeTag, EmbyUserFields, EntityKind, HistoryRecord, LiveRecord,
    Metadata, PlatformUserFields, ProfileFields,
};
pub use snapshot::capture;
