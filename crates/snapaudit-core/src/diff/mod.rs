//! Change detection for audited field sets.
//!
//! Decides whether a candidate state differs from the live state and
//! describes the difference for the remark that goes onto the live record.
//!
//! ## Entry point
//!
//! ```
//! use snapaudit_core::diff::{compose_remark, detect};
//! use snapaudit_core::PlatformUserFields;
//!
//! let current = PlatformUserFields { first_name: "Bob".into(), ..Default::default() };
//! let candidate = PlatformUserFields { first_name: "Robert".into(), ..current.clone() };
//!
//! let change_set = detect(Some(&current), &candidate, false).unwrap();
//! assert!(change_set.changed);
//! assert_eq!(compose_remark(&change_set, None), "first_name: 'Bob' -> 'Robert'");
//! ```
//!
//! ## Guarantees
//!
//! - Comparison covers the audited fields only; remarks, timestamps and ids
//!   never count as changes.
//! - Equality is decided on the canonical JSON digest, so metadata maps with
//!   the same entries compare equal regardless of insertion order.

pub mod engine;
pub mod model;
pub mod remark;

pub use engine::detect;
pub use model::{ChangeSet, FieldChange};
pub use remark::compose_remark;
