//! Repository layer for persisting audited records to SQLite
//!
//! Every audited kind owns a live table and a history table, named by
//! [`EntityKind`](snapaudit_core::model::EntityKind). Write functions take an
//! explicit `&Transaction`; reads take `&Connection`, which a transaction
//! derefs to.

pub mod history;
pub mod live;
mod rows;
