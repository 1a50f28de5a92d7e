//! snapaudit engine - upstream business operations
//!
//! Expresses the operations that change audited entities (profile sync,
//! ban/unban, retire/restore, bulk reconciliation) as engine commands over
//! the store's transactional apply.

pub mod commands;
pub mod context;

pub use commands::engine_command::{apply_engine_command, EngineCommand, EngineCommandResult};
pub use commands::reconcile::ReconcileReport;
pub use context::EngineContext;
