//! Canonical schema constants for structured logging and events
//!
//! These constants keep field names identical across the store, engine and
//! CLI so log pipelines can filter on them.

// Canonical field keys for structured logging
pub const FIELD_COMPONENT: &str = "component";
pub const FIELD_OP: &str = "op";
pub const FIELD_EVENT: &str = "event";
pub const FIELD_DURATION_MS: &str = "duration_ms";
pub const FIELD_REQUEST_ID: &str = "request_id";
pub const FIELD_TRACE_ID: &str = "trace_id";

// Audited entity identifiers
pub const FIELD_ENTITY_KIND: &str = "entity_kind";
pub const FIELD_SUBJECT_ID: &str = "subject_id";
pub const FIELD_ACTION: &str = "action";
pub const FIELD_HISTORY_ID: &str = "history_id";
pub const FIELD_VERSION: &str = "version";

// Error fields
pub const FIELD_ERR_KIND: &str = "err_kind";
pub const FIELD_ERR_CODE: &str = "err_code";

// Canonical event names
pub const EVENT_START: &str = "start";
pub const EVENT_END: &str = "end";
pub const EVENT_END_ERROR: &str = "end_error";
