//! Canonical schema constants for structured logging and events
//!
//! These constants ensure consistency across all logging and error reporting.

// Canonical field keys for structured logging
pub const FIELD_COMPONENT: &str = "component";
pub const FIELD_OP: &str = "op";
pub const FIELD_EVENT: &str = "event";
pub const FIELD_DURATION_MS: &str = "duration_ms";
pub const FIELD_RUN_ID: &str = "run_id";

// Artifact identifiers
pub const FIELD_ARTIFACT_ID: &str = "artifact_id";
pub const FIELD_ALGORITHM: &str = "algorithm";
pub const FIELD_MANIFEST: &str = "manifest";

// Collection sizes
pub const FIELD_ARTIFACT_COUNT: &str = "artifact_count";
pub const FIELD_ENTRY_COUNT: &str = "entry_count";

// Error fields
pub const FIELD_ERR_KIND: &str = "err.kind";
pub const FIELD_ERR_CODE: &str = "err.code";

// Canonical event names
pub const EVENT_START: &str = "start";
pub const EVENT_END: &str = "end";
pub const EVENT_END_ERROR: &str = "end_error";
