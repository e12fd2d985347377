//! Canonical schema constants for structured logging and events
//!
//! These constants ensure consistency across all logging and error reporting.

// Canonical field keys for structured logging
pub const FIELD_COMPONENT: &str = "component";
pub const FIELD_OP: &str = "op";
pub const FIELD_EVENT: &str = "event";
pub const FIELD_DURATION_MS: &str = "duration_ms";
pub const FIELD_INVOCATION_ID: &str = "invocation_id";

// Graph position
pub const FIELD_PATH: &str = "path";
pub const FIELD_STEP: &str = "step";

// Outcome sizes
pub const FIELD_FAILURE_COUNT: &str = "failure_count";
pub const FIELD_PREDICATE_COUNT: &str = "predicate_count";
pub const FIELD_ELEMENT_COUNT: &str = "element_count";

// Error fields
pub const FIELD_ERR_KIND: &str = "err.kind";
pub const FIELD_ERR_CODE: &str = "err.code";

// Canonical event names
pub const EVENT_START: &str = "start";
pub const EVENT_END: &str = "end";
pub const EVENT_END_ERROR: &str = "end_error";

// Canonical operation names
pub const OP_ASSERT_EQUIVALENCY: &str = "assert_equivalency";
pub const OP_SATISFY: &str = "satisfy";
pub const OP_SATISFY_RESPECTIVELY: &str = "satisfy_respectively";
