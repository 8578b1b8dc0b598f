//! Shared identifier and timestamp primitives.

use std::time::{SystemTime, UNIX_EPOCH};

/// Monotonic note identifier, unique within its owning notebook.
pub type NoteId = u64;

/// Milliseconds since the Unix epoch.
pub type TimestampMs = u64;

/// Sentinel timestamp meaning "not deleted".
pub const NOT_DELETED: TimestampMs = 0;

/// Returns the current wall clock in milliseconds since the Unix epoch.
pub fn now_ms() -> TimestampMs {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
