//! Time helpers.
//!
//! Timestamps travel as Unix milliseconds inside the process and are rendered
//! as RFC 3339 UTC strings with millisecond precision on the wire.

use chrono::{DateTime, SecondsFormat, Utc};

/// Get current Unix timestamp in UTC (milliseconds)
pub fn current_timestamp_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// Render a Unix millisecond timestamp as `2025-01-01T00:00:00.000Z`.
///
/// Out-of-range values fall back to the Unix epoch.
pub fn timestamp_to_rfc3339(millis: i64) -> String {
    DateTime::<Utc>::from_timestamp_millis(millis)
        .unwrap_or(DateTime::UNIX_EPOCH)
        .to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Current time as an RFC 3339 UTC string.
pub fn now_rfc3339() -> String {
    timestamp_to_rfc3339(current_timestamp_millis())
}
