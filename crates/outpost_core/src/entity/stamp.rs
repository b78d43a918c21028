//! Timestamp helpers.

use chrono::{SecondsFormat, Utc};

/// Current time as an RFC 3339 string with millisecond precision.
#[must_use]
pub fn now_rfc3339() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Current time as epoch milliseconds.
#[must_use]
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}
