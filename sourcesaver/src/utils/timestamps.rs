//! Timestamp utilities for stored searches.
//!
//! Snapshots carry `updatedAt` as Unix epoch milliseconds, the format the
//! browser-side storage has always used.

use chrono::{DateTime, TimeZone, Utc};
use thiserror::Error;

/// Represents a timestamp that can be serialized/deserialized.
pub type Timestamp = DateTime<Utc>;

/// Errors that can occur during timestamp conversion.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum TimestampError {
    /// The value is outside the range chrono can represent.
    #[error("Timestamp out of range: {0} ms")]
    OutOfRange(i64),
}

/// Returns the current UTC timestamp.
#[must_use]
pub fn now_utc() -> Timestamp {
    Utc::now()
}

/// Converts Unix epoch milliseconds into a timestamp.
///
/// # Examples
///
/// ```
/// use sourcesaver::utils::{from_unix_millis, to_unix_millis};
///
/// let ts = from_unix_millis(1_696_512_000_123).unwrap();
/// assert_eq!(to_unix_millis(&ts), 1_696_512_000_123);
/// ```
pub fn from_unix_millis(millis: i64) -> Result<Timestamp, TimestampError> {
    Utc.timestamp_millis_opt(millis)
        .single()
        .ok_or(TimestampError::OutOfRange(millis))
}

/// Converts a timestamp into Unix epoch milliseconds.
#[must_use]
pub fn to_unix_millis(ts: &Timestamp) -> i64 {
    ts.timestamp_millis()
}

/// Formats a timestamp as an ISO 8601 string with millisecond precision.
#[must_use]
pub fn format_iso8601(ts: &Timestamp) -> String {
    ts.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string()
}
