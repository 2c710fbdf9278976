//! Utility functions for timestamp handling.

pub mod timestamps;

pub use timestamps::{
    format_iso8601, from_unix_millis, now_utc, to_unix_millis, Timestamp, TimestampError,
};
