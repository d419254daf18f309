//! Display formatting for post creation timestamps.

use chrono::{DateTime, FixedOffset};
use thiserror::Error;

/// Format used for `create_time` in harvested records.
pub const DISPLAY_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TimestampError {
    #[error("timestamp {0} is out of range")]
    OutOfRange(i64),
    #[error("UTC offset of {0} hours is out of range")]
    InvalidOffset(i32),
}

/// Build a fixed UTC offset from whole hours.
///
/// # Errors
///
/// Returns an error if the offset is a day or more.
pub fn utc_offset(hours: i32) -> Result<FixedOffset, TimestampError> {
    hours
        .checked_mul(3600)
        .and_then(FixedOffset::east_opt)
        .ok_or(TimestampError::InvalidOffset(hours))
}

/// Render a unix timestamp (seconds) as local wall-clock time.
///
/// # Errors
///
/// Returns an error if the timestamp cannot be represented.
pub fn localize_timestamp(unix_secs: i64, offset: FixedOffset) -> Result<String, TimestampError> {
    let utc = DateTime::from_timestamp(unix_secs, 0).ok_or(TimestampError::OutOfRange(unix_secs))?;
    Ok(utc.with_timezone(&offset).format(DISPLAY_FORMAT).to_string())
}
