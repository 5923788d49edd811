//! Conversion between the calendar-date form shown in inputs (`YYYY-MM-DD`)
//! and the canonical timestamp form stored on steps.
//!
//! Calendar dates map to midnight UTC, so a date converted to a timestamp
//! and back always yields the same calendar date.

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};

use crate::error::GoalError;

/// Format used for date inputs and date columns in rendered views.
pub const DISPLAY_FORMAT: &str = "%Y-%m-%d";

/// Render a timestamp as a calendar date.
pub fn to_display_date(ts: &DateTime<Utc>) -> String {
    ts.format(DISPLAY_FORMAT).to_string()
}

/// Render a timestamp in canonical round-trip form (RFC 3339, millisecond
/// precision, `Z` suffix).
pub fn to_canonical(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Parse a date typed into a form.
///
/// Accepts a calendar date or a full RFC 3339 timestamp.
pub fn from_display_date(input: &str) -> Result<DateTime<Utc>, GoalError> {
    let trimmed = input.trim();
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, DISPLAY_FORMAT) {
        if let Some(midnight) = date.and_hms_opt(0, 0, 0) {
            return Ok(midnight.and_utc());
        }
    }
    DateTime::parse_from_rfc3339(trimmed)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| GoalError::InvalidDate {
            input: input.to_string(),
        })
}

/// Like [`from_display_date`], but an empty input clears the date.
pub fn parse_optional_date(input: &str) -> Result<Option<DateTime<Utc>>, GoalError> {
    if input.trim().is_empty() {
        return Ok(None);
    }
    from_display_date(input).map(Some)
}
