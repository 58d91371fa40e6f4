//! License timestamp format.
//!
//! Timestamps are RFC 3339 with an explicit offset. Fractional seconds are
//! written only when present. A trailing bracketed zone region, as written by
//! zoned date-time formatters (`2025-03-04T20:19:40Z[UTC]`), is accepted and
//! ignored when parsing.

use chrono::{DateTime, SecondsFormat, Utc};

/// Formats an instant the way it is stored in a license record.
#[must_use]
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

/// Parses a stored license timestamp into UTC.
///
/// # Errors
///
/// Returns the underlying parse error for anything that is not RFC 3339.
pub fn parse_timestamp(value: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    let value = value.trim();
    let value = match value.find('[') {
        Some(start) if value.ends_with(']') => &value[..start],
        _ => value,
    };
    DateTime::parse_from_rfc3339(value).map(|dt| dt.with_timezone(&Utc))
}
