//! Time utility functions

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};

/// Naive date-time layouts accepted in addition to RFC 3339, read as UTC
const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Parse a user-supplied date or date-time string
///
/// Accepts RFC 3339 (`2025-06-01T08:00:00Z`, `...+02:00`), naive
/// date-times with or without seconds (`2025-06-01T08:00:00`,
/// `2025-06-01 08:00`, `2025-06-01T08:00Z`) and plain dates (`2025-06-01`,
/// midnight UTC). Returns `None` for anything else.
pub fn parse_datetime(input: &str) -> Option<DateTime<Utc>> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Some(dt.with_timezone(&Utc));
    }

    // `Z` on a naive layout is the same instant as no suffix
    let naive_input = input.strip_suffix('Z').unwrap_or(input);
    for fmt in NAIVE_DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(naive_input, fmt) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }

    NaiveDate::parse_from_str(input, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| Utc.from_utc_datetime(&naive))
}

/// Convert unix seconds to DateTime<Utc>
pub fn secs_to_datetime(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(secs, 0).single().unwrap_or_else(|| {
        tracing::warn!(secs, "Invalid timestamp, using epoch");
        DateTime::UNIX_EPOCH
    })
}

/// Render unix seconds as an RFC 3339 string (millisecond precision)
pub fn secs_to_iso(secs: i64) -> String {
    secs_to_datetime(secs).to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}
