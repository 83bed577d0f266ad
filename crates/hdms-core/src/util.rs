//! Time arithmetic and timestamp parsing shared by the aggregators.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};

const MILLIS_PER_HOUR: f64 = 3_600_000.0;

// ============================================================================
// Durations
// ============================================================================

/// Fractional hours from `from` to `to` (negative if `to` is earlier).
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn hours_between(from: DateTime<Utc>, to: DateTime<Utc>) -> f64 {
    (to - from).num_milliseconds() as f64 / MILLIS_PER_HOUR
}

/// Whole days contained in `hours`, rounded down.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn whole_days(hours: f64) -> i64 {
    (hours / 24.0).floor() as i64
}

/// True when `instant` falls on the same calendar date as `now` in `tz`.
#[must_use]
pub fn is_same_day<Tz: TimeZone>(instant: DateTime<Utc>, now: DateTime<Utc>, tz: &Tz) -> bool {
    instant.with_timezone(tz).date_naive() == now.with_timezone(tz).date_naive()
}

// ============================================================================
// Timestamp Parsing
// ============================================================================

/// Parse a timestamp as sent by the ticket service.
///
/// Accepts RFC 3339, offset-less ISO datetimes (taken as UTC) and bare dates
/// (midnight UTC). Returns `None` for anything else.
#[must_use]
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }

    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| Utc.from_utc_datetime(&naive))
}
