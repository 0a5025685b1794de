//! Date/time utilities for fileshare.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, SecondsFormat, TimeZone, Utc};
use chrono_tz::Tz;

use crate::{FileShareError, Result};

/// Naive formats accepted for expiry input, interpreted in the configured timezone.
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%d %H:%M:%S",
];

/// Parse a user-supplied expiry date.
///
/// Returns `Ok(None)` for the "never expires" sentinel (empty input or `never`).
///
/// Accepted forms:
/// - RFC 3339 with offset (`2024-01-15T10:30:00+09:00`)
/// - `YYYY-MM-DDTHH:MM[:SS]` or `YYYY-MM-DD HH:MM[:SS]` in `timezone`
/// - `YYYY-MM-DD`, meaning the last second of that day in `timezone`
pub fn parse_expire_date(input: &str, timezone: &str) -> Result<Option<DateTime<Utc>>> {
    let input = input.trim();
    if input.is_empty() || input.eq_ignore_ascii_case("never") {
        return Ok(None);
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Ok(Some(dt.with_timezone(&Utc)));
    }

    let tz: Tz = timezone
        .parse()
        .map_err(|_| FileShareError::Config(format!("unknown timezone: {timezone}")))?;

    let naive = NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(input, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(input, "%Y-%m-%d")
                .ok()
                .and_then(|d| NaiveTime::from_hms_opt(23, 59, 59).map(|t| d.and_time(t)))
        })
        .ok_or_else(|| FileShareError::Validation(format!("invalid expire_date: {input}")))?;

    let local = tz.from_local_datetime(&naive).earliest().ok_or_else(|| {
        FileShareError::Validation(format!("expire_date does not exist in {timezone}: {input}"))
    })?;

    Ok(Some(local.with_timezone(&Utc)))
}

/// Format a UTC datetime as RFC 3339 with a `Z` suffix (second precision).
pub fn to_rfc3339(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Secs, true)
}
