//! Timestamp parsing for incremental pulls
//!
//! Clients supply `updatedAt` as a string or as epoch milliseconds and
//! `since` as a string. Values are stored verbatim and only parsed when
//! compared.

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use serde_json::Value;

/// Zone-less date-time layouts accepted after RFC 3339, read as UTC
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
];

/// Largest epoch offset a browser `Date` can hold, in milliseconds
const MAX_EPOCH_MILLIS: f64 = 8.64e15;

/// Parse a client timestamp.
///
/// Accepts RFC 3339, RFC 2822 (`Thu, 01 Jan 2026 00:00:00 GMT`), a bare
/// `YYYY`, `YYYY-MM` or `YYYY-MM-DD` (midnight UTC) and zone-less
/// date-times (UTC). Returns `None` for anything else.
pub fn parse_timestamp(input: &str) -> Option<DateTime<Utc>> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Some(dt.with_timezone(&Utc));
    }

    if let Ok(dt) = DateTime::parse_from_rfc2822(input) {
        return Some(dt.with_timezone(&Utc));
    }

    if let Some(date) = parse_partial_date(input) {
        return date.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc());
    }

    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(input, fmt).ok())
        .map(|dt| dt.and_utc())
}

/// `YYYY`, `YYYY-MM` or `YYYY-MM-DD`, missing parts defaulting to 1
fn parse_partial_date(input: &str) -> Option<NaiveDate> {
    let is_year = |s: &str| s.len() == 4 && s.bytes().all(|b| b.is_ascii_digit());

    match input.len() {
        4 if is_year(input) => NaiveDate::from_ymd_opt(input.parse().ok()?, 1, 1),
        7 => NaiveDate::parse_from_str(&format!("{input}-01"), "%Y-%m-%d").ok(),
        10 => NaiveDate::parse_from_str(input, "%Y-%m-%d").ok(),
        _ => None,
    }
}

/// Interpret a stored `updatedAt` value.
///
/// Strings go through [`parse_timestamp`]; numbers are epoch milliseconds
/// with any fraction dropped. Other JSON types have no time.
pub fn value_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::String(s) => parse_timestamp(s),
        Value::Number(n) => {
            let millis = n.as_f64()?;
            if !millis.is_finite() || millis.abs() > MAX_EPOCH_MILLIS {
                return None;
            }
            DateTime::from_timestamp_millis(millis.trunc() as i64)
        }
        _ => None,
    }
}

/// Whether `updated_at` is strictly later than `since`.
///
/// A missing or unparseable `updated_at` never compares as later.
pub fn is_after(updated_at: Option<&Value>, since: &DateTime<Utc>) -> bool {
    updated_at
        .and_then(value_timestamp)
        .is_some_and(|ts| ts > *since)
}

/// Current time in the `YYYY-MM-DDTHH:MM:SS.mmmZ` form browsers produce
pub fn now_iso() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn test_parse_rfc3339() {
        let ts = parse_timestamp("2026-01-01T00:00:00Z").unwrap();
        assert_eq!(ts, Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap());

        let ts = parse_timestamp("2026-01-01T02:00:00+02:00").unwrap();
        assert_eq!(ts, Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_parse_date_only() {
        let ts = parse_timestamp("2026-03-15").unwrap();
        assert_eq!(ts, Utc.with_ymd_and_hms(2026, 3, 15, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_parse_naive_as_utc() {
        let ts = parse_timestamp("2026-03-15T10:30:00.250").unwrap();
        assert_eq!(ts.timestamp_millis() % 1000, 250);

        let ts = parse_timestamp("2026-03-15T10:30").unwrap();
        assert_eq!(ts, Utc.with_ymd_and_hms(2026, 3, 15, 10, 30, 0).unwrap());
    }

    #[test]
    fn test_parse_garbage() {
        assert!(parse_timestamp("").is_none());
        assert!(parse_timestamp("yesterday").is_none());
        assert!(parse_timestamp("2026-13-45").is_none());
    }

    #[test]
    fn test_parse_rfc2822() {
        let ts = parse_timestamp("Thu, 01 Jan 2026 00:00:00 GMT").unwrap();
        assert_eq!(ts, Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap());

        let ts = parse_timestamp("Thu, 01 Jan 2026 02:00:00 +0200").unwrap();
        assert_eq!(ts, Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_parse_year_and_month() {
        let ts = parse_timestamp("2026").unwrap();
        assert_eq!(ts, Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap());

        let ts = parse_timestamp("2026-04").unwrap();
        assert_eq!(ts, Utc.with_ymd_and_hms(2026, 4, 1, 0, 0, 0).unwrap());

        assert!(parse_timestamp("20x6").is_none());
        assert!(parse_timestamp("2026-13").is_none());
    }

    #[test]
    fn test_value_timestamp_epoch_millis() {
        let expected = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();

        assert_eq!(value_timestamp(&json!(1767225600000u64)), Some(expected));
        assert_eq!(value_timestamp(&json!(1767225600000.9)), Some(expected));
        assert_eq!(value_timestamp(&json!("2026-01-01T00:00:00Z")), Some(expected));
        assert!(value_timestamp(&json!(1e300)).is_none());
        assert!(value_timestamp(&json!(true)).is_none());
        assert!(value_timestamp(&json!({"at": 1})).is_none());
    }

    #[test]
    fn test_is_after() {
        let since = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();

        assert!(is_after(Some(&json!("2026-01-01T00:00:01Z")), &since));
        assert!(!is_after(Some(&json!("2026-01-01T00:00:00Z")), &since));
        assert!(!is_after(Some(&json!("2025-12-31T23:59:59Z")), &since));
        assert!(!is_after(Some(&json!("not a date")), &since));
        assert!(is_after(Some(&json!(1767225601000u64)), &since));
        assert!(!is_after(Some(&json!(1767225600000u64)), &since));
        assert!(!is_after(None, &since));
    }

    #[test]
    fn test_now_iso_shape() {
        let now = now_iso();
        assert!(now.ends_with('Z'));
        // 2026-01-01T00:00:00.000Z
        assert_eq!(now.len(), 24);
        assert!(parse_timestamp(&now).is_some());
    }
}
