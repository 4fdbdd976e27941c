//! Lenient date parsing for publication timestamps
//!
//! Pages declare dates in whatever format their CMS emits, so parsing tries
//! a fixed sequence of machine-readable and human formats. A value that
//! matches no format is simply absent; callers fall back to "now".

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%d.%m.%Y %H:%M:%S",
];

const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%d.%m.%Y",
    "%d/%m/%Y",
    "%B %d, %Y",
    "%b %d, %Y",
    "%d %B %Y",
    "%d %b %Y",
];

/// Parses a date string in any supported format into a UTC timestamp
///
/// Tries, in order: RFC 3339, RFC 2822, offset-suffixed datetimes, unix
/// epoch seconds/milliseconds, then naive datetime and date-only formats
/// (interpreted as UTC).
///
/// # Returns
///
/// `Some(timestamp)` when any format matches, `None` otherwise
pub fn parse_date(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    if let Ok(date) = DateTime::parse_from_rfc3339(value) {
        return Some(date.with_timezone(&Utc));
    }
    if let Ok(date) = DateTime::parse_from_rfc2822(value) {
        return Some(date.with_timezone(&Utc));
    }
    if let Ok(date) = DateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%z") {
        return Some(date.with_timezone(&Utc));
    }

    if let Some(date) = parse_epoch(value) {
        return Some(date);
    }

    for format in DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }
    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(value, format) {
            let naive = date.and_hms_opt(0, 0, 0)?;
            return Some(Utc.from_utc_datetime(&naive));
        }
    }

    None
}

/// Interprets an all-digit string as unix seconds (10 digits or fewer) or
/// milliseconds (13 digits)
fn parse_epoch(value: &str) -> Option<DateTime<Utc>> {
    if value.is_empty() || !value.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let number: i64 = value.parse().ok()?;
    match value.len() {
        0..=10 => Utc.timestamp_opt(number, 0).single(),
        13 => Utc.timestamp_millis_opt(number).single(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_rfc3339() {
        let date = parse_date("2024-03-15T10:30:00Z").unwrap();
        assert_eq!(date.to_rfc3339(), "2024-03-15T10:30:00+00:00");
    }

    #[test]
    fn test_parse_rfc3339_with_offset() {
        let date = parse_date("2024-03-15T10:30:00+02:00").unwrap();
        assert_eq!(date.to_rfc3339(), "2024-03-15T08:30:00+00:00");
    }

    #[test]
    fn test_parse_rfc2822() {
        assert!(parse_date("Fri, 15 Mar 2024 10:30:00 +0000").is_some());
    }

    #[test]
    fn test_parse_naive_datetime() {
        assert!(parse_date("2024-03-15 10:30:00").is_some());
        assert!(parse_date("2024-03-15T10:30:00").is_some());
    }

    #[test]
    fn test_parse_date_only() {
        let date = parse_date("2024-03-15").unwrap();
        assert_eq!(date.to_rfc3339(), "2024-03-15T00:00:00+00:00");
        assert!(parse_date("15.03.2024").is_some());
        assert!(parse_date("March 15, 2024").is_some());
    }

    #[test]
    fn test_parse_unix_seconds() {
        let date = parse_date("1710498600").unwrap();
        assert_eq!(date.to_rfc3339(), "2024-03-15T10:30:00+00:00");
    }

    #[test]
    fn test_parse_unix_millis() {
        let date = parse_date("1710498600000").unwrap();
        assert_eq!(date.to_rfc3339(), "2024-03-15T10:30:00+00:00");
    }

    #[test]
    fn test_parse_garbage() {
        assert_eq!(parse_date(""), None);
        assert_eq!(parse_date("not a date"), None);
        assert_eq!(parse_date("yesterday"), None);
    }

    #[test]
    fn test_parse_trims_whitespace() {
        assert!(parse_date("  2024-03-15  ").is_some());
    }
}
