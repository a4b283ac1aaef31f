//! Time utility functions

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};

/// Format used when binding timestamps as DuckDB parameters
const SQL_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";

/// Render a UTC timestamp for a `CAST(? AS TIMESTAMP)` parameter
pub fn to_sql_timestamp(dt: &DateTime<Utc>) -> String {
    dt.naive_utc().format(SQL_TIMESTAMP_FORMAT).to_string()
}

/// Parse a compact timestamp literal from a filter expression (UTC)
///
/// Filter values cannot contain `-`, so dates are written without separators:
/// `YYYYMMDD`, `YYYYMMDDTHH:MM:SS` or `YYYYMMDDTHHMMSS`.
pub fn parse_compact_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let naive = if raw.len() == 8 {
        NaiveDate::parse_from_str(raw, "%Y%m%d")
            .ok()?
            .and_hms_opt(0, 0, 0)?
    } else {
        ["%Y%m%dT%H:%M:%S", "%Y%m%dT%H%M%S"]
            .iter()
            .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())?
    };
    Some(Utc.from_utc_datetime(&naive))
}

/// Parse a date or datetime query parameter
///
/// Accepts RFC 3339 (any offset, converted to UTC), `YYYY-MM-DDTHH:MM:SS`
/// (UTC) and `YYYY-MM-DD` (start of day, UTC).
pub fn parse_query_datetime(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S") {
        return Some(Utc.from_utc_datetime(&naive));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| Utc.from_utc_datetime(&naive))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn test_to_sql_timestamp() {
        let dt = Utc.with_ymd_and_hms(2024, 3, 5, 7, 8, 9).unwrap();
        assert_eq!(to_sql_timestamp(&dt), "2024-03-05 07:08:09.000000");
    }

    #[test]
    fn test_parse_compact_date() {
        let dt = parse_compact_timestamp("20240115").unwrap();
        assert_eq!(dt, Utc.with_ymd_and_hms(2024, 1, 15, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_parse_compact_datetime_with_colons() {
        let dt = parse_compact_timestamp("20240115T10:30:45").unwrap();
        assert_eq!(dt, Utc.with_ymd_and_hms(2024, 1, 15, 10, 30, 45).unwrap());
    }

    #[test]
    fn test_parse_compact_datetime_without_colons() {
        let dt = parse_compact_timestamp("20240115T103045").unwrap();
        assert_eq!(dt.hour(), 10);
        assert_eq!(dt.minute(), 30);
        assert_eq!(dt.second(), 45);
    }

    #[test]
    fn test_parse_compact_invalid() {
        assert!(parse_compact_timestamp("2024").is_none());
        assert!(parse_compact_timestamp("20241301").is_none());
        assert!(parse_compact_timestamp("yesterday").is_none());
        assert!(parse_compact_timestamp("20240115T25:00:00").is_none());
    }

    #[test]
    fn test_parse_query_datetime_rfc3339_with_offset() {
        let dt = parse_query_datetime("2024-01-15T10:30:00+05:00").unwrap();
        assert_eq!(dt.hour(), 5);
        assert_eq!(dt.minute(), 30);
    }

    #[test]
    fn test_parse_query_datetime_naive() {
        let dt = parse_query_datetime("2024-01-15T10:30:00").unwrap();
        assert_eq!(dt, Utc.with_ymd_and_hms(2024, 1, 15, 10, 30, 0).unwrap());
    }

    #[test]
    fn test_parse_query_datetime_date_only() {
        let dt = parse_query_datetime("2024-02-29").unwrap();
        assert_eq!(dt.year(), 2024);
        assert_eq!(dt.month(), 2);
        assert_eq!(dt.day(), 29);
        assert_eq!(dt.hour(), 0);
    }

    #[test]
    fn test_parse_query_datetime_invalid() {
        assert!(parse_query_datetime("2023-02-29").is_none());
        assert!(parse_query_datetime("15/01/2024").is_none());
        assert!(parse_query_datetime("").is_none());
    }
}
