//! Database helper functions for safe type conversions.

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::types::Type;

/// Render a timestamp the way every `*_time`/`*_seen` column stores it.
///
/// Whole seconds in UTC with a `Z` suffix, so the text sorts in time order
/// and range scans can compare strings directly.
pub fn format_datetime(dt: DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Parse an RFC3339 datetime string from database, returning a rusqlite error on failure.
pub fn parse_datetime(s: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(0, Type::Text, Box::new(e)))
}

/// Parse an optional RFC3339 column, treating a NULL as `None`.
pub fn parse_optional_datetime(s: Option<String>) -> rusqlite::Result<Option<DateTime<Utc>>> {
    s.as_deref().map(parse_datetime).transpose()
}

/// Drop sub-second precision so stored values round-trip exactly.
pub fn truncate_to_seconds(dt: DateTime<Utc>) -> DateTime<Utc> {
    DateTime::from_timestamp(dt.timestamp(), 0).unwrap_or(dt)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_format_is_fixed_width_utc() {
        let dt = Utc.with_ymd_and_hms(2026, 1, 5, 9, 3, 7).unwrap();
        assert_eq!(format_datetime(dt), "2026-01-05T09:03:07Z");
        assert_eq!(parse_datetime("2026-01-05T09:03:07Z").unwrap(), dt);
    }

    #[test]
    fn test_truncate_drops_fraction() {
        let dt = Utc.timestamp_opt(1_700_000_000, 987_000_000).unwrap();
        assert_eq!(truncate_to_seconds(dt).timestamp_subsec_nanos(), 0);
        assert_eq!(truncate_to_seconds(dt).timestamp(), 1_700_000_000);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(parse_datetime("not a date").is_err());
        assert_eq!(parse_optional_datetime(None).unwrap(), None);
    }
}
