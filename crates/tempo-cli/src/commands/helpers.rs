//! Helper utility functions for CLI commands

use anyhow::Result;
use chrono::{Local, NaiveDate};
use tempo_storage::{normalize_date, DateRange};

/// Safely truncate a string to a maximum number of characters (not bytes).
/// This avoids panics when slicing multi-byte UTF-8 characters.
pub fn truncate_str(s: &str, max_chars: usize) -> String {
    let char_count = s.chars().count();
    if char_count > max_chars {
        let truncated: String = s.chars().take(max_chars).collect();
        format!("{truncated}...")
    } else {
        s.to_string()
    }
}

/// `1h 05m`, `12m 30s` or `45s`
pub fn format_duration(seconds: i64) -> String {
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let secs = seconds % 60;
    if hours > 0 {
        format!("{hours}h {minutes:02}m")
    } else if minutes > 0 {
        format!("{minutes}m {secs:02}s")
    } else {
        format!("{secs}s")
    }
}

/// Range from optional `--from`/`--to` flags. A missing end means today; a
/// missing start means the end date.
pub fn range_from_flags(from: Option<&str>, to: Option<&str>) -> Result<DateRange> {
    let end = match to {
        Some(to) => normalize_date(to)?,
        None => Local::now().date_naive(),
    };
    let start = match from {
        Some(from) => normalize_date(from)?,
        None => end,
    };
    Ok(DateRange::new(start, end)?)
}

/// Parse an optional date flag, defaulting to today
pub fn date_or_today(date: Option<&str>) -> Result<NaiveDate> {
    match date {
        Some(date) => Ok(normalize_date(date)?),
        None => Ok(Local::now().date_naive()),
    }
}
