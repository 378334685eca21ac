//! Calendar-day ranges in local time.
//!
//! Sessions are stored with UTC timestamps, but every report is phrased in
//! local calendar days. A `DateRange` is inclusive on both ends and converts
//! to a half-open UTC interval `[start_of(start), start_of(end + 1))` for
//! range scans on `window_sessions.start_time`.

use chrono::{DateTime, Duration, Local, LocalResult, NaiveDate, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::error::StorageError;

/// Parse a user-supplied date.
///
/// Accepts `-`, `/` or `.` as separators and parts without leading zeros,
/// so `2026/1/5` and `2026.01.05` both mean `2026-01-05`. Impossible dates
/// such as `2026-02-30` are rejected rather than rolled over.
///
/// # Errors
///
/// Returns `StorageError::InvalidDate` if the input is not a valid calendar date.
pub fn normalize_date(input: &str) -> Result<NaiveDate, StorageError> {
    let invalid = || StorageError::InvalidDate {
        input: input.to_string(),
    };

    let unified = input.trim().replace(['/', '.'], "-");
    let parts: Vec<&str> = unified.split('-').collect();
    let [year, month, day] = parts[..] else {
        return Err(invalid());
    };

    let well_formed = |part: &str, max_len: usize| {
        !part.is_empty() && part.len() <= max_len && part.chars().all(|c| c.is_ascii_digit())
    };
    if !well_formed(year, 4) || !well_formed(month, 2) || !well_formed(day, 2) {
        return Err(invalid());
    }

    let year: i32 = year.parse().map_err(|_| invalid())?;
    let month: u32 = month.parse().map_err(|_| invalid())?;
    let day: u32 = day.parse().map_err(|_| invalid())?;

    NaiveDate::from_ymd_opt(year, month, day).ok_or_else(invalid)
}

/// Instant at which `date` begins in the local time zone.
#[must_use]
pub fn local_day_start(date: NaiveDate) -> DateTime<Utc> {
    let midnight = date.and_time(NaiveTime::MIN);
    match Local.from_local_datetime(&midnight) {
        LocalResult::Single(dt) | LocalResult::Ambiguous(dt, _) => dt.with_timezone(&Utc),
        // Midnight skipped by a DST jump: the day starts at the first valid hour.
        LocalResult::None => Local
            .from_local_datetime(&(midnight + Duration::hours(1)))
            .earliest()
            .map_or_else(
                || Utc.from_utc_datetime(&midnight),
                |dt| dt.with_timezone(&Utc),
            ),
    }
}

/// Local calendar date of an instant.
#[must_use]
pub fn local_date(instant: DateTime<Utc>) -> NaiveDate {
    instant.with_timezone(&Local).date_naive()
}

/// Inclusive range of local calendar days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    /// # Errors
    ///
    /// Returns `StorageError::InvalidDateRange` if `start` is after `end`.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, StorageError> {
        if start > end {
            return Err(StorageError::InvalidDateRange { start, end });
        }
        Ok(Self { start, end })
    }

    /// Build a range from two user-supplied date strings.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::InvalidDate` for an unparseable date and
    /// `StorageError::InvalidDateRange` if the start is after the end.
    pub fn parse(start: &str, end: &str) -> Result<Self, StorageError> {
        Self::new(normalize_date(start)?, normalize_date(end)?)
    }

    #[must_use]
    pub const fn single_day(date: NaiveDate) -> Self {
        Self {
            start: date,
            end: date,
        }
    }

    #[must_use]
    pub fn today() -> Self {
        Self::single_day(Local::now().date_naive())
    }

    /// Seven days starting at `start`, inclusive.
    #[must_use]
    pub fn week_from(start: NaiveDate) -> Self {
        Self {
            start,
            end: start + Duration::days(6),
        }
    }

    #[must_use]
    pub const fn start(&self) -> NaiveDate {
        self.start
    }

    #[must_use]
    pub const fn end(&self) -> NaiveDate {
        self.end
    }

    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Half-open UTC interval covering every local day in the range.
    #[must_use]
    pub fn utc_bounds(&self) -> (DateTime<Utc>, DateTime<Utc>) {
        (
            local_day_start(self.start),
            local_day_start(self.end + Duration::days(1)),
        )
    }
}

impl std::fmt::Display for DateRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.start == self.end {
            write!(f, "{}", self.start)
        } else {
            write!(f, "{} to {}", self.start, self.end)
        }
    }
}
