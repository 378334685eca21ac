//! Read-path aggregates and user-initiated purges over `window_sessions`.
//!
//! All range queries select on the session's start time, so a session that
//! starts before midnight counts entirely toward the day it started. Only
//! closed sessions contribute to totals.

use anyhow::Result;
use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::params;
use serde::Serialize;
use std::collections::BTreeMap;

use super::helpers::{format_datetime, parse_datetime};
use super::window_sessions::SESSION_COLUMNS;
use super::Database;
use crate::models::{AppUsage, DailyUsage, WindowSession, WindowUsage};
use crate::range::{local_date, DateRange};

/// Summed seconds and session count over a range.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct UsageTotals {
    pub total_seconds: i64,
    pub session_count: i64,
}

impl UsageTotals {
    /// True when no closed session falls in the range.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.session_count == 0
    }
}

fn bounds(range: &DateRange) -> (String, String) {
    let (start, end) = range.utc_bounds();
    (format_datetime(start), format_datetime(end))
}

impl Database {
    /// Total seconds and session count in a range.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub fn usage_totals(&self, range: &DateRange) -> Result<UsageTotals> {
        let (start, end) = bounds(range);
        let totals = self.conn()?.query_row(
            "SELECT COALESCE(SUM(duration_seconds), 0), COUNT(*)
             FROM window_sessions
             WHERE start_time >= ?1 AND start_time < ?2 AND end_time IS NOT NULL",
            params![start, end],
            |row| {
                Ok(UsageTotals {
                    total_seconds: row.get(0)?,
                    session_count: row.get(1)?,
                })
            },
        )?;
        Ok(totals)
    }

    /// Per-process usage in a range, longest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub fn usage_by_process(&self, range: &DateRange) -> Result<Vec<AppUsage>> {
        let (start, end) = bounds(range);
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT p.name, SUM(ws.duration_seconds) AS total_seconds, COUNT(*)
             FROM window_sessions ws
             JOIN processes p ON ws.process_id = p.id
             WHERE ws.start_time >= ?1 AND ws.start_time < ?2 AND ws.end_time IS NOT NULL
             GROUP BY p.name
             ORDER BY total_seconds DESC, p.name ASC",
        )?;

        let usage = stmt
            .query_map(params![start, end], |row| {
                Ok(AppUsage {
                    name: row.get(0)?,
                    total_seconds: row.get(1)?,
                    session_count: row.get(2)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(usage)
    }

    /// Per process/window pair usage in a range, longest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub fn usage_by_window(&self, range: &DateRange) -> Result<Vec<WindowUsage>> {
        let (start, end) = bounds(range);
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT p.name, ws.window_title, SUM(ws.duration_seconds) AS total_seconds, COUNT(*)
             FROM window_sessions ws
             JOIN processes p ON ws.process_id = p.id
             WHERE ws.start_time >= ?1 AND ws.start_time < ?2 AND ws.end_time IS NOT NULL
             GROUP BY p.name, ws.window_title
             ORDER BY total_seconds DESC, p.name ASC, ws.window_title ASC",
        )?;

        let usage = stmt
            .query_map(params![start, end], |row| {
                Ok(WindowUsage {
                    process_name: row.get(0)?,
                    window_title: row.get(1)?,
                    total_seconds: row.get(2)?,
                    session_count: row.get(3)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(usage)
    }

    /// Closed sessions in a range, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub fn closed_sessions(&self, range: &DateRange) -> Result<Vec<WindowSession>> {
        let (start, end) = bounds(range);
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {SESSION_COLUMNS}
             FROM window_sessions ws
             JOIN processes p ON ws.process_id = p.id
             WHERE ws.start_time >= ?1 AND ws.start_time < ?2 AND ws.end_time IS NOT NULL
             ORDER BY ws.start_time ASC, ws.id ASC"
        ))?;

        let sessions = stmt
            .query_map(params![start, end], Self::row_to_session)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(sessions)
    }

    /// Usage per local calendar day. Days without sessions are omitted.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub fn daily_usage(&self, range: &DateRange) -> Result<Vec<DailyUsage>> {
        let (start, end) = bounds(range);
        let rows: Vec<(DateTime<Utc>, i64)> = {
            let conn = self.conn()?;
            let mut stmt = conn.prepare(
                "SELECT start_time, duration_seconds
                 FROM window_sessions
                 WHERE start_time >= ?1 AND start_time < ?2 AND end_time IS NOT NULL",
            )?;
            let rows = stmt
                .query_map(params![start, end], |row| {
                    Ok((parse_datetime(&row.get::<_, String>(0)?)?, row.get(1)?))
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            rows
        };

        let mut days: BTreeMap<NaiveDate, DailyUsage> = BTreeMap::new();
        for (start_time, seconds) in rows {
            let date = local_date(start_time);
            let day = days.entry(date).or_insert(DailyUsage {
                date,
                total_seconds: 0,
                session_count: 0,
            });
            day.total_seconds += seconds;
            day.session_count += 1;
        }

        Ok(days.into_values().collect())
    }

    /// Delete every session that started on `date` (local time).
    ///
    /// Irreversible. Returns the number of sessions removed.
    ///
    /// # Errors
    ///
    /// Returns an error if the database delete fails
    pub fn delete_day(&self, date: NaiveDate) -> Result<usize> {
        self.delete_range(&DateRange::single_day(date))
    }

    /// Delete every session that started within `range`.
    ///
    /// Irreversible. Returns the number of sessions removed.
    ///
    /// # Errors
    ///
    /// Returns an error if the database delete fails
    pub fn delete_range(&self, range: &DateRange) -> Result<usize> {
        let (start, end) = bounds(range);
        let deleted = self.conn()?.execute(
            "DELETE FROM window_sessions WHERE start_time >= ?1 AND start_time < ?2",
            params![start, end],
        )?;
        log::info!("Deleted {deleted} sessions for {range}");
        Ok(deleted)
    }
}
