use anyhow::Result;
use chrono::{DateTime, Utc};
use rusqlite::{params, OptionalExtension};

use super::helpers::{
    format_datetime, parse_datetime, parse_optional_datetime, truncate_to_seconds,
};
use super::Database;
use crate::error::StorageError;
use crate::models::{OpenSession, WindowSession};

pub(crate) const SESSION_COLUMNS: &str = "ws.id, ws.process_id, p.name, ws.window_title, ws.start_time,
     ws.end_time, ws.duration_seconds, ws.is_foreground";

impl Database {
    /// Open a new session starting now.
    ///
    /// Does not check for an already open session; keeping at most one open
    /// is the caller's job.
    ///
    /// # Errors
    ///
    /// Returns an error if the database insert fails
    pub fn open_session(&self, process_id: i64, window_title: &str) -> Result<i64> {
        self.open_session_at(process_id, window_title, Utc::now())
    }

    /// [`Database::open_session`] with an explicit start time.
    ///
    /// # Errors
    ///
    /// Returns an error if the database insert fails
    pub fn open_session_at(
        &self,
        process_id: i64,
        window_title: &str,
        start_time: DateTime<Utc>,
    ) -> Result<i64> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO window_sessions (process_id, window_title, start_time, end_time, duration_seconds, is_foreground)
             VALUES (?1, ?2, ?3, NULL, 0, 1)",
            params![
                process_id,
                window_title,
                format_datetime(truncate_to_seconds(start_time))
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// Close a session, writing `end_time` and `duration_seconds` exactly once.
    ///
    /// `end_time` defaults to now. An end before the start is clamped to the
    /// start so the duration is never negative. Returns `false` when the row
    /// is already closed or does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails
    pub fn close_session(&self, session_id: i64, end_time: Option<DateTime<Utc>>) -> Result<bool> {
        let end_time = truncate_to_seconds(end_time.unwrap_or_else(Utc::now));
        let conn = self.conn()?;
        let tx = conn.unchecked_transaction()?;

        let start: Option<String> = tx
            .query_row(
                "SELECT start_time FROM window_sessions WHERE id = ?1 AND end_time IS NULL",
                params![session_id],
                |row| row.get(0),
            )
            .optional()?;

        let Some(start) = start else {
            log::debug!("Session {session_id} already closed or missing");
            return Ok(false);
        };

        let start = parse_datetime(&start)?;
        let end_time = end_time.max(start);
        let duration = end_time.signed_duration_since(start).num_seconds();

        let updated = tx.execute(
            "UPDATE window_sessions SET end_time = ?1, duration_seconds = ?2
             WHERE id = ?3 AND end_time IS NULL",
            params![format_datetime(end_time), duration, session_id],
        )?;
        tx.commit()?;

        Ok(updated == 1)
    }

    /// The single open session, if any.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::MultipleOpenSessions` if more than one session
    /// is open, or an error if the database query fails
    pub fn current_open_session(&self) -> Result<Option<OpenSession>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT ws.id, ws.process_id, p.name, ws.window_title, ws.start_time
             FROM window_sessions ws
             JOIN processes p ON ws.process_id = p.id
             WHERE ws.end_time IS NULL
             ORDER BY ws.start_time DESC",
        )?;

        let mut open = stmt
            .query_map([], |row| {
                Ok(OpenSession {
                    session_id: row.get(0)?,
                    process_id: row.get(1)?,
                    process_name: row.get(2)?,
                    window_title: row.get(3)?,
                    start_time: parse_datetime(&row.get::<_, String>(4)?)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        match open.len() {
            0 => Ok(None),
            1 => Ok(open.pop()),
            count => Err(StorageError::MultipleOpenSessions { count }.into()),
        }
    }

    /// Close every open session using the best evidence of when it ended.
    ///
    /// Used at startup after an unclean exit: the true end time is lost, so
    /// each session ends at its process's `last_seen` (never before its own
    /// start). Returns the sessions as they were closed.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails
    pub fn close_stale_sessions(&self) -> Result<Vec<WindowSession>> {
        let stale: Vec<(i64, DateTime<Utc>)> = {
            let conn = self.conn()?;
            let mut stmt = conn.prepare(
                "SELECT ws.id, p.last_seen
                 FROM window_sessions ws
                 JOIN processes p ON ws.process_id = p.id
                 WHERE ws.end_time IS NULL
                 ORDER BY ws.start_time ASC",
            )?;
            let rows = stmt
                .query_map([], |row| {
                    Ok((row.get(0)?, parse_datetime(&row.get::<_, String>(1)?)?))
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            rows
        };

        let mut closed = Vec::with_capacity(stale.len());
        for (session_id, last_seen) in stale {
            if self.close_session(session_id, Some(last_seen))? {
                if let Some(session) = self.get_session(session_id)? {
                    closed.push(session);
                }
            }
        }
        Ok(closed)
    }

    /// Get a session by id
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub fn get_session(&self, session_id: i64) -> Result<Option<WindowSession>> {
        let result = self
            .conn()?
            .query_row(
                &format!(
                    "SELECT {SESSION_COLUMNS}
                     FROM window_sessions ws
                     JOIN processes p ON ws.process_id = p.id
                     WHERE ws.id = ?1"
                ),
                params![session_id],
                Self::row_to_session,
            )
            .optional()?;

        Ok(result)
    }

    /// Number of sessions without an end time.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub fn count_open_sessions(&self) -> Result<usize> {
        let count: i64 = self.conn()?.query_row(
            "SELECT COUNT(*) FROM window_sessions WHERE end_time IS NULL",
            [],
            |row| row.get(0),
        )?;
        Ok(usize::try_from(count).unwrap_or_default())
    }

    /// Most recently started sessions, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub fn recent_sessions(&self, limit: usize) -> Result<Vec<WindowSession>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {SESSION_COLUMNS}
             FROM window_sessions ws
             JOIN processes p ON ws.process_id = p.id
             ORDER BY ws.start_time DESC, ws.id DESC
             LIMIT ?1"
        ))?;

        let sessions = stmt
            .query_map(
                params![i64::try_from(limit).unwrap_or(i64::MAX)],
                Self::row_to_session,
            )?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(sessions)
    }

    /// Helper function to parse `WindowSession` from a row selected with `SESSION_COLUMNS`
    pub(crate) fn row_to_session(row: &rusqlite::Row) -> rusqlite::Result<WindowSession> {
        Ok(WindowSession {
            id: row.get(0)?,
            process_id: row.get(1)?,
            process_name: row.get(2)?,
            window_title: row.get(3)?,
            start_time: parse_datetime(&row.get::<_, String>(4)?)?,
            end_time: parse_optional_datetime(row.get(5)?)?,
            duration_seconds: row.get(6)?,
            is_foreground: row.get::<_, i32>(7)? != 0,
        })
    }
}

#[cfg(test)]
mod tests;
