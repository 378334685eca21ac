use anyhow::Result;
use chrono::{DateTime, Utc};
use rusqlite::{params, OptionalExtension};

use super::helpers::{format_datetime, parse_datetime, truncate_to_seconds};
use super::Database;
use crate::models::Process;

impl Database {
    /// Find or create the process identified by `(name, executable_path)`.
    ///
    /// `last_seen` is refreshed on every call, new row or not. A `None` path
    /// is its own identity: it never matches a row that has a path.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails
    pub fn upsert_process(&self, name: &str, executable_path: Option<&str>) -> Result<i64> {
        self.upsert_process_at(name, executable_path, Utc::now())
    }

    /// [`Database::upsert_process`] with an explicit observation time.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails
    pub fn upsert_process_at(
        &self,
        name: &str,
        executable_path: Option<&str>,
        seen_at: DateTime<Utc>,
    ) -> Result<i64> {
        let seen_at = format_datetime(truncate_to_seconds(seen_at));
        let conn = self.conn()?;
        let tx = conn.unchecked_transaction()?;

        // `IS` compares NULL to NULL as equal, which the UNIQUE constraint does not
        let existing: Option<i64> = tx
            .query_row(
                "SELECT id FROM processes WHERE name = ?1 AND executable_path IS ?2",
                params![name, executable_path],
                |row| row.get(0),
            )
            .optional()?;

        let process_id = if let Some(id) = existing {
            tx.execute(
                "UPDATE processes SET last_seen = ?1 WHERE id = ?2",
                params![seen_at, id],
            )?;
            id
        } else {
            tx.execute(
                "INSERT INTO processes (name, executable_path, first_seen, last_seen)
                 VALUES (?1, ?2, ?3, ?3)",
                params![name, executable_path, seen_at],
            )?;
            let id = tx.last_insert_rowid();
            log::debug!("New process {name} ({executable_path:?}) -> {id}");
            id
        };

        tx.commit()?;
        Ok(process_id)
    }

    /// Refresh `last_seen` for a process that is still in focus.
    ///
    /// # Errors
    ///
    /// Returns an error if the database update fails
    pub fn touch_process(&self, process_id: i64, seen_at: DateTime<Utc>) -> Result<()> {
        self.conn()?.execute(
            "UPDATE processes SET last_seen = ?1 WHERE id = ?2",
            params![format_datetime(truncate_to_seconds(seen_at)), process_id],
        )?;
        Ok(())
    }

    /// Get a process by id
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub fn get_process(&self, process_id: i64) -> Result<Option<Process>> {
        let result = self
            .conn()?
            .query_row(
                "SELECT id, name, executable_path, first_seen, last_seen
                 FROM processes
                 WHERE id = ?1",
                params![process_id],
                |row| {
                    Ok(Process {
                        id: row.get(0)?,
                        name: row.get(1)?,
                        executable_path: row.get(2)?,
                        first_seen: parse_datetime(&row.get::<_, String>(3)?)?,
                        last_seen: parse_datetime(&row.get::<_, String>(4)?)?,
                    })
                },
            )
            .optional()?;

        Ok(result)
    }

    /// Number of distinct process identities recorded.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub fn count_processes(&self) -> Result<i64> {
        let count = self
            .conn()?
            .query_row("SELECT COUNT(*) FROM processes", [], |row| row.get(0))?;
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    #[test]
    fn test_upsert_returns_same_id_and_refreshes_last_seen() {
        let db = Database::open_in_memory().unwrap();
        let t0 = Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap();
        let t1 = t0 + Duration::minutes(5);

        let first = db.upsert_process_at("code.exe", Some("C:\\code.exe"), t0).unwrap();
        let second = db.upsert_process_at("code.exe", Some("C:\\code.exe"), t1).unwrap();
        assert_eq!(first, second);

        let process = db.get_process(first).unwrap().unwrap();
        assert_eq!(process.first_seen, t0);
        assert_eq!(process.last_seen, t1);
        assert_eq!(db.count_processes().unwrap(), 1);
    }

    #[test]
    fn test_null_path_is_its_own_identity() {
        let db = Database::open_in_memory().unwrap();

        let no_path = db.upsert_process("chrome.exe", None).unwrap();
        let again = db.upsert_process("chrome.exe", None).unwrap();
        let with_path = db.upsert_process("chrome.exe", Some("/opt/chrome")).unwrap();

        assert_eq!(no_path, again);
        assert_ne!(no_path, with_path);
        assert_eq!(db.count_processes().unwrap(), 2);
    }

    #[test]
    fn test_touch_updates_last_seen_only() {
        let db = Database::open_in_memory().unwrap();
        let t0 = Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap();
        let id = db.upsert_process_at("notepad.exe", None, t0).unwrap();

        db.touch_process(id, t0 + Duration::seconds(90)).unwrap();

        let process = db.get_process(id).unwrap().unwrap();
        assert_eq!(process.first_seen, t0);
        assert_eq!(process.last_seen, t0 + Duration::seconds(90));
    }
}
