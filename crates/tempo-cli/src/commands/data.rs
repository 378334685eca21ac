/// Data management command handlers (delete)
use anyhow::Result;
use chrono::Local;
use tempo_storage::{Database, DateRange};

/// Delete every session that started today. Does nothing without `confirmed`.
pub fn handle_delete_today(db: &Database, confirmed: bool) -> Result<Option<usize>> {
    let today = Local::now().date_naive();
    if !confirmed {
        println!("This permanently deletes all sessions from {today}. Re-run with --yes to confirm.");
        return Ok(None);
    }

    let deleted = db.delete_day(today)?;
    println!("Deleted {deleted} sessions");
    Ok(Some(deleted))
}

/// Delete every session that started within the range. Does nothing without `confirmed`.
pub fn handle_delete_range(
    db: &Database,
    start: &str,
    end: &str,
    confirmed: bool,
) -> Result<Option<usize>> {
    let range = DateRange::parse(start, end)?;
    if !confirmed {
        println!("This permanently deletes all sessions from {range}. Re-run with --yes to confirm.");
        return Ok(None);
    }

    let deleted = db.delete_range(&range)?;
    println!("Deleted {deleted} sessions");
    Ok(Some(deleted))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn seeded() -> Database {
        let db = Database::open_in_memory().unwrap();
        let pid = db.upsert_process("code.exe", None).unwrap();
        let now = Utc::now();
        let id = db.open_session_at(pid, "main", now - Duration::seconds(5)).unwrap();
        db.close_session(id, Some(now)).unwrap();
        db
    }

    #[test]
    fn test_delete_requires_confirmation() {
        let db = seeded();
        assert_eq!(handle_delete_today(&db, false).unwrap(), None);
        assert_eq!(db.recent_sessions(10).unwrap().len(), 1);
    }

    #[test]
    fn test_delete_range_rejects_bad_dates_before_confirming() {
        let db = seeded();
        assert!(handle_delete_range(&db, "2026-13-01", "2026-12-31", true).is_err());
        assert!(handle_delete_range(&db, "2026-02-01", "2026-01-01", true).is_err());
        assert_eq!(db.recent_sessions(10).unwrap().len(), 1);
    }

    #[test]
    fn test_delete_range_far_past_removes_nothing() {
        let db = seeded();
        assert_eq!(
            handle_delete_range(&db, "2001-01-01", "2001-12-31", true).unwrap(),
            Some(0)
        );
    }
}
