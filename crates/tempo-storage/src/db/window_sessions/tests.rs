use super::*;
use chrono::{Duration, TimeZone};

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap()
}

fn db_with_process(name: &str) -> (Database, i64) {
    let db = Database::open_in_memory().unwrap();
    let process_id = db.upsert_process_at(name, None, t0()).unwrap();
    (db, process_id)
}

#[test]
fn test_open_session_has_no_end_time() {
    let (db, pid) = db_with_process("chrome.exe");
    let id = db.open_session_at(pid, "Gmail", t0()).unwrap();

    let session = db.get_session(id).unwrap().unwrap();
    assert!(session.is_open());
    assert_eq!(session.duration_seconds, 0);
    assert!(session.is_foreground);
    assert_eq!(session.process_name, "chrome.exe");
    assert_eq!(session.window_title, "Gmail");
}

#[test]
fn test_close_is_idempotent_and_keeps_first_end_time() {
    let (db, pid) = db_with_process("chrome.exe");
    let id = db.open_session_at(pid, "Gmail", t0()).unwrap();

    let first_end = t0() + Duration::seconds(42);
    let second_end = t0() + Duration::seconds(900);

    assert!(db.close_session(id, Some(first_end)).unwrap());
    assert!(!db.close_session(id, Some(second_end)).unwrap());

    let session = db.get_session(id).unwrap().unwrap();
    assert_eq!(session.end_time, Some(first_end));
    assert_eq!(session.duration_seconds, 42);
}

#[test]
fn test_close_missing_session_returns_false() {
    let db = Database::open_in_memory().unwrap();
    assert!(!db.close_session(9999, None).unwrap());
}

#[test]
fn test_close_before_start_clamps_to_zero_duration() {
    let (db, pid) = db_with_process("code.exe");
    let id = db.open_session_at(pid, "main", t0()).unwrap();

    assert!(db.close_session(id, Some(t0() - Duration::seconds(30))).unwrap());

    let session = db.get_session(id).unwrap().unwrap();
    assert_eq!(session.end_time, Some(t0()));
    assert_eq!(session.duration_seconds, 0);
}

#[test]
fn test_duration_matches_timestamps() {
    let (db, pid) = db_with_process("code.exe");
    let id = db.open_session_at(pid, "main", t0()).unwrap();
    db.close_session(id, Some(t0() + Duration::minutes(30))).unwrap();

    let session = db.get_session(id).unwrap().unwrap();
    let end = session.end_time.unwrap();
    assert!(end >= session.start_time);
    assert_eq!(
        session.duration_seconds,
        end.signed_duration_since(session.start_time).num_seconds()
    );
}

#[test]
fn test_current_open_session_none_and_one() {
    let (db, pid) = db_with_process("code.exe");
    assert_eq!(db.current_open_session().unwrap(), None);

    let id = db.open_session_at(pid, "main", t0()).unwrap();
    let open = db.current_open_session().unwrap().unwrap();
    assert_eq!(open.session_id, id);
    assert_eq!(open.process_id, pid);
    assert!(open.is_same_window("code.exe", "main"));
    assert!(!open.is_same_window("code.exe", "lib.rs"));

    db.close_session(id, None).unwrap();
    assert_eq!(db.current_open_session().unwrap(), None);
}

#[test]
fn test_two_open_sessions_is_an_integrity_error() {
    let (db, pid) = db_with_process("code.exe");
    db.open_session_at(pid, "a", t0()).unwrap();
    db.open_session_at(pid, "b", t0() + Duration::seconds(1)).unwrap();

    let err = db.current_open_session().unwrap_err();
    assert_eq!(
        err.downcast_ref::<StorageError>(),
        Some(&StorageError::MultipleOpenSessions { count: 2 })
    );
    assert_eq!(db.count_open_sessions().unwrap(), 2);
}

#[test]
fn test_stale_sessions_close_at_last_seen() {
    let (db, pid) = db_with_process("code.exe");
    let id = db.open_session_at(pid, "main", t0()).unwrap();
    db.touch_process(pid, t0() + Duration::seconds(75)).unwrap();

    let closed = db.close_stale_sessions().unwrap();

    assert_eq!(closed.len(), 1);
    assert_eq!(closed[0].id, id);
    assert_eq!(closed[0].end_time, Some(t0() + Duration::seconds(75)));
    assert_eq!(closed[0].duration_seconds, 75);
    assert_eq!(db.count_open_sessions().unwrap(), 0);
}

#[test]
fn test_stale_sweep_never_ends_before_start() {
    let (db, pid) = db_with_process("code.exe");
    // last_seen is t0, the session started later
    let id = db
        .open_session_at(pid, "main", t0() + Duration::seconds(10))
        .unwrap();

    let closed = db.close_stale_sessions().unwrap();
    assert_eq!(closed[0].id, id);
    assert_eq!(closed[0].duration_seconds, 0);
}

#[test]
fn test_stale_sweep_resolves_multiple_open_sessions() {
    let (db, pid) = db_with_process("code.exe");
    db.open_session_at(pid, "a", t0()).unwrap();
    db.open_session_at(pid, "b", t0()).unwrap();

    assert_eq!(db.close_stale_sessions().unwrap().len(), 2);
    assert_eq!(db.current_open_session().unwrap(), None);
}

#[test]
fn test_recent_sessions_newest_first() {
    let (db, pid) = db_with_process("code.exe");
    for (i, title) in ["one", "two", "three"].iter().enumerate() {
        let start = t0() + Duration::minutes(i64::try_from(i).unwrap());
        let id = db.open_session_at(pid, title, start).unwrap();
        db.close_session(id, Some(start + Duration::seconds(30))).unwrap();
    }

    let recent = db.recent_sessions(2).unwrap();
    let titles: Vec<&str> = recent.iter().map(|s| s.window_title.as_str()).collect();
    assert_eq!(titles, vec!["three", "two"]);
}

#[test]
fn test_sessions_survive_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tempo.db");

    let id = {
        let db = Database::new(Some(path.clone())).unwrap();
        let pid = db.upsert_process_at("code.exe", None, t0()).unwrap();
        db.open_session_at(pid, "main", t0()).unwrap()
    };

    let db = Database::new(Some(path)).unwrap();
    let open = db.current_open_session().unwrap().unwrap();
    assert_eq!(open.session_id, id);
}
