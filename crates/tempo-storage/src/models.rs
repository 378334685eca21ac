use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// A distinct (name, executable path) pair observed on the machine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Process {
    pub id: i64,
    pub name: String,
    pub executable_path: Option<String>,
    pub first_seen: DateTime<Utc>,
    pub last_seen: DateTime<Utc>,
}

/// One contiguous interval during which a process/window pair held focus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowSession {
    pub id: i64,
    pub process_id: i64,
    pub process_name: String,
    pub window_title: String,
    pub start_time: DateTime<Utc>,
    /// `None` while the session is open
    pub end_time: Option<DateTime<Utc>>,
    pub duration_seconds: i64,
    pub is_foreground: bool,
}

impl WindowSession {
    #[must_use]
    pub const fn is_open(&self) -> bool {
        self.end_time.is_none()
    }
}

/// The single session with no end time yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenSession {
    pub session_id: i64,
    pub process_id: i64,
    pub process_name: String,
    pub window_title: String,
    pub start_time: DateTime<Utc>,
}

impl OpenSession {
    /// Whether this session belongs to the given foreground identity.
    #[must_use]
    pub fn is_same_window(&self, process_name: &str, window_title: &str) -> bool {
        self.process_name == process_name && self.window_title == window_title
    }
}

/// Seconds and session count for one process over a range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppUsage {
    pub name: String,
    pub total_seconds: i64,
    pub session_count: i64,
}

impl AppUsage {
    #[must_use]
    pub const fn minutes(&self) -> i64 {
        self.total_seconds / 60
    }

    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn hours(&self) -> f64 {
        (self.total_seconds as f64 / 3600.0 * 100.0).round() / 100.0
    }
}

/// Seconds and session count for one process/window pair over a range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowUsage {
    pub process_name: String,
    pub window_title: String,
    pub total_seconds: i64,
    pub session_count: i64,
}

/// Total tracked seconds for one local calendar day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyUsage {
    pub date: NaiveDate,
    pub total_seconds: i64,
    pub session_count: i64,
}
