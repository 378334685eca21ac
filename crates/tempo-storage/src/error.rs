use chrono::NaiveDate;
use thiserror::Error;

/// Conditions callers must be able to tell apart from plain I/O failures.
///
/// These travel inside `anyhow::Error`; use `downcast_ref::<StorageError>()`
/// to recover them.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StorageError {
    /// More than one session has a NULL `end_time`.
    #[error("data integrity violation: {count} open sessions found, expected at most one")]
    MultipleOpenSessions { count: usize },

    #[error("invalid date '{input}', expected YYYY-MM-DD")]
    InvalidDate { input: String },

    #[error("invalid date range: start {start} is after end {end}")]
    InvalidDateRange { start: NaiveDate, end: NaiveDate },
}
