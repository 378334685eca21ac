pub mod db;
pub mod error;
pub mod migrations;
pub mod models;
pub mod range;

pub use db::{Database, UsageTotals, DEFAULT_BUSY_TIMEOUT};
pub use error::StorageError;
pub use models::{AppUsage, DailyUsage, OpenSession, Process, WindowSession, WindowUsage};
pub use range::{local_date, local_day_start, normalize_date, DateRange};
