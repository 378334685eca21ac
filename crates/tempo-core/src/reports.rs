//! Read-only reporting over stored sessions.
//!
//! Categories are assigned at read time, so editing the keyword table or
//! replacing the model reclassifies all history.

use anyhow::Result;
use chrono::{Local, NaiveDate};
use serde::Serialize;
use std::sync::Arc;
use tempo_storage::{
    AppUsage, DailyUsage, Database, DateRange, UsageTotals, WindowSession, WindowUsage,
};

use crate::classifier::{Category, Classifier};

/// Totals and per-app usage for a range
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UsageSummary {
    pub range: DateRange,
    pub totals: UsageTotals,
    /// Longest first
    pub apps: Vec<AppUsage>,
}

impl UsageSummary {
    /// True when the range holds no closed sessions
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.apps.is_empty()
    }
}

/// Time in one category over a range
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryStat {
    pub category: Category,
    pub seconds: i64,
    pub session_count: i64,
    /// Share of the range total, rounded to one decimal
    pub percentage: f64,
}

impl CategoryStat {
    #[must_use]
    pub const fn minutes(&self) -> i64 {
        self.seconds / 60
    }

    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn hours(&self) -> f64 {
        (self.seconds as f64 / 3600.0 * 100.0).round() / 100.0
    }
}

/// Per-category rollup for a range; every category is present, in
/// declaration order with `other` last
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassifiedStatistics {
    pub range: DateRange,
    pub total_seconds: i64,
    pub categories: Vec<CategoryStat>,
}

impl ClassifiedStatistics {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.categories.iter().all(|c| c.session_count == 0)
    }

    #[must_use]
    pub fn get(&self, category: Category) -> Option<&CategoryStat> {
        self.categories.iter().find(|c| c.category == category)
    }
}

/// A stored session with its read-time category
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassifiedSession {
    pub session: WindowSession,
    pub category: Category,
}

pub struct Reporter {
    database: Arc<Database>,
    classifier: Arc<Classifier>,
}

impl Reporter {
    #[must_use]
    pub fn new(database: Arc<Database>, classifier: Arc<Classifier>) -> Self {
        Self {
            database,
            classifier,
        }
    }

    /// Usage for today's local calendar day
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub fn today_summary(&self) -> Result<UsageSummary> {
        self.summary(DateRange::single_day(Local::now().date_naive()))
    }

    /// Usage between two calendar dates, inclusive.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::InvalidDate` or `StorageError::InvalidDateRange`
    /// for bad input, or an error if the database query fails
    pub fn usage_between(&self, start: &str, end: &str) -> Result<UsageSummary> {
        self.summary(DateRange::parse(start, end)?)
    }

    fn summary(&self, range: DateRange) -> Result<UsageSummary> {
        Ok(UsageSummary {
            totals: self.database.usage_totals(&range)?,
            apps: self.database.usage_by_process(&range)?,
            range,
        })
    }

    /// Seconds, sessions and share per category.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub fn classified_statistics(&self, range: DateRange) -> Result<ClassifiedStatistics> {
        let mut categories: Vec<CategoryStat> = Category::ALL
            .into_iter()
            .map(|category| CategoryStat {
                category,
                seconds: 0,
                session_count: 0,
                percentage: 0.0,
            })
            .collect();

        let mut total_seconds = 0;
        for window in self.database.usage_by_window(&range)? {
            let category = self
                .classifier
                .classify(&window.process_name, &window.window_title);
            if let Some(stat) = categories.iter_mut().find(|s| s.category == category) {
                stat.seconds += window.total_seconds;
                stat.session_count += window.session_count;
            }
            total_seconds += window.total_seconds;
        }

        if total_seconds > 0 {
            for stat in &mut categories {
                stat.percentage = percentage(stat.seconds, total_seconds);
            }
        }

        Ok(ClassifiedStatistics {
            range,
            total_seconds,
            categories,
        })
    }

    /// Most used process/window pairs in `category`, longest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub fn top_windows_by_category(
        &self,
        range: &DateRange,
        category: Category,
        limit: usize,
    ) -> Result<Vec<WindowUsage>> {
        Ok(self
            .database
            .usage_by_window(range)?
            .into_iter()
            .filter(|w| self.classifier.classify(&w.process_name, &w.window_title) == category)
            .take(limit)
            .collect())
    }

    /// Category rollup for one day
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub fn daily_classification(&self, date: NaiveDate) -> Result<ClassifiedStatistics> {
        self.classified_statistics(DateRange::single_day(date))
    }

    /// Category rollup for the seven days starting at `start`
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub fn weekly_classification(&self, start: NaiveDate) -> Result<ClassifiedStatistics> {
        self.classified_statistics(DateRange::week_from(start))
    }

    /// Usage per local calendar day; days without sessions are omitted
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub fn daily_usage(&self, range: &DateRange) -> Result<Vec<DailyUsage>> {
        self.database.daily_usage(range)
    }

    /// Latest sessions, newest first, with their categories
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub fn recent_sessions(&self, limit: usize) -> Result<Vec<ClassifiedSession>> {
        Ok(self
            .database
            .recent_sessions(limit)?
            .into_iter()
            .map(|session| ClassifiedSession {
                category: self
                    .classifier
                    .classify(&session.process_name, &session.window_title),
                session,
            })
            .collect())
    }
}

#[allow(clippy::cast_precision_loss)]
fn percentage(part: i64, total: i64) -> f64 {
    (part as f64 / total as f64 * 1000.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Duration, Utc};
    use tempo_storage::{local_day_start, StorageError};

    fn insert_closed(db: &Database, app: &str, title: &str, start: DateTime<Utc>, secs: i64) {
        let pid = db.upsert_process_at(app, None, start).unwrap();
        let id = db.open_session_at(pid, title, start).unwrap();
        db.close_session(id, Some(start + Duration::seconds(secs)))
            .unwrap();
    }

    fn today() -> NaiveDate {
        Local::now().date_naive()
    }

    fn reporter() -> (Reporter, Arc<Database>) {
        let db = Arc::new(Database::open_in_memory().unwrap());
        let midnight = local_day_start(today());
        insert_closed(&db, "chrome.exe", "YouTube", midnight + Duration::minutes(1), 3600);
        insert_closed(&db, "code.exe", "main.rs", midnight + Duration::minutes(2), 1800);
        insert_closed(&db, "notepad.exe", "notes", midnight + Duration::minutes(3), 600);
        (
            Reporter::new(db.clone(), Arc::new(Classifier::rules_only())),
            db,
        )
    }

    #[test]
    fn test_today_summary() {
        let (reporter, _) = reporter();
        let summary = reporter.today_summary().unwrap();

        assert_eq!(summary.totals.total_seconds, 6000);
        let apps: Vec<(&str, i64)> = summary
            .apps
            .iter()
            .map(|a| (a.name.as_str(), a.total_seconds))
            .collect();
        assert_eq!(
            apps,
            vec![("chrome.exe", 3600), ("code.exe", 1800), ("notepad.exe", 600)]
        );
        assert!(!summary.is_empty());
    }

    #[test]
    fn test_usage_between_empty_and_invalid() {
        let (reporter, _) = reporter();

        let summary = reporter.usage_between("2001/1/1", "2001.01.31").unwrap();
        assert!(summary.is_empty());
        assert!(summary.totals.is_empty());

        let err = reporter.usage_between("2026-02-30", "2026-03-01").unwrap_err();
        assert!(matches!(
            err.downcast_ref::<StorageError>(),
            Some(StorageError::InvalidDate { .. })
        ));

        let err = reporter.usage_between("2026-03-02", "2026-03-01").unwrap_err();
        assert!(matches!(
            err.downcast_ref::<StorageError>(),
            Some(StorageError::InvalidDateRange { .. })
        ));
    }

    #[test]
    fn test_classified_statistics() {
        let (reporter, _) = reporter();
        let stats = reporter.daily_classification(today()).unwrap();

        assert_eq!(stats.total_seconds, 6000);
        assert_eq!(stats.categories.len(), Category::ALL.len());
        assert_eq!(stats.categories.last().unwrap().category, Category::Other);

        let entertainment = stats.get(Category::Entertainment).unwrap();
        assert_eq!(entertainment.seconds, 3600);
        assert!((entertainment.percentage - 60.0).abs() < f64::EPSILON);
        assert_eq!(stats.get(Category::Coding).unwrap().seconds, 1800);
        assert_eq!(stats.get(Category::Other).unwrap().seconds, 600);
        assert!((stats.get(Category::Other).unwrap().percentage - 10.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_empty_statistics_are_explicit() {
        let (reporter, _) = reporter();
        let day = NaiveDate::from_ymd_opt(2001, 1, 1).unwrap();
        let stats = reporter.weekly_classification(day).unwrap();

        assert!(stats.is_empty());
        assert_eq!(stats.total_seconds, 0);
        assert_eq!(stats.range.end(), day + Duration::days(6));
    }

    #[test]
    fn test_top_windows_filters_then_limits() {
        let (reporter, db) = reporter();
        let midnight = local_day_start(today());
        insert_closed(&db, "code.exe", "lib.rs", midnight + Duration::minutes(5), 900);
        insert_closed(&db, "code.exe", "mod.rs", midnight + Duration::minutes(6), 60);

        let top = reporter
            .top_windows_by_category(&DateRange::today(), Category::Coding, 2)
            .unwrap();
        let titles: Vec<&str> = top.iter().map(|w| w.window_title.as_str()).collect();
        assert_eq!(titles, vec!["main.rs", "lib.rs"]);

        assert!(reporter
            .top_windows_by_category(&DateRange::today(), Category::Social, 5)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_recent_sessions_are_classified() {
        let (reporter, _) = reporter();
        let recent = reporter.recent_sessions(1).unwrap();
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].session.process_name, "notepad.exe");
        assert_eq!(recent[0].category, Category::Other);
    }

    #[test]
    fn test_daily_usage_passes_through() {
        let (reporter, _) = reporter();
        let days = reporter.daily_usage(&DateRange::today()).unwrap();
        assert_eq!(days.len(), 1);
        assert_eq!(days[0].total_seconds, 6000);
    }
}
