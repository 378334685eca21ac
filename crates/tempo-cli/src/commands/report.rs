/// Report and categories command handlers
use anyhow::Result;
use chrono::Local;
use tabled::{Table, Tabled};
use tempo_core::{Category, ClassifiedStatistics, Classifier, Config, Reporter, UsageSummary};
use tempo_storage::DateRange;

use super::helpers::{format_duration, truncate_str};

const RULE: &str = "\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}";

#[derive(Tabled)]
struct AppRow {
    #[tabled(rename = "App")]
    app: String,
    #[tabled(rename = "Time")]
    time: String,
    #[tabled(rename = "Hours")]
    hours: String,
    #[tabled(rename = "Sessions")]
    sessions: i64,
}

#[derive(Tabled)]
struct CategoryRow {
    #[tabled(rename = "Category")]
    category: String,
    #[tabled(rename = "Time (minutes)")]
    time_minutes: i64,
    #[tabled(rename = "Sessions")]
    sessions: i64,
    #[tabled(rename = "Percentage")]
    percentage: String,
}

#[derive(Tabled)]
struct WindowRow {
    #[tabled(rename = "App")]
    app: String,
    #[tabled(rename = "Window")]
    window: String,
    #[tabled(rename = "Time")]
    time: String,
    #[tabled(rename = "Sessions")]
    sessions: i64,
}

#[derive(Tabled)]
struct DayRow {
    #[tabled(rename = "Date")]
    date: String,
    #[tabled(rename = "Time")]
    time: String,
    #[tabled(rename = "Sessions")]
    sessions: i64,
}

#[derive(Tabled)]
struct SessionRow {
    #[tabled(rename = "Start")]
    start: String,
    #[tabled(rename = "App")]
    app: String,
    #[tabled(rename = "Window")]
    window: String,
    #[tabled(rename = "Duration")]
    duration: String,
    #[tabled(rename = "Category")]
    category: String,
}

fn print_summary(title: &str, summary: &UsageSummary) {
    println!("\n{title}: {}", summary.range);
    println!("{RULE}");

    if summary.is_empty() {
        println!("No data in this range.");
        return;
    }

    let rows: Vec<AppRow> = summary
        .apps
        .iter()
        .map(|app| AppRow {
            app: app.name.clone(),
            time: format_duration(app.total_seconds),
            hours: format!("{:.2}", app.hours()),
            sessions: app.session_count,
        })
        .collect();

    println!("\n{}", Table::new(rows));
    println!(
        "\nTotal tracked time: {} ({} sessions)",
        format_duration(summary.totals.total_seconds),
        summary.totals.session_count
    );
}

fn print_classification(stats: &ClassifiedStatistics) {
    println!("\nTime Tracking Report: {}", stats.range);
    println!("{RULE}");

    if stats.is_empty() {
        println!("No data in this range.");
        return;
    }

    let rows: Vec<CategoryRow> = stats
        .categories
        .iter()
        .filter(|stat| stat.session_count > 0)
        .map(|stat| CategoryRow {
            category: stat.category.to_string(),
            time_minutes: stat.minutes(),
            sessions: stat.session_count,
            percentage: format!("{:.1}%", stat.percentage),
        })
        .collect();

    println!("\n{}", Table::new(rows));
    println!("\nTotal tracked time: {}", format_duration(stats.total_seconds));
}

pub fn handle_today_command(reporter: &Reporter) -> Result<()> {
    print_summary("Today", &reporter.today_summary()?);
    Ok(())
}

pub fn handle_usage_command(reporter: &Reporter, start: &str, end: &str) -> Result<()> {
    print_summary("Usage", &reporter.usage_between(start, end)?);
    Ok(())
}

/// Which rollup `tempo report` prints
pub enum ReportPeriod {
    Day(chrono::NaiveDate),
    Week(chrono::NaiveDate),
    Range(DateRange),
}

pub fn handle_report_command(reporter: &Reporter, period: ReportPeriod) -> Result<()> {
    let stats = match period {
        ReportPeriod::Day(date) => reporter.daily_classification(date)?,
        ReportPeriod::Week(start) => reporter.weekly_classification(start)?,
        ReportPeriod::Range(range) => reporter.classified_statistics(range)?,
    };
    print_classification(&stats);
    Ok(())
}

pub fn handle_top_command(
    reporter: &Reporter,
    range: &DateRange,
    category: Category,
    limit: usize,
) -> Result<()> {
    let windows = reporter.top_windows_by_category(range, category, limit)?;

    println!("\nTop {category} windows: {range}");
    println!("{RULE}");
    if windows.is_empty() {
        println!("No data in this range.");
        return Ok(());
    }

    let rows: Vec<WindowRow> = windows
        .into_iter()
        .map(|w| WindowRow {
            app: w.process_name,
            window: truncate_str(&w.window_title, 50),
            time: format_duration(w.total_seconds),
            sessions: w.session_count,
        })
        .collect();
    println!("\n{}", Table::new(rows));
    Ok(())
}

pub fn handle_daily_command(reporter: &Reporter, range: &DateRange) -> Result<()> {
    let days = reporter.daily_usage(range)?;

    println!("\nDaily usage: {range}");
    println!("{RULE}");
    if days.is_empty() {
        println!("No data in this range.");
        return Ok(());
    }

    let rows: Vec<DayRow> = days
        .into_iter()
        .map(|d| DayRow {
            date: d.date.to_string(),
            time: format_duration(d.total_seconds),
            sessions: d.session_count,
        })
        .collect();
    println!("\n{}", Table::new(rows));
    Ok(())
}

pub fn handle_recent_command(reporter: &Reporter, limit: usize) -> Result<()> {
    let sessions = reporter.recent_sessions(limit)?;
    if sessions.is_empty() {
        println!("No sessions recorded yet.");
        return Ok(());
    }

    let rows: Vec<SessionRow> = sessions
        .into_iter()
        .map(|s| SessionRow {
            start: s
                .session
                .start_time
                .with_timezone(&Local)
                .format("%Y-%m-%d %H:%M:%S")
                .to_string(),
            duration: if s.session.is_open() {
                String::from("(open)")
            } else {
                format_duration(s.session.duration_seconds)
            },
            app: s.session.process_name,
            window: truncate_str(&s.session.window_title, 40),
            category: s.category.to_string(),
        })
        .collect();
    println!("{}", Table::new(rows));
    Ok(())
}

pub fn handle_classify_command(config: &Config, app: &str, title: &str) -> Result<()> {
    let classifier = Classifier::new(Some(config.model_path()?));
    let result = classifier.classify_full(app, title);

    println!("Category: {}", result.category);
    match result.keyword {
        Some(keyword) => println!("Source: {:?} (keyword '{keyword}')", result.source),
        None => println!("Source: {:?}", result.source),
    }
    Ok(())
}

pub fn handle_categories_command() {
    println!("Categories");
    println!("{RULE}");
    for (category, keywords) in tempo_core::classifier::RULES {
        println!("\n{category} ({})", category.color());
        println!("  Keywords: {}", keywords.len());
        println!("  e.g. {}", keywords.iter().take(6).copied().collect::<Vec<_>>().join(", "));
    }
    println!("\n{} ({})", Category::Other, Category::Other.color());
    println!("  Anything no keyword or model prediction claims");
}
