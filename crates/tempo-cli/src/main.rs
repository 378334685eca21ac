mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tempo_core::{config::get_data_dir, Category, Config};

use commands::{
    daemon::{run_daemon_process, run_foreground, show_status, start_daemon, stop_daemon},
    data::{handle_delete_range, handle_delete_today},
    helpers::{date_or_today, range_from_flags},
    open_database, open_reporter,
    report::{
        handle_categories_command, handle_classify_command, handle_daily_command,
        handle_recent_command, handle_report_command, handle_today_command, handle_top_command,
        handle_usage_command, ReportPeriod,
    },
};

#[derive(Parser)]
#[command(name = "tempo")]
#[command(about = "Foreground window time tracker", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the tracking daemon in the background
    Start,
    /// (Internal) Run the daemon process
    #[command(hide = true)]
    DaemonInternalStart,
    /// Stop the tracking daemon
    Stop,
    /// Check daemon status and today's total
    Status,
    /// Run the tracking loop in the foreground
    Run,
    /// Today's usage per app
    Today,
    /// Usage per app between two dates (inclusive)
    Usage {
        /// Start date (YYYY-MM-DD, YYYY/M/D or YYYY.M.D)
        start: String,
        /// End date
        end: String,
    },
    /// Time per category
    Report {
        /// Single day (defaults to today)
        #[arg(short, long, conflicts_with_all = ["week", "from", "to"])]
        date: Option<String>,
        /// Seven days starting at this date
        #[arg(short, long, conflicts_with_all = ["from", "to"])]
        week: Option<String>,
        /// Range start
        #[arg(long)]
        from: Option<String>,
        /// Range end (defaults to today)
        #[arg(long)]
        to: Option<String>,
    },
    /// Most used windows in a category
    Top {
        /// Category name, see `tempo categories`
        category: Category,
        #[arg(long)]
        from: Option<String>,
        #[arg(long)]
        to: Option<String>,
        #[arg(short, long, default_value_t = 10)]
        limit: usize,
    },
    /// Usage per calendar day
    Daily {
        #[arg(long)]
        from: Option<String>,
        #[arg(long)]
        to: Option<String>,
    },
    /// Latest sessions
    Recent {
        #[arg(short, long, default_value_t = 20)]
        limit: usize,
    },
    /// Show how an app/window pair is classified
    Classify { app: String, title: String },
    /// List categories and their keywords
    Categories,
    /// Data management commands
    Data {
        #[command(subcommand)]
        action: DataAction,
    },
}

#[derive(Subcommand, Debug)]
enum DataAction {
    /// Delete all sessions from today (irreversible)
    DeleteToday {
        #[arg(long)]
        yes: bool,
    },
    /// Delete all sessions between two dates, inclusive (irreversible)
    DeleteRange {
        start: String,
        end: String,
        #[arg(long)]
        yes: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if !matches!(cli.command, Commands::DaemonInternalStart) {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
            .format_timestamp_secs()
            .init();
    }

    let data_dir = get_data_dir()?;

    match cli.command {
        Commands::Start => start_daemon(&data_dir),
        Commands::DaemonInternalStart => run_daemon_process().await,
        Commands::Stop => stop_daemon(&data_dir).await,
        Commands::Status => show_status(&data_dir).await,
        Commands::Run => run_foreground().await,
        Commands::Today => handle_today_command(&open_reporter(&Config::load()?)?),
        Commands::Usage { start, end } => {
            handle_usage_command(&open_reporter(&Config::load()?)?, &start, &end)
        }
        Commands::Report {
            date,
            week,
            from,
            to,
        } => {
            let period = if let Some(week) = week {
                ReportPeriod::Week(date_or_today(Some(&week))?)
            } else if from.is_some() || to.is_some() {
                ReportPeriod::Range(range_from_flags(from.as_deref(), to.as_deref())?)
            } else {
                ReportPeriod::Day(date_or_today(date.as_deref())?)
            };
            handle_report_command(&open_reporter(&Config::load()?)?, period)
        }
        Commands::Top {
            category,
            from,
            to,
            limit,
        } => {
            let range = range_from_flags(from.as_deref(), to.as_deref())?;
            handle_top_command(&open_reporter(&Config::load()?)?, &range, category, limit)
        }
        Commands::Daily { from, to } => {
            let range = range_from_flags(from.as_deref(), to.as_deref())?;
            handle_daily_command(&open_reporter(&Config::load()?)?, &range)
        }
        Commands::Recent { limit } => handle_recent_command(&open_reporter(&Config::load()?)?, limit),
        Commands::Classify { app, title } => handle_classify_command(&Config::load()?, &app, &title),
        Commands::Categories => {
            handle_categories_command();
            Ok(())
        }
        Commands::Data { action } => {
            let db = open_database(&Config::load()?)?;
            match action {
                DataAction::DeleteToday { yes } => handle_delete_today(&db, yes).map(|_| ()),
                DataAction::DeleteRange { start, end, yes } => {
                    handle_delete_range(&db, &start, &end, yes).map(|_| ())
                }
            }
        }
    }
}
