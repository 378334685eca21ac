pub mod classifier;
pub mod clock;
pub mod config;
pub mod daemon;
pub mod ipc;
pub mod monitor;
pub mod poller;
pub mod privacy;
pub mod reports;
pub mod session_manager;
pub mod suspend;

pub use classifier::{Category, ClassificationResult, ClassificationSource, Classifier};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{get_data_dir, Config};
pub use daemon::Daemon;
pub use reports::{ClassifiedStatistics, Reporter, UsageSummary};
pub use session_manager::{SessionManager, TickOutcome, TrackingState};
pub use suspend::{SuspendDetector, SuspendEvent};
