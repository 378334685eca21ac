use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Get the local data directory for tempo.
///
/// # Errors
///
/// Returns an error if the local data directory cannot be determined.
pub fn get_data_dir() -> Result<PathBuf> {
    let mut path =
        dirs::data_local_dir().ok_or_else(|| anyhow::anyhow!("Failed to get local data dir"))?;
    path.push("tempo");
    Ok(path)
}

/// Upper bound for second-valued settings (one year)
const MAX_DURATION_SECS: i64 = 365 * 24 * 60 * 60;

/// Daemon and classifier settings, read from `<data_dir>/config.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Period of the tracking loop
    pub tick_interval_ms: u64,
    /// A wall-clock gap longer than this between ticks is treated as a suspend
    pub max_gap_secs: u64,
    /// Upper bound on a single foreground read
    pub poll_timeout_ms: u64,
    /// Upper bound on waiting for a locked database
    pub store_busy_timeout_ms: u64,
    /// How often the focused process's `last_seen` is refreshed while unchanged
    pub heartbeat_secs: u64,
    /// Window titles containing any of these are never tracked
    pub ignore_window_keywords: Vec<String>,
    pub database_path: Option<PathBuf>,
    pub model_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tick_interval_ms: 1000,
            max_gap_secs: 30,
            poll_timeout_ms: 500,
            store_busy_timeout_ms: 2000,
            heartbeat_secs: 30,
            ignore_window_keywords: vec![
                String::from("Program Manager"),
                String::from("Desktop"),
                String::from("Settings"),
                String::from("Lock Screen"),
                String::from("LockApp"),
                String::from("\u{7cfb}\u{7edf}"), // "system"
                String::from("\u{684c}\u{9762}"), // "desktop"
            ],
            database_path: None,
            model_path: None,
        }
    }
}

impl Config {
    /// Load `<data_dir>/config.toml`, falling back to defaults when it is absent.
    ///
    /// # Errors
    ///
    /// Returns an error if the data directory is unknown or the file exists but
    /// cannot be read or parsed.
    pub fn load() -> Result<Self> {
        Self::load_from(&get_data_dir()?.join("config.toml"))
    }

    /// Load a config file, falling back to defaults when it is absent.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let config: Self = toml::from_str(&raw)
            .with_context(|| format!("Failed to parse config {}", path.display()))?;
        config
            .validate()
            .with_context(|| format!("Invalid config {}", path.display()))?;
        Ok(config)
    }

    /// Reject values the tick loop cannot run with.
    ///
    /// # Errors
    ///
    /// Returns an error naming the first out-of-range key.
    pub fn validate(&self) -> Result<()> {
        if self.tick_interval_ms == 0 {
            bail!("tick_interval_ms must be greater than zero");
        }
        if self.poll_timeout_ms == 0 {
            bail!("poll_timeout_ms must be greater than zero");
        }
        if !in_duration_range(self.max_gap_secs) {
            bail!("max_gap_secs must be between 1 and {MAX_DURATION_SECS}");
        }
        if !in_duration_range(self.heartbeat_secs) {
            bail!("heartbeat_secs must be between 1 and {MAX_DURATION_SECS}");
        }
        Ok(())
    }

    #[must_use]
    pub const fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    #[must_use]
    pub const fn poll_timeout(&self) -> Duration {
        Duration::from_millis(self.poll_timeout_ms)
    }

    #[must_use]
    pub const fn store_busy_timeout(&self) -> Duration {
        Duration::from_millis(self.store_busy_timeout_ms)
    }

    #[must_use]
    pub fn max_gap(&self) -> chrono::Duration {
        duration_secs(self.max_gap_secs)
    }

    #[must_use]
    pub fn heartbeat(&self) -> chrono::Duration {
        duration_secs(self.heartbeat_secs)
    }

    /// Database location, defaulting to `<data_dir>/tempo.db`.
    ///
    /// # Errors
    ///
    /// Returns an error if no path is configured and the data directory is unknown.
    pub fn database_path(&self) -> Result<PathBuf> {
        match &self.database_path {
            Some(path) => Ok(path.clone()),
            None => Ok(get_data_dir()?.join("tempo.db")),
        }
    }

    /// Fallback model location, defaulting to `<data_dir>/model/classifier.json`.
    ///
    /// # Errors
    ///
    /// Returns an error if no path is configured and the data directory is unknown.
    pub fn model_path(&self) -> Result<PathBuf> {
        match &self.model_path {
            Some(path) => Ok(path.clone()),
            None => Ok(get_data_dir()?.join("model").join("classifier.json")),
        }
    }
}

fn in_duration_range(secs: u64) -> bool {
    i64::try_from(secs).is_ok_and(|s| (1..=MAX_DURATION_SECS).contains(&s))
}

/// Seconds as a chrono duration, saturating at `MAX_DURATION_SECS`.
fn duration_secs(secs: u64) -> chrono::Duration {
    let secs = i64::try_from(secs).map_or(MAX_DURATION_SECS, |s| s.min(MAX_DURATION_SECS));
    chrono::Duration::seconds(secs)
}
