use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

#[cfg(target_os = "macos")]
pub mod macos;

#[cfg(target_os = "linux")]
pub mod linux;

/// The window holding foreground focus
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForegroundWindow {
    /// Process name, e.g. `chrome.exe` or `Code`
    pub app_name: String,
    pub window_title: String,
    /// Executable path when the platform exposes it
    pub executable_path: Option<String>,
}

impl ForegroundWindow {
    #[must_use]
    pub fn new(app_name: impl Into<String>, window_title: impl Into<String>) -> Self {
        Self {
            app_name: app_name.into(),
            window_title: window_title.into(),
            executable_path: None,
        }
    }

    #[must_use]
    pub fn with_executable_path(mut self, path: impl Into<String>) -> Self {
        self.executable_path = Some(path.into());
        self
    }
}

/// Platform-specific source of the focused window
#[async_trait]
pub trait SystemMonitor: Send + Sync {
    /// Read the focused window.
    ///
    /// Returns `Ok(None)` when nothing is focused or when the owning process
    /// exited between reading focus and reading its metadata.
    async fn active_window(&self) -> Result<Option<ForegroundWindow>>;
}

/// Create platform-specific monitor
///
/// # Errors
///
/// Returns an error if the current platform is not supported or if monitor initialization fails
pub fn create_monitor() -> Result<Box<dyn SystemMonitor>> {
    #[cfg(target_os = "macos")]
    {
        Ok(Box::new(macos::MacOSMonitor::new()?))
    }

    #[cfg(target_os = "linux")]
    {
        Ok(Box::new(linux::LinuxMonitor::new()?))
    }

    #[cfg(not(any(target_os = "macos", target_os = "linux")))]
    {
        anyhow::bail!("Unsupported platform")
    }
}
