use anyhow::Result;
use std::time::Duration;

use crate::monitor::{ForegroundWindow, SystemMonitor};
use crate::privacy::PrivacyFilter;

/// Filtered, time-bounded access to the platform monitor.
///
/// One `poll` per tick. Filtered windows and slow reads both come back as
/// `None` so a single tick can never stall the loop for long.
pub struct ForegroundPoller {
    monitor: Box<dyn SystemMonitor>,
    filter: PrivacyFilter,
    timeout: Duration,
}

impl ForegroundPoller {
    #[must_use]
    pub fn new(monitor: Box<dyn SystemMonitor>, filter: PrivacyFilter, timeout: Duration) -> Self {
        Self {
            monitor,
            filter,
            timeout,
        }
    }

    /// Read the focused window, applying the ignore-list.
    ///
    /// # Errors
    ///
    /// Returns an error if the platform monitor fails
    pub async fn poll(&self) -> Result<Option<ForegroundWindow>> {
        let Ok(window) = tokio::time::timeout(self.timeout, self.monitor.active_window()).await
        else {
            log::warn!("Foreground read timed out after {:?}", self.timeout);
            return Ok(None);
        };

        match window? {
            Some(window) if self.filter.should_exclude(&window) => {
                log::trace!("Ignoring window {:?} of {}", window.window_title, window.app_name);
                Ok(None)
            }
            other => Ok(other),
        }
    }
}
