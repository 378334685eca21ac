//! Session lifecycle controller.
//!
//! Two states, Idle and Tracking, both derived from the store on every tick:
//! the store is the only source of truth for which session is open, so the
//! controller recovers correctly after a restart, a failed tick or an
//! external edit without any cached state to invalidate.

use anyhow::Result;
use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;
use tempo_storage::{Database, OpenSession, WindowSession};

use crate::clock::Clock;
use crate::monitor::ForegroundWindow;
use crate::poller::ForegroundPoller;
use crate::suspend::{SuspendDetector, SuspendEvent};

/// What a tick did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    /// A suspend was detected. The open session, if any, was closed at the
    /// sleep start and nothing was opened.
    Suspended {
        event: SuspendEvent,
        closed: Option<i64>,
    },
    /// No usable foreground window this tick
    NoForeground,
    /// The open session still matches the focused window
    Unchanged { session_id: i64 },
    /// Focus moved: the previous session (if any) was closed and a new one opened
    Switched { closed: Option<i64>, opened: i64 },
}

/// Controller state as seen by the store
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrackingState {
    Idle,
    Tracking(OpenSession),
}

impl TrackingState {
    #[must_use]
    pub const fn is_tracking(&self) -> bool {
        matches!(self, Self::Tracking(_))
    }

    #[must_use]
    pub const fn description(&self) -> &'static str {
        match self {
            Self::Idle => "Idle",
            Self::Tracking(_) => "Tracking",
        }
    }
}

/// Drives session open/close decisions, one tick at a time
pub struct SessionManager {
    database: Arc<Database>,
    poller: ForegroundPoller,
    detector: SuspendDetector,
    clock: Arc<dyn Clock>,
    heartbeat: Duration,
    last_heartbeat: Option<DateTime<Utc>>,
}

impl SessionManager {
    #[must_use]
    pub fn new(
        database: Arc<Database>,
        poller: ForegroundPoller,
        clock: Arc<dyn Clock>,
        max_gap: Duration,
    ) -> Self {
        Self {
            database,
            poller,
            detector: SuspendDetector::new(clock.clone(), max_gap),
            clock,
            heartbeat: Duration::seconds(30),
            last_heartbeat: None,
        }
    }

    /// How often the focused process's `last_seen` is refreshed while its
    /// session is unchanged
    #[must_use]
    pub const fn with_heartbeat(mut self, heartbeat: Duration) -> Self {
        self.heartbeat = heartbeat;
        self
    }

    /// Run one tick.
    ///
    /// # Errors
    ///
    /// Returns an error if the foreground read or a store operation fails, or
    /// if the store holds more than one open session. The tick has no further
    /// effect in that case.
    pub async fn tick(&mut self) -> Result<TickOutcome> {
        if let Some(event) = self.detector.check_for_suspend() {
            log::info!(
                "Suspend detected: slept from {} to {} ({}s)",
                event.sleep_start,
                event.wake_time,
                event.slept_for().num_seconds()
            );
            let closed = self.close_current(event.sleep_start)?;
            return Ok(TickOutcome::Suspended { event, closed });
        }

        let Some(window) = self.poller.poll().await? else {
            return Ok(TickOutcome::NoForeground);
        };

        self.detector.mark_activity();
        self.observe(&window)
    }

    fn observe(&mut self, window: &ForegroundWindow) -> Result<TickOutcome> {
        let now = self.clock.now();
        let open = self.database.current_open_session()?;

        if let Some(open) = &open {
            if open.is_same_window(&window.app_name, &window.window_title) {
                self.heartbeat(open.process_id, now)?;
                return Ok(TickOutcome::Unchanged {
                    session_id: open.session_id,
                });
            }
        }

        let closed = match open {
            Some(open) => {
                self.database.close_session(open.session_id, Some(now))?;
                log::info!(
                    "Closed session {} ({} - {})",
                    open.session_id,
                    open.process_name,
                    open.window_title
                );
                Some(open.session_id)
            }
            None => None,
        };

        let process_id = self.database.upsert_process_at(
            &window.app_name,
            window.executable_path.as_deref(),
            now,
        )?;
        let opened = self
            .database
            .open_session_at(process_id, &window.window_title, now)?;
        self.last_heartbeat = Some(now);

        log::info!(
            "Opened session {opened} ({} - {})",
            window.app_name,
            window.window_title
        );
        Ok(TickOutcome::Switched { closed, opened })
    }

    fn heartbeat(&mut self, process_id: i64, now: DateTime<Utc>) -> Result<()> {
        let due = self
            .last_heartbeat
            .map_or(true, |last| now.signed_duration_since(last) >= self.heartbeat);
        if due {
            self.database.touch_process(process_id, now)?;
            self.last_heartbeat = Some(now);
        }
        Ok(())
    }

    /// Close the open session, if any, at `end_time`. Returns its id.
    fn close_current(&mut self, end_time: DateTime<Utc>) -> Result<Option<i64>> {
        let Some(open) = self.database.current_open_session()? else {
            return Ok(None);
        };

        let closed = self.database.close_session(open.session_id, Some(end_time))?;
        if closed {
            log::info!("Closed session {} at {end_time}", open.session_id);
        }
        self.last_heartbeat = None;
        Ok(closed.then_some(open.session_id))
    }

    /// Close the open session at wall-clock now, for a clean stop.
    ///
    /// # Errors
    ///
    /// Returns an error if the store operation fails
    pub fn shutdown(&mut self) -> Result<Option<i64>> {
        let now = self.clock.now();
        self.close_current(now)
    }

    /// Close every session left open by an unclean exit, then re-sync the
    /// suspend detector.
    ///
    /// # Errors
    ///
    /// Returns an error if the store operation fails
    pub fn recover(&mut self) -> Result<Vec<WindowSession>> {
        let closed = self.database.close_stale_sessions()?;
        for session in &closed {
            log::warn!(
                "Recovered session {} ({} - {}), closed after {}s",
                session.id,
                session.process_name,
                session.window_title,
                session.duration_seconds
            );
        }
        self.last_heartbeat = None;
        self.detector.reset();
        Ok(closed)
    }

    /// Current state, read from the store.
    ///
    /// # Errors
    ///
    /// Returns an error if the store query fails or more than one session is open
    pub fn state(&self) -> Result<TrackingState> {
        Ok(self
            .database
            .current_open_session()?
            .map_or(TrackingState::Idle, TrackingState::Tracking))
    }
}
