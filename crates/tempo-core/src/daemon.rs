use crate::{
    clock::{Clock, SystemClock},
    config::{get_data_dir, Config},
    ipc::{listen, DaemonIpcHandler},
    monitor::{create_monitor, SystemMonitor},
    poller::ForegroundPoller,
    privacy::PrivacyFilter,
    session_manager::{SessionManager, TickOutcome, TrackingState},
};
use anyhow::Result;
use std::{
    path::PathBuf,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    time::Duration,
};
use tempo_storage::{Database, StorageError};
use tokio::time::{interval, MissedTickBehavior};

/// The tracking loop: one controller tick per interval, until stopped.
pub struct Daemon {
    session_manager: SessionManager,
    ipc_handler: Arc<DaemonIpcHandler>,
    shutdown_signal: Arc<AtomicBool>,
    tick_interval: Duration,
    sock_path: Option<PathBuf>,
}

impl Daemon {
    /// Build a daemon for this platform from `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if the platform has no monitor or the data directory is unknown
    pub fn new(database: Database, config: &Config) -> Result<Self> {
        let mut daemon = Self::with_monitor(
            Arc::new(database),
            create_monitor()?,
            Arc::new(SystemClock),
            config,
        );
        daemon.sock_path = Some(get_data_dir()?.join("tempo.sock"));
        Ok(daemon)
    }

    /// Build a daemon around an explicit monitor and clock, without IPC.
    #[must_use]
    pub fn with_monitor(
        database: Arc<Database>,
        monitor: Box<dyn SystemMonitor>,
        clock: Arc<dyn Clock>,
        config: &Config,
    ) -> Self {
        let shutdown_signal = Arc::new(AtomicBool::new(false));
        let poller = ForegroundPoller::new(
            monitor,
            PrivacyFilter::new(config.ignore_window_keywords.clone()),
            config.poll_timeout(),
        );
        let session_manager =
            SessionManager::new(database, poller, clock.clone(), config.max_gap())
                .with_heartbeat(config.heartbeat());

        Self {
            session_manager,
            ipc_handler: Arc::new(DaemonIpcHandler::new(shutdown_signal.clone(), clock.now())),
            shutdown_signal,
            tick_interval: config.tick_interval(),
            sock_path: None,
        }
    }

    /// Flag that stops the loop after the in-flight tick
    #[must_use]
    pub fn shutdown_handle(&self) -> Arc<AtomicBool> {
        self.shutdown_signal.clone()
    }

    /// Run until Ctrl-C or an IPC shutdown request.
    ///
    /// Closes sessions left open by a previous crash before the first tick,
    /// and closes the open session when stopping.
    ///
    /// # Errors
    ///
    /// Returns an error if the recovery sweep or the final close fails
    pub async fn run_with_signals(&mut self) -> Result<()> {
        let recovered = self.session_manager.recover()?;
        if !recovered.is_empty() {
            log::info!("Recovered {} session(s) left open", recovered.len());
        }

        if let Some(sock_path) = self.sock_path.clone() {
            let ipc_handler = self.ipc_handler.clone();
            tokio::spawn(async move {
                if let Err(e) = listen(ipc_handler, &sock_path).await {
                    log::error!("IPC listener failed: {e}");
                }
            });
        }

        let mut interval = interval(self.tick_interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        log::info!("Daemon started, ticking every {:?}", self.tick_interval);

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    self.tick().await;
                }
                _ = tokio::signal::ctrl_c() => {
                    log::info!("Received Ctrl-C, shutting down...");
                    self.shutdown_signal.store(true, Ordering::SeqCst);
                }
            }

            if self.shutdown_signal.load(Ordering::SeqCst) {
                break;
            }
        }

        self.finish()
    }

    /// Run one tick. Never fails: errors are logged and the tick is a no-op.
    pub async fn tick(&mut self) {
        match self.session_manager.tick().await {
            Ok(TickOutcome::Suspended { event, closed }) => {
                log::info!(
                    "Resumed after {}s asleep (closed session: {closed:?})",
                    event.slept_for().num_seconds()
                );
            }
            Ok(outcome) => log::trace!("Tick: {outcome:?}"),
            Err(e) => {
                if let Some(StorageError::MultipleOpenSessions { count }) =
                    e.downcast_ref::<StorageError>()
                {
                    log::error!("Found {count} open sessions; closing them from last known activity");
                    if let Err(e) = self.session_manager.recover() {
                        log::error!("Recovery failed: {e:#}");
                    }
                } else {
                    log::error!("Daemon tick failed: {e:#}");
                }
            }
        }

        self.publish_status().await;
    }

    async fn publish_status(&self) {
        match self.session_manager.state() {
            Ok(TrackingState::Tracking(open)) => {
                self.ipc_handler.set_current_session(Some(open)).await;
            }
            Ok(TrackingState::Idle) => self.ipc_handler.set_current_session(None).await,
            Err(e) => log::debug!("Status refresh skipped: {e}"),
        }
    }

    /// Close the open session at now.
    ///
    /// # Errors
    ///
    /// Returns an error if the store operation fails
    pub fn finish(&mut self) -> Result<()> {
        if let Some(id) = self.session_manager.shutdown()? {
            log::info!("Closed session {id} on shutdown");
        }
        if let Some(sock_path) = &self.sock_path {
            let _ = std::fs::remove_file(sock_path);
        }
        log::info!("Daemon shut down gracefully.");
        Ok(())
    }
}
