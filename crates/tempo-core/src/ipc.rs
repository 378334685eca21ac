use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{
    fs, io,
    path::{Path, PathBuf},
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
};
use tempo_storage::OpenSession;
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::{UnixListener, UnixStream},
    sync::Mutex,
};

/// IPC request from CLI to daemon
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum IpcRequest {
    Status,
    Shutdown,
}

/// IPC response from daemon to CLI
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub enum IpcResponse {
    Status {
        started_at: DateTime<Utc>,
        current_app: Option<String>,
        window_title: Option<String>,
        session_start: Option<DateTime<Utc>>,
    },
    Shutdown,
}

#[derive(Debug)]
pub struct IpcClient {
    sock_path: PathBuf,
}

impl IpcClient {
    #[must_use]
    pub fn new(sock_path: &Path) -> Self {
        Self {
            sock_path: sock_path.to_path_buf(),
        }
    }

    /// Send one request and wait for the reply.
    ///
    /// # Errors
    ///
    /// Returns an error if the daemon is not listening or the reply cannot be decoded
    pub async fn send_command(&self, request: IpcRequest) -> Result<IpcResponse> {
        let mut stream = UnixStream::connect(&self.sock_path)
            .await
            .with_context(|| format!("Failed to connect to {}", self.sock_path.display()))?;

        let encoded = bincode::serialize(&request)?;
        stream.write_all(&encoded).await?;
        stream.shutdown().await?;

        let mut buffer = Vec::new();
        stream.read_to_end(&mut buffer).await?;
        let response: IpcResponse = bincode::deserialize(&buffer)?;

        Ok(response)
    }
}

/// Daemon side of the socket: answers status queries from a snapshot the
/// tick loop refreshes, and raises the stop flag on request.
pub struct DaemonIpcHandler {
    current: Mutex<Option<OpenSession>>,
    started_at: DateTime<Utc>,
    shutdown_signal: Arc<AtomicBool>,
}

impl DaemonIpcHandler {
    #[must_use]
    pub fn new(shutdown_signal: Arc<AtomicBool>, started_at: DateTime<Utc>) -> Self {
        Self {
            current: Mutex::new(None),
            started_at,
            shutdown_signal,
        }
    }

    pub async fn set_current_session(&self, session: Option<OpenSession>) {
        let mut lock = self.current.lock().await;
        *lock = session;
    }

    pub async fn respond(&self, request: IpcRequest) -> IpcResponse {
        match request {
            IpcRequest::Status => {
                let current = self.current.lock().await;
                IpcResponse::Status {
                    started_at: self.started_at,
                    current_app: current.as_ref().map(|s| s.process_name.clone()),
                    window_title: current.as_ref().map(|s| s.window_title.clone()),
                    session_start: current.as_ref().map(|s| s.start_time),
                }
            }
            IpcRequest::Shutdown => {
                log::info!("Shutdown requested over IPC");
                self.shutdown_signal.store(true, Ordering::SeqCst);
                IpcResponse::Shutdown
            }
        }
    }

    async fn handle(&self, stream: &mut UnixStream, request: IpcRequest) -> Result<()> {
        let response = self.respond(request).await;
        let encoded = bincode::serialize(&response)?;
        stream.write_all(&encoded).await?;
        Ok(())
    }
}

/// Accept connections on `sock_path` until the task is dropped.
///
/// # Errors
///
/// Returns an error if a stale socket cannot be removed or the socket cannot be bound
pub async fn listen(handler: Arc<DaemonIpcHandler>, sock_path: &Path) -> io::Result<()> {
    if sock_path.exists() {
        fs::remove_file(sock_path)?;
    }
    let listener = UnixListener::bind(sock_path)?;

    loop {
        match listener.accept().await {
            Ok((mut stream, _)) => {
                let handler = handler.clone();
                tokio::spawn(async move {
                    let mut buf = vec![0; 1024];
                    match stream.read(&mut buf).await {
                        Ok(n) if n > 0 => match bincode::deserialize::<IpcRequest>(&buf[..n]) {
                            Ok(request) => {
                                if let Err(e) = handler.handle(&mut stream, request).await {
                                    log::error!("IPC handle error: {e}");
                                }
                            }
                            Err(e) => {
                                log::error!("IPC deserialize error: {e}");
                            }
                        },
                        Ok(_) => {} // Connection closed
                        Err(e) => {
                            log::error!("IPC read error: {e}");
                        }
                    }
                });
            }
            Err(e) => {
                log::error!("IPC accept error: {e}");
            }
        }
    }
}
