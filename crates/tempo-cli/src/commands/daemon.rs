/// Daemon lifecycle management commands
use anyhow::Result;
use chrono::{Local, Utc};
use std::{env, fs, io, path::Path, process::Command, thread::sleep, time};
use sysinfo::{Pid, System};
use tempo_core::{
    config::get_data_dir,
    ipc::{IpcClient, IpcRequest, IpcResponse},
    Config, Daemon,
};

use super::helpers::format_duration;
use super::open_database;

const PID_FILE: &str = "tempo.pid";
const SOCK_FILE: &str = "tempo.sock";

pub fn start_daemon(data_dir: &Path) -> Result<()> {
    let pid_file_path = data_dir.join(PID_FILE);
    let sock_path = data_dir.join(SOCK_FILE);

    // 1. Check if daemon is already running
    if pid_file_path.exists() {
        if let Ok(pid_str) = fs::read_to_string(&pid_file_path) {
            if let Ok(pid) = pid_str.trim().parse::<usize>() {
                let mut sys = System::new();
                if sys.refresh_process(Pid::from(pid)) {
                    println!("Daemon is already running (PID: {pid}).");
                    return Ok(());
                }
            }
        }
        // If pid file is stale, remove it
        log::warn!("Removing stale PID file.");
        let _ = fs::remove_file(&pid_file_path);
    }

    // 2. Clean up old socket if it exists
    if sock_path.exists() {
        log::warn!("Removing stale socket file.");
        fs::remove_file(&sock_path)?;
    }

    fs::create_dir_all(data_dir)?;

    // 3. Spawn a new process for the daemon
    let current_exe = env::current_exe()?;
    let current_dir = env::current_dir()?;
    let child = Command::new(current_exe)
        .arg("daemon-internal-start")
        .current_dir(current_dir)
        .spawn()?;

    // 4. In parent process, write PID and exit
    fs::write(&pid_file_path, child.id().to_string())?;
    println!("Daemon started (PID: {}).", child.id());

    Ok(())
}

pub async fn run_daemon_process() -> Result<()> {
    // This is the detached daemon process
    // We must set up logging here, as this is a new process.
    if let Err(e) = setup_daemon_logging() {
        eprintln!("Failed to set up daemon logging: {e}");
        return Err(e);
    }
    log::info!("Daemon process started internally.");

    if let Err(e) = run_foreground().await {
        log::error!("Daemon main logic exited with a fatal error: {e:#}");
        return Err(e);
    }

    Ok(())
}

/// Run the tracking loop in this process until Ctrl-C or `tempo stop`.
pub async fn run_foreground() -> Result<()> {
    let config = Config::load()?;
    let db = open_database(&config)?;
    let mut daemon = Daemon::new(db, &config)?;
    daemon.run_with_signals().await
}

pub async fn stop_daemon(data_dir: &Path) -> Result<()> {
    let pid_file_path = data_dir.join(PID_FILE);
    let sock_path = data_dir.join(SOCK_FILE);

    if !pid_file_path.exists() {
        println!("Daemon is not running (no PID file).");
        // Also remove socket if it exists for consistency
        if sock_path.exists() {
            fs::remove_file(&sock_path)?;
        }
        return Ok(());
    }

    let pid_str = fs::read_to_string(&pid_file_path)?;
    let pid = pid_str
        .trim()
        .parse::<usize>()
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

    log::info!("Stopping tempo daemon (PID: {pid})...");
    let client = IpcClient::new(&sock_path);

    match client.send_command(IpcRequest::Shutdown).await {
        Ok(IpcResponse::Shutdown) => {
            log::info!("Daemon shutdown signal sent. Waiting for process to exit...");
            // one tick to finish plus the final close
            sleep(time::Duration::from_secs(3));

            let mut sys = System::new();
            if sys.refresh_process(Pid::from(pid)) {
                log::warn!("Daemon did not stop gracefully. Force killing...");
                if let Some(process) = sys.process(Pid::from(pid)) {
                    process.kill();
                }
                println!("Daemon killed; its open session will be closed on next start.");
            } else {
                println!("Daemon stopped.");
            }
        }
        Ok(resp) => log::error!("Received unexpected response from daemon: {resp:?}"),
        Err(e) => {
            log::error!("Failed to send shutdown command: {e}. Forcing cleanup.");
            let mut sys = System::new();
            if sys.refresh_process(Pid::from(pid)) {
                if let Some(process) = sys.process(Pid::from(pid)) {
                    process.kill();
                    println!("Daemon killed.");
                }
            }
        }
    }

    // Cleanup
    fs::remove_file(&pid_file_path)?;
    if sock_path.exists() {
        fs::remove_file(&sock_path)?;
    }

    Ok(())
}

pub async fn show_status(data_dir: &Path) -> Result<()> {
    let sock_path = data_dir.join(SOCK_FILE);

    if sock_path.exists() {
        let client = IpcClient::new(&sock_path);
        match client.send_command(IpcRequest::Status).await {
            Ok(IpcResponse::Status {
                started_at,
                current_app,
                window_title,
                session_start,
            }) => {
                println!(
                    "Daemon Status: Running since {}",
                    started_at.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S")
                );
                println!("\nCurrent Activity:");
                match (current_app, window_title, session_start) {
                    (Some(app), Some(title), Some(start)) => {
                        println!("  App: {app}");
                        println!("  Window: {title}");
                        let elapsed = Utc::now().signed_duration_since(start).num_seconds();
                        println!("  Session Duration: {}", format_duration(elapsed.max(0)));
                    }
                    _ => println!("  None (idle)"),
                }
            }
            Ok(_) => anyhow::bail!("Unexpected response from daemon"),
            Err(e) => {
                log::error!("Failed to get status: {e}");
                println!("Daemon Status: Not running (or not responding)");
            }
        }
    } else {
        println!("Daemon Status: Not running");
    }

    let config = Config::load()?;
    let totals = open_database(&config)?.usage_totals(&tempo_storage::DateRange::today())?;
    if totals.is_empty() {
        println!("\nToday: No data");
    } else {
        println!(
            "\nToday: {} across {} sessions",
            format_duration(totals.total_seconds),
            totals.session_count
        );
    }

    Ok(())
}

fn setup_daemon_logging() -> Result<()> {
    use std::fs::{create_dir_all, OpenOptions};

    let log_path = get_data_dir()?.join("tempo.log");

    if let Some(parent) = log_path.parent() {
        create_dir_all(parent)?;
    }

    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)?;

    env_logger::Builder::from_default_env()
        .target(env_logger::Target::Pipe(Box::new(log_file)))
        .filter_level(log::LevelFilter::Debug)
        .init();

    Ok(())
}
