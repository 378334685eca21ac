use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::process::Command;

use super::{ForegroundWindow, SystemMonitor};

/// X11 monitor backed by `xdotool` and `/proc`
pub struct LinuxMonitor {
    proc_root: PathBuf,
}

impl LinuxMonitor {
    /// Create a new Linux monitor
    ///
    /// # Errors
    ///
    /// Returns an error if `xdotool` is not installed
    pub fn new() -> Result<Self> {
        let found = std::env::var_os("PATH")
            .is_some_and(|paths| std::env::split_paths(&paths).any(|dir| dir.join("xdotool").is_file()));
        if !found {
            bail!("xdotool not found in PATH; install it to track the focused window");
        }

        Ok(Self {
            proc_root: PathBuf::from("/proc"),
        })
    }

    async fn xdotool(args: &[&str]) -> Result<Option<String>> {
        let output = Command::new("xdotool")
            .args(args)
            .kill_on_drop(true)
            .output()
            .await
            .context("Failed to run xdotool")?;

        if !output.status.success() {
            // no focused window, e.g. on an empty desktop
            log::trace!(
                "xdotool {args:?} failed: {}",
                String::from_utf8_lossy(&output.stderr).trim()
            );
            return Ok(None);
        }

        Ok(Some(String::from_utf8_lossy(&output.stdout).into_owned()))
    }
}

/// Split `getwindowname getwindowpid` output into the title and pid lines.
///
/// The pid is the last line; a title may itself be empty.
fn parse_name_and_pid(output: &str) -> Result<Option<(String, u32)>> {
    let lines: Vec<&str> = output.lines().collect();
    let Some((pid, title)) = lines.split_last() else {
        return Ok(None);
    };
    if title.is_empty() {
        return Ok(None);
    }
    let pid = pid.trim();
    let pid: u32 = pid
        .parse()
        .with_context(|| format!("Unexpected pid from xdotool: {pid:?}"))?;
    Ok(Some((title.join("\n").trim().to_string(), pid)))
}

/// Name and executable of a running process, or `None` if it has exited.
pub(crate) fn read_process(proc_root: &Path, pid: u32) -> Option<(String, Option<String>)> {
    let dir = proc_root.join(pid.to_string());
    let name = std::fs::read_to_string(dir.join("comm")).ok()?;
    let name = name.trim();
    if name.is_empty() {
        return None;
    }

    let exe = std::fs::read_link(dir.join("exe"))
        .ok()
        .map(|path| path.to_string_lossy().into_owned());

    Some((name.to_string(), exe))
}

#[async_trait]
impl SystemMonitor for LinuxMonitor {
    async fn active_window(&self) -> Result<Option<ForegroundWindow>> {
        // one invocation so the title and pid describe the same window
        let Some(output) =
            Self::xdotool(&["getactivewindow", "getwindowname", "getwindowpid"]).await?
        else {
            return Ok(None);
        };
        let Some((title, pid)) = parse_name_and_pid(&output)? else {
            log::debug!("Incomplete xdotool output: {output:?}");
            return Ok(None);
        };

        let Some((name, exe)) = read_process(&self.proc_root, pid) else {
            log::debug!("Process {pid} exited before it could be read");
            return Ok(None);
        };

        let mut window = ForegroundWindow::new(name, title);
        window.executable_path = exe;
        Ok(Some(window))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_process_from_proc_layout() {
        let root = tempfile::tempdir().unwrap();
        let dir = root.path().join("4242");
        std::fs::create_dir(&dir).unwrap();
        std::fs::write(dir.join("comm"), "firefox\n").unwrap();

        let (name, exe) = read_process(root.path(), 4242).unwrap();
        assert_eq!(name, "firefox");
        assert_eq!(exe, None);
    }

    #[test]
    fn test_parse_name_and_pid() {
        assert_eq!(
            parse_name_and_pid("main.rs - tempo - Code\n4242\n").unwrap(),
            Some((String::from("main.rs - tempo - Code"), 4242))
        );
        assert_eq!(
            parse_name_and_pid("\n17\n").unwrap(),
            Some((String::new(), 17))
        );
    }

    #[test]
    fn test_parse_missing_pid_line_is_none() {
        assert_eq!(parse_name_and_pid("Terminal\n").unwrap(), None);
        assert_eq!(parse_name_and_pid("").unwrap(), None);
    }

    #[test]
    fn test_parse_garbage_pid_is_an_error() {
        assert!(parse_name_and_pid("Terminal\nnot-a-pid\n").is_err());
    }

    #[test]
    fn test_exited_process_is_none() {
        let root = tempfile::tempdir().unwrap();
        assert_eq!(read_process(root.path(), 4242), None);
    }

    #[test]
    fn test_current_process_has_executable() {
        let (_, exe) = read_process(Path::new("/proc"), std::process::id()).unwrap();
        assert!(exe.is_some());
    }
}
