use anyhow::Result;
use async_trait::async_trait;
use cocoa::base::{id, nil};
use cocoa::foundation::NSAutoreleasePool;
use objc::{class, msg_send, sel, sel_impl};

use super::{ForegroundWindow, SystemMonitor};

use tokio::process::Command;

const FRONT_WINDOW_SCRIPT: &str = r#"
    tell application "System Events"
        set frontProc to first application process whose frontmost is true
        set appName to name of frontProc
        try
            set appPath to POSIX path of (application file of frontProc as alias)
        on error
            set appPath to ""
        end try
        try
            set winTitle to name of first window of frontProc
        on error
            set winTitle to ""
        end try
        return appName & "|" & appPath & "|" & winTitle
    end tell
"#;

pub struct MacOSMonitor;

impl MacOSMonitor {
    /// Create a new macOS monitor
    ///
    /// # Errors
    ///
    /// Currently always succeeds, but returns `Result` for consistency with other platforms
    pub fn new() -> Result<Self> {
        Ok(Self)
    }

    unsafe fn ns_string(value: id) -> Option<String> {
        if value.is_null() {
            return None;
        }
        let bytes: *const u8 = msg_send![value, UTF8String];
        let len: usize = msg_send![value, lengthOfBytesUsingEncoding: 4usize];
        let slice = std::slice::from_raw_parts(bytes, len);
        Some(String::from_utf8_lossy(slice).to_string())
    }

    /// Frontmost app via `NSWorkspace`. Cocoa does not expose window titles,
    /// so the title is left empty.
    fn frontmost_app() -> Option<ForegroundWindow> {
        unsafe {
            let _pool = NSAutoreleasePool::new(nil);

            let workspace: id = msg_send![class!(NSWorkspace), sharedWorkspace];
            let frontmost_app: id = msg_send![workspace, frontmostApplication];

            if frontmost_app == nil {
                return None;
            }

            let app_name: id = msg_send![frontmost_app, localizedName];
            let name = Self::ns_string(app_name)?;

            let url: id = msg_send![frontmost_app, executableURL];
            let path = if url == nil {
                None
            } else {
                let path: id = msg_send![url, path];
                Self::ns_string(path)
            };

            Some(ForegroundWindow {
                app_name: name,
                window_title: String::new(),
                executable_path: path,
            })
        }
    }
}

fn parse_script_output(output: &str) -> Option<ForegroundWindow> {
    let mut parts = output.trim().splitn(3, '|');
    let app_name = parts.next().filter(|name| !name.is_empty())?;
    let path = parts.next().filter(|path| !path.is_empty());
    let title = parts.next().unwrap_or_default();

    Some(ForegroundWindow {
        app_name: app_name.to_string(),
        window_title: title.to_string(),
        executable_path: path.map(str::to_string),
    })
}

#[async_trait]
impl SystemMonitor for MacOSMonitor {
    async fn active_window(&self) -> Result<Option<ForegroundWindow>> {
        // AppleScript gives name and title for the same frontmost process
        let output = Command::new("osascript")
            .arg("-e")
            .arg(FRONT_WINDOW_SCRIPT)
            .kill_on_drop(true)
            .output()
            .await;

        if let Ok(output) = output {
            if output.status.success() {
                let result = String::from_utf8_lossy(&output.stdout);
                if let Some(window) = parse_script_output(&result) {
                    return Ok(Some(window));
                }
            }
        }

        // Fallback to Cocoa API if AppleScript fails
        Ok(Self::frontmost_app())
    }
}
