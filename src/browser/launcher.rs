//! Chrome discovery and launch.

use std::path::PathBuf;
use std::process::Stdio;

use tokio::process::{Child, Command};
use tracing::{info, warn};

use crate::config::LaunchOptions;
use crate::scratch;

use super::BrowserError;

/// Find a Chrome executable on this machine.
pub fn find_chrome() -> Option<PathBuf> {
    #[cfg(target_os = "macos")]
    {
        let paths = [
            "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
            "/Applications/Chromium.app/Contents/MacOS/Chromium",
            "/Applications/Microsoft Edge.app/Contents/MacOS/Microsoft Edge",
        ];
        for path in &paths {
            let p = PathBuf::from(path);
            if p.exists() {
                return Some(p);
            }
        }
    }

    #[cfg(target_os = "linux")]
    {
        let paths = [
            "/usr/bin/google-chrome",
            "/usr/bin/google-chrome-stable",
            "/usr/bin/chromium",
            "/usr/bin/chromium-browser",
            "/snap/bin/chromium",
        ];
        for path in &paths {
            let p = PathBuf::from(path);
            if p.exists() {
                return Some(p);
            }
        }
    }

    #[cfg(target_os = "windows")]
    {
        let paths = [
            r"C:\Program Files\Google\Chrome\Application\chrome.exe",
            r"C:\Program Files (x86)\Google\Chrome\Application\chrome.exe",
        ];
        for path in &paths {
            let p = PathBuf::from(path);
            if p.exists() {
                return Some(p);
            }
        }
    }

    None
}

/// Profile directory for a launched Chrome. Lives under the scratch
/// directory so repeated runs reuse the same browser state.
fn profile_dir(options: &LaunchOptions) -> PathBuf {
    if let Some(dir) = &options.profile_dir {
        return dir.clone();
    }
    match scratch::resolve() {
        Some(dir) => dir.join("chrome-profile"),
        None => std::env::temp_dir().join("mincer-chrome-profile"),
    }
}

/// Launch Chrome with remote debugging enabled.
pub async fn launch_chrome(options: &LaunchOptions) -> Result<Child, BrowserError> {
    let chrome_path = match &options.chrome_path {
        Some(path) => path.clone(),
        None => find_chrome().ok_or(BrowserError::ChromeNotFound)?,
    };
    let profile_dir = profile_dir(options);

    if let Err(e) = std::fs::create_dir_all(&profile_dir) {
        warn!("failed to create profile directory: {}", e);
    }

    info!("launching Chrome with profile at {}", profile_dir.display());

    let mut cmd = Command::new(&chrome_path);
    cmd.arg(format!("--remote-debugging-port={}", options.debug_port))
        .arg(format!("--user-data-dir={}", profile_dir.display()))
        .arg("--no-first-run")
        .arg("--no-default-browser-check")
        .arg("--disable-background-networking")
        .arg("--disable-sync")
        .arg("--disable-translate")
        .arg("--metrics-recording-only")
        .stdout(Stdio::null())
        .stderr(Stdio::null());

    if options.headless {
        cmd.arg("--headless=new");
    }

    let child = cmd
        .spawn()
        .map_err(|e| BrowserError::LaunchFailed(e.to_string()))?;

    info!("Chrome launched with PID {:?}", child.id());
    Ok(child)
}
