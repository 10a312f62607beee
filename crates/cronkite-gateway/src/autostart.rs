//! Login-item registration — run the gateway when the user logs in.
//!
//! Linux gets an XDG autostart `.desktop` entry, macOS a per-user
//! LaunchAgent plist. Anything else reports `Unsupported`, which the WS
//! layer surfaces as an `UNAVAILABLE` error.

use std::io;
use std::path::{Path, PathBuf};

use tracing::info;

#[derive(Debug, thiserror::Error)]
pub enum AutostartError {
    #[error("autostart is not supported on this platform")]
    Unsupported,
    #[error(transparent)]
    Io(#[from] io::Error),
}

#[cfg(target_os = "macos")]
const ENTRY_FILE: &str = "com.cronkite.gateway.plist";
#[cfg(not(target_os = "macos"))]
const ENTRY_FILE: &str = "cronkite.desktop";

/// Register or remove the login entry. Returns the new state.
pub fn set_auto_start(enabled: bool) -> Result<bool, AutostartError> {
    let dir = platform_dir().ok_or(AutostartError::Unsupported)?;
    if enabled {
        let exe = std::env::current_exe()?;
        install(&dir, &exe)?;
        info!(entry = %entry_path(&dir).display(), "autostart enabled");
    } else {
        remove(&dir)?;
        info!(entry = %entry_path(&dir).display(), "autostart disabled");
    }
    Ok(enabled)
}

/// True when a login entry exists.
pub fn is_auto_start_enabled() -> Result<bool, AutostartError> {
    let dir = platform_dir().ok_or(AutostartError::Unsupported)?;
    Ok(entry_path(&dir).exists())
}

#[cfg(target_os = "linux")]
fn platform_dir() -> Option<PathBuf> {
    match std::env::var("XDG_CONFIG_HOME") {
        Ok(xdg) if !xdg.is_empty() => Some(PathBuf::from(xdg).join("autostart")),
        _ => std::env::var("HOME")
            .ok()
            .map(|home| PathBuf::from(home).join(".config").join("autostart")),
    }
}

#[cfg(target_os = "macos")]
fn platform_dir() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|home| PathBuf::from(home).join("Library").join("LaunchAgents"))
}

#[cfg(not(any(target_os = "linux", target_os = "macos")))]
fn platform_dir() -> Option<PathBuf> {
    None
}

fn entry_path(dir: &Path) -> PathBuf {
    dir.join(ENTRY_FILE)
}

fn install(dir: &Path, exe: &Path) -> io::Result<()> {
    std::fs::create_dir_all(dir)?;
    std::fs::write(entry_path(dir), entry_content(exe))
}

/// Removing an entry that was never installed is not an error.
fn remove(dir: &Path) -> io::Result<()> {
    match std::fs::remove_file(entry_path(dir)) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e),
    }
}

#[cfg(not(target_os = "macos"))]
fn entry_content(exe: &Path) -> String {
    format!(
        "[Desktop Entry]\n\
         Type=Application\n\
         Name=Cronkite\n\
         Comment=Cron job scheduler daemon\n\
         Exec=\"{}\" --hidden\n\
         X-GNOME-Autostart-enabled=true\n",
        exe.display()
    )
}

#[cfg(target_os = "macos")]
fn entry_content(exe: &Path) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE plist PUBLIC "-//Apple//DTD PLIST 1.0//EN" "http://www.apple.com/DTDs/PropertyList-1.0.dtd">
<plist version="1.0">
<dict>
    <key>Label</key>
    <string>com.cronkite.gateway</string>
    <key>ProgramArguments</key>
    <array>
        <string>{}</string>
        <string>--hidden</string>
    </array>
    <key>RunAtLoad</key>
    <true/>
</dict>
</plist>
"#,
        exe.display()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn install_then_remove_round_trip() {
        let dir = TempDir::new().unwrap();
        let exe = Path::new("/opt/cronkite/cronkite-gateway");

        assert!(!entry_path(dir.path()).exists());
        install(dir.path(), exe).unwrap();
        assert!(entry_path(dir.path()).exists());

        remove(dir.path()).unwrap();
        assert!(!entry_path(dir.path()).exists());
    }

    #[test]
    fn remove_when_absent_is_ok() {
        let dir = TempDir::new().unwrap();
        remove(dir.path()).unwrap();
    }

    #[test]
    fn entry_launches_hidden() {
        let content = entry_content(Path::new("/opt/cronkite/cronkite-gateway"));
        assert!(content.contains("/opt/cronkite/cronkite-gateway"));
        assert!(content.contains("--hidden"));
    }

    #[test]
    fn install_creates_missing_directory() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("autostart");
        install(&nested, Path::new("/bin/true")).unwrap();
        assert!(entry_path(&nested).exists());
    }
}
