// DriveDesk platform hooks for Linux
// Config:    ~/.config/drivedesk
// Downloads: $XDG_DOWNLOAD_DIR or ~/Downloads

use std::env;
use std::path::PathBuf;

fn home_dir() -> PathBuf {
    PathBuf::from(env::var("HOME").unwrap_or_else(|_| String::from("/tmp")))
}

/// Returns the configuration directory for DriveDesk on Linux.
/// Uses `$XDG_CONFIG_HOME/drivedesk` if set, otherwise `~/.config/drivedesk`.
pub fn get_config_dir() -> PathBuf {
    if let Ok(xdg) = env::var("XDG_CONFIG_HOME") {
        PathBuf::from(xdg).join("drivedesk")
    } else {
        home_dir().join(".config").join("drivedesk")
    }
}

/// Returns the user's downloads folder.
/// Uses `$XDG_DOWNLOAD_DIR` if set, otherwise `~/Downloads`.
pub fn get_downloads_dir() -> PathBuf {
    match env::var("XDG_DOWNLOAD_DIR") {
        Ok(dir) if !dir.is_empty() => PathBuf::from(dir),
        _ => home_dir().join("Downloads"),
    }
}
