// DriveDesk platform abstraction
// Provides platform-specific paths and the host hooks used to finalize,
// open and reveal downloaded files. Opening goes through the desktop's
// default handler via the `open` crate.
//
// Uses `cfg(target_os)` for conditional compilation to select the correct
// platform-specific implementation at compile time.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

#[cfg(target_os = "linux")]
mod linux;

#[cfg(target_os = "macos")]
mod macos;

#[cfg(target_os = "windows")]
mod windows;

#[cfg(target_os = "linux")]
use linux as imp;
#[cfg(target_os = "macos")]
use macos as imp;
#[cfg(target_os = "windows")]
use windows as imp;

/// Returns the platform-specific configuration directory for DriveDesk.
///
/// - **Linux**: `~/.config/drivedesk` (or `$XDG_CONFIG_HOME/drivedesk`)
/// - **macOS**: `~/Library/Application Support/DriveDesk`
/// - **Windows**: `%APPDATA%/DriveDesk`
pub fn get_config_dir() -> PathBuf {
    imp::get_config_dir()
}

/// Returns the user's canonical downloads folder.
pub fn get_downloads_dir() -> PathBuf {
    imp::get_downloads_dir()
}

/// File-system and desktop hooks the download controller relies on.
pub trait HostEnvironment: Send + Sync {
    fn downloads_dir(&self) -> PathBuf;
    fn remove_file(&self, path: &Path) -> io::Result<()>;
    fn move_file(&self, from: &Path, to: &Path) -> io::Result<()>;
    fn open_path(&self, path: &Path) -> io::Result<()>;
    fn reveal_path(&self, path: &Path) -> io::Result<()>;
}

/// Host hooks backed by the real file system and desktop environment.
pub struct SystemHost {
    downloads_dir: PathBuf,
}

impl SystemHost {
    /// `downloads_override` replaces the platform downloads folder when set.
    pub fn new(downloads_override: Option<PathBuf>) -> Self {
        Self {
            downloads_dir: downloads_override.unwrap_or_else(get_downloads_dir),
        }
    }
}

impl HostEnvironment for SystemHost {
    fn downloads_dir(&self) -> PathBuf {
        self.downloads_dir.clone()
    }

    fn remove_file(&self, path: &Path) -> io::Result<()> {
        fs::remove_file(path)
    }

    /// Renames when possible and falls back to copy + delete when the
    /// staging file lives on another volume.
    fn move_file(&self, from: &Path, to: &Path) -> io::Result<()> {
        if let Some(parent) = to.parent() {
            fs::create_dir_all(parent)?;
        }
        match fs::rename(from, to) {
            Ok(()) => Ok(()),
            Err(_) => {
                fs::copy(from, to)?;
                fs::remove_file(from)
            }
        }
    }

    fn open_path(&self, path: &Path) -> io::Result<()> {
        open::that(path)
    }

    fn reveal_path(&self, path: &Path) -> io::Result<()> {
        open::that(reveal_target(path))
    }
}

/// The folder shown when revealing a file: its parent, or the path itself
/// when it has none.
pub fn reveal_target(path: &Path) -> &Path {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => path,
    }
}
