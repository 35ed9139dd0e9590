use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::navigation::FailureCode;

/// Opaque id of one in-flight transfer inside the transfer engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TransferHandle(pub u64);

impl fmt::Display for TransferHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "transfer-{}", self.0)
    }
}

/// Everything the rendering engine, the transfer engine and the watchdog
/// timers report back to the shell. Producers may live on any thread; the
/// events are applied one at a time by `App::handle_event`.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    NavigationStarted {
        tab_id: String,
        url: Option<String>,
    },
    NavigationFinished {
        tab_id: String,
        url: Option<String>,
        title: Option<String>,
    },
    /// `provisional` is true when the failure happened before any content loaded.
    NavigationFailed {
        tab_id: String,
        code: FailureCode,
        provisional: bool,
    },
    NavigationTimedOut {
        tab_id: String,
        generation: u64,
    },
    NewWindowRequested {
        url: String,
    },
    DownloadProgress {
        handle: TransferHandle,
        bytes_written: u64,
        total_bytes_written: u64,
        /// 0 when the server did not announce a length.
        total_bytes_expected: u64,
    },
    DownloadCompleted {
        handle: TransferHandle,
        temp_path: PathBuf,
    },
    DownloadFailed {
        handle: TransferHandle,
        reason: String,
    },
}

/// Work the shell asks the rendering engine to do after applying an event
/// or a user operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    LoadUrl { tab_id: String, url: String },
}
