use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Status of a file download.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DownloadStatus {
    Downloading,
    Paused,
    Completed,
    Failed,
}

impl DownloadStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DownloadStatus::Downloading => "downloading",
            DownloadStatus::Paused => "paused",
            DownloadStatus::Completed => "completed",
            DownloadStatus::Failed => "failed",
        }
    }

    pub fn is_finished(&self) -> bool {
        matches!(self, DownloadStatus::Completed | DownloadStatus::Failed)
    }
}

pub const INITIAL_SPEED: &str = "0 KB/s";
pub const INITIAL_TIME_REMAINING: &str = "Calculating...";

/// Represents a file download with its progress and metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownloadItem {
    pub id: String,
    pub file_name: String,
    pub url: String,
    /// Total size in bytes; 0 until the server reports it.
    pub file_size: u64,
    pub downloaded_size: u64,
    pub progress: f64,
    pub status: DownloadStatus,
    pub speed: String,
    pub time_remaining: String,
    /// Local path of the finished file. Never sent to the page.
    #[serde(skip_serializing)]
    pub destination: Option<PathBuf>,
    pub started_at: i64,
}

impl DownloadItem {
    pub fn new(id: String, url: &str, file_name: String, started_at: i64) -> Self {
        Self {
            id,
            file_name,
            url: url.to_string(),
            file_size: 0,
            downloaded_size: 0,
            progress: 0.0,
            status: DownloadStatus::Downloading,
            speed: INITIAL_SPEED.to_string(),
            time_remaining: INITIAL_TIME_REMAINING.to_string(),
            destination: None,
            started_at,
        }
    }

    /// Clears byte counters and derived labels for a transfer that restarts
    /// from zero.
    pub(crate) fn reset_progress(&mut self) {
        self.downloaded_size = 0;
        self.progress = 0.0;
        self.speed = INITIAL_SPEED.to_string();
        self.time_remaining = INITIAL_TIME_REMAINING.to_string();
    }
}
