//! Download Manager for DriveDesk.
//!
//! Owns the visible download list, starts and stops transfers through the
//! transfer engine, and folds engine progress back into each item.
//! Downloads live only in memory; finished files are found by name in the
//! downloads folder.

use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::Path;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use uuid::Uuid;

use super::session_registry::SessionRegistry;
use crate::engine::TransferEngine;
use crate::platform::HostEnvironment;
use crate::types::download::{DownloadItem, DownloadStatus};
use crate::types::errors::DownloadError;
use crate::types::events::TransferHandle;

const FALLBACK_FILE_NAME: &str = "download";

/// Trait defining download management operations.
pub trait DownloadManagerTrait {
    fn start_download(&mut self, url: &str, file_name: &str) -> String;
    fn pause_download(&mut self, id: &str) -> Result<(), DownloadError>;
    fn resume_download(&mut self, id: &str) -> Result<(), DownloadError>;
    fn cancel_download(&mut self, id: &str) -> Result<(), DownloadError>;
    fn open_destination(&self, id: &str) -> Result<bool, DownloadError>;
    fn reveal_destination(&self, id: &str) -> Result<bool, DownloadError>;
    fn clear_finished(&mut self) -> usize;
    fn list_downloads(&self) -> &[DownloadItem];
    fn get_download(&self, id: &str) -> Option<&DownloadItem>;
}

pub struct DownloadManager {
    engine: Arc<dyn TransferEngine>,
    host: Arc<dyn HostEnvironment>,
    registry: SessionRegistry,
    downloads: Vec<DownloadItem>,
    /// Row of each download in `downloads`, rebuilt whenever rows move.
    rows: HashMap<String, usize>,
    panel_open: bool,
}

impl DownloadManager {
    pub fn new(engine: Arc<dyn TransferEngine>, host: Arc<dyn HostEnvironment>) -> Self {
        Self {
            engine,
            host,
            registry: SessionRegistry::new(),
            downloads: Vec::new(),
            rows: HashMap::new(),
            panel_open: false,
        }
    }

    fn now_ts() -> i64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs() as i64
    }

    fn find_index(&self, id: &str) -> Result<usize, DownloadError> {
        self.rows
            .get(id)
            .copied()
            .ok_or_else(|| DownloadError::NotFound(id.to_string()))
    }

    /// Resolves an engine handle to the index of its download. Handles that
    /// were detached (paused, cancelled, finished) resolve to `None`.
    fn index_for_handle(&self, handle: TransferHandle) -> Option<usize> {
        let id = self.registry.download_for(handle)?;
        self.rows.get(id).copied()
    }

    fn reindex(&mut self) {
        self.rows = self
            .downloads
            .iter()
            .enumerate()
            .map(|(row, d)| (d.id.clone(), row))
            .collect();
    }

    fn invalid(id: &str, action: &'static str, status: DownloadStatus) -> DownloadError {
        DownloadError::InvalidTransition {
            id: id.to_string(),
            action,
            status: status.as_str(),
        }
    }

    pub fn is_panel_open(&self) -> bool {
        self.panel_open
    }

    pub fn set_panel_open(&mut self, open: bool) {
        self.panel_open = open;
    }

    pub fn toggle_panel(&mut self) -> bool {
        self.panel_open = !self.panel_open;
        self.panel_open
    }

    /// Downloads that currently own a live transfer.
    pub fn active_count(&self) -> usize {
        self.registry.len()
    }

    pub fn on_progress(
        &mut self,
        handle: TransferHandle,
        bytes_written: u64,
        total_bytes_written: u64,
        total_bytes_expected: u64,
    ) {
        let Some(idx) = self.index_for_handle(handle) else {
            tracing::debug!(%handle, "progress for unknown transfer dropped");
            return;
        };
        let item = &mut self.downloads[idx];
        if item.status != DownloadStatus::Downloading {
            return;
        }

        if total_bytes_expected > 0 {
            item.file_size = total_bytes_expected;
            item.downloaded_size = total_bytes_written.min(total_bytes_expected);
            let ratio = total_bytes_written as f64 / total_bytes_expected as f64;
            item.progress = ratio.clamp(0.0, 1.0);
        } else {
            item.downloaded_size = total_bytes_written;
        }

        item.speed = format!("{}/s", format_bytes(bytes_written));
        if bytes_written > 0 && total_bytes_expected > 0 {
            let remaining = total_bytes_expected.saturating_sub(total_bytes_written);
            item.time_remaining = format_time(remaining as f64 / bytes_written as f64);
        }
    }

    /// Moves the finished payload into the downloads folder, replacing any
    /// file of the same name. File-system errors are logged and otherwise
    /// ignored; the item is marked completed either way.
    pub fn on_completed(&mut self, handle: TransferHandle, temp_path: &Path) {
        let Some(idx) = self.index_for_handle(handle) else {
            // Paused or cancelled while the payload was being handed over.
            tracing::debug!(%handle, "completion for unknown transfer dropped");
            if let Err(e) = self.host.remove_file(temp_path) {
                if e.kind() != ErrorKind::NotFound {
                    tracing::warn!(path = %temp_path.display(), error = %e, "could not discard orphaned payload");
                }
            }
            return;
        };
        let id = self.downloads[idx].id.clone();
        self.registry.detach(&id);

        let destination = self.host.downloads_dir().join(&self.downloads[idx].file_name);
        match self.host.remove_file(&destination) {
            Err(e) if e.kind() != ErrorKind::NotFound => {
                tracing::warn!(path = %destination.display(), error = %e, "could not replace existing file");
            }
            _ => {}
        }
        if let Err(e) = self.host.move_file(temp_path, &destination) {
            tracing::warn!(
                from = %temp_path.display(),
                to = %destination.display(),
                error = %e,
                "could not move finished download"
            );
        }

        let item = &mut self.downloads[idx];
        item.status = DownloadStatus::Completed;
        item.progress = 1.0;
        if item.file_size > 0 {
            item.downloaded_size = item.file_size;
        }
        item.destination = Some(destination);
        tracing::info!(download = %item.id, file = %item.file_name, "download completed");
    }

    pub fn on_failed(&mut self, handle: TransferHandle, reason: &str) {
        let Some(idx) = self.index_for_handle(handle) else {
            tracing::debug!(%handle, "failure for unknown transfer dropped");
            return;
        };
        let id = self.downloads[idx].id.clone();
        self.registry.detach(&id);
        self.downloads[idx].status = DownloadStatus::Failed;
        tracing::info!(download = %id, reason, "download failed");
    }
}

impl DownloadManagerTrait for DownloadManager {
    /// Adds the download at the top of the list, opens the panel and asks
    /// the engine for a transfer. Returns the new download's ID.
    fn start_download(&mut self, url: &str, file_name: &str) -> String {
        let id = Uuid::new_v4().to_string();
        let item = DownloadItem::new(id.clone(), url, sanitize_file_name(file_name), Self::now_ts());
        tracing::info!(download = %id, url, file = %item.file_name, "download started");

        self.downloads.insert(0, item);
        self.reindex();
        self.panel_open = true;

        let handle = self.engine.request_transfer(url);
        self.registry.bind(&id, handle);
        id
    }

    fn pause_download(&mut self, id: &str) -> Result<(), DownloadError> {
        let idx = self.find_index(id)?;
        let status = self.downloads[idx].status;
        if status != DownloadStatus::Downloading {
            return Err(Self::invalid(id, "pause", status));
        }
        if let Some(handle) = self.registry.detach(id) {
            self.engine.cancel(handle);
        }
        self.downloads[idx].status = DownloadStatus::Paused;
        Ok(())
    }

    /// Starts a fresh transfer for the same URL. The new transfer begins at
    /// byte zero, so the item's counters are reset.
    fn resume_download(&mut self, id: &str) -> Result<(), DownloadError> {
        let idx = self.find_index(id)?;
        let status = self.downloads[idx].status;
        if status != DownloadStatus::Paused {
            return Err(Self::invalid(id, "resume", status));
        }
        let handle = self.engine.request_transfer(&self.downloads[idx].url);
        if let Some(stale) = self.registry.bind(id, handle) {
            self.engine.cancel(stale);
        }
        let item = &mut self.downloads[idx];
        item.reset_progress();
        item.status = DownloadStatus::Downloading;
        Ok(())
    }

    fn cancel_download(&mut self, id: &str) -> Result<(), DownloadError> {
        let idx = self.find_index(id)?;
        if let Some(handle) = self.registry.detach(id) {
            self.engine.cancel(handle);
        }
        self.downloads.remove(idx);
        self.reindex();
        Ok(())
    }

    /// Returns `Ok(false)` when the download has no destination yet.
    fn open_destination(&self, id: &str) -> Result<bool, DownloadError> {
        let idx = self.find_index(id)?;
        let Some(destination) = &self.downloads[idx].destination else {
            return Ok(false);
        };
        if let Err(e) = self.host.open_path(destination) {
            tracing::warn!(path = %destination.display(), error = %e, "could not open download");
        }
        Ok(true)
    }

    fn reveal_destination(&self, id: &str) -> Result<bool, DownloadError> {
        let idx = self.find_index(id)?;
        let Some(destination) = &self.downloads[idx].destination else {
            return Ok(false);
        };
        if let Err(e) = self.host.reveal_path(destination) {
            tracing::warn!(path = %destination.display(), error = %e, "could not reveal download");
        }
        Ok(true)
    }

    /// Drops completed and failed items from the list. Returns how many were removed.
    fn clear_finished(&mut self) -> usize {
        let before = self.downloads.len();
        self.downloads.retain(|d| !d.status.is_finished());
        self.reindex();
        before - self.downloads.len()
    }

    fn list_downloads(&self) -> &[DownloadItem] {
        &self.downloads
    }

    fn get_download(&self, id: &str) -> Option<&DownloadItem> {
        self.rows.get(id).map(|&row| &self.downloads[row])
    }
}

/// Keeps only the final path component so a server-supplied name cannot
/// point outside the downloads folder.
fn sanitize_file_name(file_name: &str) -> String {
    let name = file_name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(file_name)
        .trim();
    if name.is_empty() || name == "." || name == ".." {
        FALLBACK_FILE_NAME.to_string()
    } else {
        name.to_string()
    }
}

/// Decimal byte count, the way desktop file managers show sizes.
pub fn format_bytes(bytes: u64) -> String {
    const KB: f64 = 1_000.0;
    const MB: f64 = KB * 1_000.0;
    const GB: f64 = MB * 1_000.0;
    let b = bytes as f64;
    if bytes == 0 {
        "Zero KB".to_string()
    } else if b < KB {
        format!("{} bytes", bytes)
    } else if b < MB {
        format!("{:.0} KB", b / KB)
    } else if b < GB {
        format!("{:.1} MB", b / MB)
    } else {
        format!("{:.2} GB", b / GB)
    }
}

/// Banded remaining-time label: seconds under a minute, minutes under an
/// hour, hours beyond.
pub fn format_time(seconds: f64) -> String {
    if seconds < 60.0 {
        format!("{} sec", seconds as u64)
    } else if seconds < 3600.0 {
        format!("{} min", (seconds / 60.0) as u64)
    } else {
        format!("{} hr", (seconds / 3600.0) as u64)
    }
}
