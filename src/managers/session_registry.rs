use std::collections::HashMap;

use crate::types::events::TransferHandle;

/// Bidirectional index between download ids and their live transfer
/// handles. A download has at most one live handle; binding a new one
/// drops the old association in both directions.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    by_download: HashMap<String, TransferHandle>,
    by_handle: HashMap<TransferHandle, String>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Associates `handle` with `download_id`, returning the handle it replaced.
    pub fn bind(&mut self, download_id: &str, handle: TransferHandle) -> Option<TransferHandle> {
        if let Some(previous_owner) = self.by_handle.insert(handle, download_id.to_string()) {
            if previous_owner != download_id {
                self.by_download.remove(&previous_owner);
            }
        }
        let replaced = self.by_download.insert(download_id.to_string(), handle);
        if let Some(old) = replaced.filter(|old| *old != handle) {
            self.by_handle.remove(&old);
            return Some(old);
        }
        None
    }

    /// Removes the live handle of a download, if any.
    pub fn detach(&mut self, download_id: &str) -> Option<TransferHandle> {
        let handle = self.by_download.remove(download_id)?;
        self.by_handle.remove(&handle);
        Some(handle)
    }

    pub fn handle_for(&self, download_id: &str) -> Option<TransferHandle> {
        self.by_download.get(download_id).copied()
    }

    /// Reverse lookup used when the engine reports on a handle.
    pub fn download_for(&self, handle: TransferHandle) -> Option<&str> {
        self.by_handle.get(&handle).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.by_download.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_download.is_empty()
    }
}
