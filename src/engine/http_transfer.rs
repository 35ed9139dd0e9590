//! HTTP transfer engine.
//!
//! Each transfer is one tokio task that streams the response body into a
//! staging file and reports every chunk as a `DownloadProgress` event.
//! Finished payloads are left in the staging directory for the download
//! controller to move; failed or cancelled ones are deleted.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use futures_util::StreamExt;
use reqwest::Client;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tokio::runtime::Handle;
use tokio::task::AbortHandle;

use super::{EventSink, TransferEngine};
use crate::types::errors::TransferError;
use crate::types::events::{EngineEvent, TransferHandle};

type TaskTable = Arc<Mutex<HashMap<TransferHandle, AbortHandle>>>;

pub struct HttpTransferEngine {
    client: Client,
    runtime: Handle,
    sink: Arc<dyn EventSink>,
    staging_dir: PathBuf,
    next_handle: AtomicU64,
    tasks: TaskTable,
}

impl HttpTransferEngine {
    pub fn new(
        user_agent: &str,
        runtime: Handle,
        sink: Arc<dyn EventSink>,
        staging_dir: PathBuf,
    ) -> Result<Self, TransferError> {
        let client = Client::builder().user_agent(user_agent).build()?;
        Ok(Self {
            client,
            runtime,
            sink,
            staging_dir,
            next_handle: AtomicU64::new(1),
            tasks: Arc::new(Mutex::new(HashMap::new())),
        })
    }

    fn staging_path(&self, handle: TransferHandle) -> PathBuf {
        self.staging_dir
            .join(format!("drivedesk-{}-{}.part", std::process::id(), handle.0))
    }

    /// Number of transfers whose task has not finished yet.
    pub fn active_transfers(&self) -> usize {
        self.tasks.lock().map(|t| t.len()).unwrap_or(0)
    }
}

impl TransferEngine for HttpTransferEngine {
    fn request_transfer(&self, url: &str) -> TransferHandle {
        let handle = TransferHandle(self.next_handle.fetch_add(1, Ordering::Relaxed));
        let client = self.client.clone();
        let sink = self.sink.clone();
        let tasks = self.tasks.clone();
        let url = url.to_string();
        let temp_path = self.staging_path(handle);

        // Hold the table lock across spawn so the task cannot remove its
        // entry before it has been inserted.
        let mut table = match self.tasks.lock() {
            Ok(table) => table,
            Err(poisoned) => poisoned.into_inner(),
        };
        let task = self.runtime.spawn(async move {
            let event = match stream_to_file(&client, &url, &temp_path, handle, sink.as_ref()).await {
                Ok(()) => {
                    tracing::info!(%handle, path = %temp_path.display(), "transfer finished");
                    EngineEvent::DownloadCompleted { handle, temp_path }
                }
                Err(e) => {
                    tracing::warn!(%handle, error = %e, "transfer failed");
                    let _ = tokio::fs::remove_file(&temp_path).await;
                    EngineEvent::DownloadFailed {
                        handle,
                        reason: e.to_string(),
                    }
                }
            };
            if let Ok(mut table) = tasks.lock() {
                table.remove(&handle);
            }
            sink.emit(event);
        });
        table.insert(handle, task.abort_handle());
        tracing::debug!(%handle, "transfer requested");
        handle
    }

    /// Aborts the task if it is still running. The staging file is removed
    /// either way, since a finished transfer may not have been collected yet.
    fn cancel(&self, handle: TransferHandle) {
        let task = self.tasks.lock().ok().and_then(|mut t| t.remove(&handle));
        if let Some(task) = task {
            task.abort();
            tracing::debug!(%handle, "transfer cancelled");
        }
        let temp_path = self.staging_path(handle);
        self.runtime.spawn(async move {
            let _ = tokio::fs::remove_file(temp_path).await;
        });
    }
}

async fn stream_to_file(
    client: &Client,
    url: &str,
    temp_path: &Path,
    handle: TransferHandle,
    sink: &dyn EventSink,
) -> Result<(), TransferError> {
    let response = client.get(url).send().await?;
    if !response.status().is_success() {
        return Err(TransferError::Status(response.status().as_u16()));
    }
    let expected = response.content_length().unwrap_or(0);

    if let Some(parent) = temp_path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    let mut file = File::create(temp_path).await?;
    let mut written: u64 = 0;
    let mut stream = response.bytes_stream();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        file.write_all(&chunk).await?;
        written += chunk.len() as u64;
        sink.emit(EngineEvent::DownloadProgress {
            handle,
            bytes_written: chunk.len() as u64,
            total_bytes_written: written,
            total_bytes_expected: expected,
        });
    }
    file.flush().await?;
    Ok(())
}
