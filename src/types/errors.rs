use serde::{Deserialize, Serialize};
use thiserror::Error;

// === TabError ===

/// Errors related to tab management operations.
#[derive(Debug, Error)]
pub enum TabError {
    /// Tab with the given ID was not found.
    #[error("Tab not found: {0}")]
    NotFound(String),
}

// === DownloadError ===

/// Errors related to download lifecycle operations.
#[derive(Debug, Error)]
pub enum DownloadError {
    /// Download with the given ID was not found.
    #[error("Download not found: {0}")]
    NotFound(String),
    /// The requested lifecycle change is not allowed from the current status.
    #[error("Cannot {action} download {id} while {status}")]
    InvalidTransition {
        id: String,
        action: &'static str,
        status: &'static str,
    },
}

// === TransferError ===

/// Errors raised inside a transfer task. These never reach the caller
/// directly; the engine turns them into a `DownloadFailed` event.
#[derive(Debug, Error)]
pub enum TransferError {
    #[error("Transfer request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("Server responded with status {0}")]
    Status(u16),
    #[error("Transfer I/O error: {0}")]
    Io(#[from] std::io::Error),
}

// === SettingsError ===

/// Errors related to loading shell settings.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// An I/O error occurred while reading settings.
    #[error("Settings I/O error: {0}")]
    IoError(String),
    /// Failed to deserialize settings.
    #[error("Settings serialization error: {0}")]
    SerializationError(String),
}

// === NavigationError ===

/// Classification of a failed or stalled navigation, surfaced to the
/// presentation layer as the session's current error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum NavigationError {
    #[error("no internet connection")]
    NoConnectivity,
    #[error("server error")]
    ServerError,
    #[error("request timed out")]
    Timeout,
    #[error("{0}")]
    Unknown(String),
}

impl NavigationError {
    /// Short heading for the error overlay.
    pub fn title(&self) -> &'static str {
        match self {
            NavigationError::NoConnectivity => "No Internet Connection",
            NavigationError::ServerError => "Server Error",
            NavigationError::Timeout => "Request Timeout",
            NavigationError::Unknown(_) => "Something Went Wrong",
        }
    }

    /// Body text for the error overlay. `Unknown` shows the engine's detail.
    pub fn message(&self) -> String {
        match self {
            NavigationError::NoConnectivity => {
                "Please check your internet connection and try again.".to_string()
            }
            NavigationError::ServerError => {
                "The server is not responding. Please try again later.".to_string()
            }
            NavigationError::Timeout => "The request took too long. Please try again.".to_string(),
            NavigationError::Unknown(detail) => detail.clone(),
        }
    }
}
