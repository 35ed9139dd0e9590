use serde::Serialize;

use super::download::DownloadItem;
use super::tab::Tab;

/// Read-only view of the shell state handed to the presentation layer.
#[derive(Debug, Clone, Serialize)]
pub struct ShellSnapshot {
    pub tabs: Vec<Tab>,
    pub selected_tab_id: Option<String>,
    pub home_loaded: bool,
    pub error: Option<ErrorView>,
    pub downloads: Vec<DownloadItem>,
    pub download_panel_open: bool,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ErrorView {
    pub title: String,
    pub message: String,
}
