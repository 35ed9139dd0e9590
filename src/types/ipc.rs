use serde::Deserialize;

/// Commands posted by the injected shell UI through `window.ipc`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "cmd", rename_all = "snake_case")]
pub enum UiCommand {
    UiReady,
    PageInfo {
        #[serde(default)]
        title: Option<String>,
        #[serde(default)]
        url: Option<String>,
    },
    NewTab,
    CloseTab { id: String },
    SelectTab { id: String },
    Retry,
    ToggleDownloads,
    PauseDownload { id: String },
    ResumeDownload { id: String },
    CancelDownload { id: String },
    OpenDownload { id: String },
    RevealDownload { id: String },
    ClearDownloads,
}

impl UiCommand {
    /// Commands that act on local files or transfers. These are only
    /// accepted from pages served by the home host.
    pub fn touches_downloads(&self) -> bool {
        matches!(
            self,
            UiCommand::PauseDownload { .. }
                | UiCommand::ResumeDownload { .. }
                | UiCommand::CancelDownload { .. }
                | UiCommand::OpenDownload { .. }
                | UiCommand::RevealDownload { .. }
                | UiCommand::ClearDownloads
        )
    }
}
