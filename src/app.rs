//! App Core for DriveDesk.
//!
//! `App` is the one place the shell's collaborators are wired together and
//! the only owner of observable state. Whoever owns it (the window event
//! loop, or a channel loop when headless) applies every event through
//! `handle_event`, so tab and download state is only ever touched from that
//! single context.

use std::sync::Arc;

use reqwest::Url;
use tokio::runtime::Handle;

use crate::engine::http_transfer::HttpTransferEngine;
use crate::engine::scheduler::{Scheduler, TokioScheduler};
use crate::engine::{EventSink, TransferEngine};
use crate::managers::download_manager::{DownloadManager, DownloadManagerTrait};
use crate::managers::navigation_controller::NavigationController;
use crate::managers::tab_manager::TabManagerTrait;
use crate::platform::{HostEnvironment, SystemHost};
use crate::types::errors::TransferError;
use crate::types::events::{EngineEvent, ShellCommand};
use crate::types::ipc::UiCommand;
use crate::types::navigation::{ResponseDecision, ResponseInfo};
use crate::types::settings::ShellSettings;
use crate::types::snapshot::{ErrorView, ShellSnapshot};
use crate::types::tab::TabUpdate;

pub struct App {
    pub settings: ShellSettings,
    pub navigation: NavigationController,
    pub downloads: DownloadManager,
    /// Tab whose page the webview was last told to load. Page-load
    /// callbacks carry no tab, so they belong to this one.
    displayed_tab: Option<String>,
}

impl App {
    pub fn new(
        settings: ShellSettings,
        engine: Arc<dyn TransferEngine>,
        host: Arc<dyn HostEnvironment>,
        scheduler: Arc<dyn Scheduler>,
    ) -> Self {
        let navigation = NavigationController::new(&settings, scheduler);
        let downloads = DownloadManager::new(engine, host);
        Self {
            settings,
            navigation,
            downloads,
            displayed_tab: None,
        }
    }

    /// Wires the production collaborators: HTTP transfers and watchdog
    /// timers on `runtime`, reporting to `sink`, and the system host.
    pub fn with_system(
        settings: ShellSettings,
        runtime: Handle,
        sink: Arc<dyn EventSink>,
    ) -> Result<Self, TransferError> {
        let engine = HttpTransferEngine::new(
            &settings.user_agent,
            runtime.clone(),
            sink.clone(),
            std::env::temp_dir(),
        )?;
        let host = SystemHost::new(settings.downloads_dir.clone());
        let scheduler = TokioScheduler::new(runtime, sink);
        Ok(Self::new(
            settings,
            Arc::new(engine),
            Arc::new(host),
            Arc::new(scheduler),
        ))
    }

    /// The first command of a session: load the home tab.
    pub fn initial_command(&self) -> ShellCommand {
        let tabs = self.navigation.tabs();
        let home = tabs
            .get_tab(tabs.home_tab_id())
            .map(|t| t.url.clone())
            .unwrap_or_else(|| self.settings.home_url.clone());
        ShellCommand::LoadUrl {
            tab_id: tabs.home_tab_id().to_string(),
            url: home,
        }
    }

    /// Applies one engine event. Events for tabs or transfers that no
    /// longer exist are dropped.
    pub fn handle_event(&mut self, event: EngineEvent) -> Option<ShellCommand> {
        let result = match event {
            EngineEvent::NavigationStarted { tab_id, url } => {
                self.navigation.on_navigation_started(&tab_id, url.as_deref())
            }
            EngineEvent::NavigationFinished { tab_id, url, title } => self
                .navigation
                .on_navigation_finished(&tab_id, url.as_deref(), title.as_deref()),
            EngineEvent::NavigationFailed {
                tab_id,
                code,
                provisional,
            } => self
                .navigation
                .on_navigation_failed(&tab_id, &code, provisional),
            EngineEvent::NavigationTimedOut { tab_id, generation } => {
                self.navigation.on_watchdog_fired(&tab_id, generation);
                Ok(())
            }
            EngineEvent::NewWindowRequested { url } => {
                return Some(self.navigation.on_new_window_requested(&url));
            }
            EngineEvent::DownloadProgress {
                handle,
                bytes_written,
                total_bytes_written,
                total_bytes_expected,
            } => {
                self.downloads.on_progress(
                    handle,
                    bytes_written,
                    total_bytes_written,
                    total_bytes_expected,
                );
                Ok(())
            }
            EngineEvent::DownloadCompleted { handle, temp_path } => {
                self.downloads.on_completed(handle, &temp_path);
                Ok(())
            }
            EngineEvent::DownloadFailed { handle, reason } => {
                self.downloads.on_failed(handle, &reason);
                Ok(())
            }
        };
        if let Err(e) = result {
            tracing::debug!(error = %e, "navigation event for closed tab dropped");
        }
        None
    }

    pub fn displayed_tab_id(&self) -> Option<&str> {
        self.displayed_tab.as_deref()
    }

    /// Records that the webview is about to load `command`. A navigation
    /// still pending on the previously displayed tab will never report
    /// back, so it is settled here.
    pub fn begin_load(&mut self, command: &ShellCommand) {
        let ShellCommand::LoadUrl { tab_id, .. } = command;
        if let Some(previous) = self.displayed_tab.replace(tab_id.clone()) {
            if previous != *tab_id {
                let _ = self.navigation.abandon_navigation(&previous);
            }
        }
    }

    /// Applies a page-load callback to the displayed tab.
    pub fn handle_page_load(&mut self, finished: bool, url: &str) {
        let Some(tab_id) = self.displayed_tab.clone() else {
            tracing::debug!(%url, "page load before any tab was displayed");
            return;
        };
        let url = Some(url.to_string());
        let event = if finished {
            EngineEvent::NavigationFinished {
                tab_id,
                url,
                title: None,
            }
        } else {
            EngineEvent::NavigationStarted { tab_id, url }
        };
        self.handle_event(event);
    }

    /// Load command for the selected tab, used after tab switches.
    pub fn selected_load_command(&self) -> Option<ShellCommand> {
        self.navigation.selected_tab().map(|tab| ShellCommand::LoadUrl {
            tab_id: tab.id.clone(),
            url: tab.url.clone(),
        })
    }

    /// Whether a page at `origin` may drive downloads. Accepts the home
    /// host and its sibling hosts under the same parent domain, over the
    /// home URL's scheme.
    pub fn is_trusted_origin(&self, origin: &str) -> bool {
        let (Ok(home), Ok(page)) = (Url::parse(&self.settings.home_url), Url::parse(origin)) else {
            return false;
        };
        let (Some(home_host), Some(host)) = (home.host_str(), page.host_str()) else {
            return false;
        };
        if home.scheme() != page.scheme() {
            return false;
        }
        if host.eq_ignore_ascii_case(home_host) {
            return true;
        }
        match home_host.split_once('.') {
            Some((_, parent)) if parent.contains('.') => {
                let host = host.to_ascii_lowercase();
                host.ends_with(&format!(".{}", parent.to_ascii_lowercase()))
            }
            _ => false,
        }
    }

    /// Applies a command posted by the shell UI from the page at `origin`.
    /// Returns a load command when the webview has to show another tab.
    pub fn handle_ui_command(&mut self, origin: &str, command: UiCommand) -> Option<ShellCommand> {
        if command.touches_downloads() && !self.is_trusted_origin(origin) {
            tracing::warn!(%origin, ?command, "download command from untrusted page refused");
            return None;
        }
        match command {
            UiCommand::UiReady => None,
            UiCommand::PageInfo { title, .. } => {
                let title = title.as_deref().map(str::trim).unwrap_or_default();
                if let (Some(tab_id), false) = (self.displayed_tab.as_deref(), title.is_empty()) {
                    let update = TabUpdate {
                        title: Some(title.to_string()),
                        ..TabUpdate::default()
                    };
                    let _ = self.navigation.update_tab(tab_id, update);
                }
                None
            }
            UiCommand::NewTab => {
                self.navigation.add_tab(None, None);
                self.selected_load_command()
            }
            UiCommand::CloseTab { id } => {
                let was_selected = self.navigation.selected_tab_id() == Some(id.as_str());
                match self.navigation.close_tab(&id) {
                    Ok(true) if was_selected => self.selected_load_command(),
                    _ => None,
                }
            }
            UiCommand::SelectTab { id } => {
                if self.navigation.selected_tab_id() == Some(id.as_str()) {
                    return None;
                }
                self.navigation
                    .select_tab(&id)
                    .ok()
                    .and_then(|_| self.selected_load_command())
            }
            UiCommand::Retry => self.navigation.retry(),
            UiCommand::ToggleDownloads => {
                self.downloads.toggle_panel();
                None
            }
            UiCommand::PauseDownload { id } => log_rejected(self.downloads.pause_download(&id)),
            UiCommand::ResumeDownload { id } => log_rejected(self.downloads.resume_download(&id)),
            UiCommand::CancelDownload { id } => log_rejected(self.downloads.cancel_download(&id)),
            UiCommand::OpenDownload { id } => log_rejected(self.downloads.open_destination(&id)),
            UiCommand::RevealDownload { id } => {
                log_rejected(self.downloads.reveal_destination(&id))
            }
            UiCommand::ClearDownloads => {
                self.downloads.clear_finished();
                None
            }
        }
    }

    /// Runs the response policy and, for downloads, starts the transfer.
    /// Returns the decision so the caller can cancel the engine navigation.
    pub fn handle_response(&mut self, tab_id: &str, info: &ResponseInfo) -> ResponseDecision {
        let decision = self.navigation.decide_response(tab_id, info);
        if let ResponseDecision::Download { url, file_name } = &decision {
            self.downloads.start_download(url, file_name);
        }
        decision
    }

    pub fn snapshot(&self) -> ShellSnapshot {
        ShellSnapshot {
            tabs: self.navigation.tabs().get_all_tabs().to_vec(),
            selected_tab_id: self.navigation.selected_tab_id().map(str::to_string),
            home_loaded: self.navigation.home_loaded(),
            error: self.navigation.current_error().map(|e| ErrorView {
                title: e.title().to_string(),
                message: e.message(),
            }),
            downloads: self.downloads.list_downloads().to_vec(),
            download_panel_open: self.downloads.is_panel_open(),
        }
    }
}

fn log_rejected<T, E: std::fmt::Display>(result: Result<T, E>) -> Option<ShellCommand> {
    if let Err(e) = result {
        tracing::debug!(error = %e, "download command rejected");
    }
    None
}
