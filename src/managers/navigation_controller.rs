//! Navigation state machine for the tab set.
//!
//! Tracks each tab through `Idle -> Loading -> Loaded | Errored`, arms a
//! single-shot watchdog on every navigation start, classifies engine
//! failures, and applies the popup and response policies. The active error
//! shown to the user is always the error of the selected tab.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use super::response_policy;
use super::tab_manager::{TabManager, TabManagerTrait};
use crate::engine::scheduler::{Scheduler, TimerHandle};
use crate::types::errors::{NavigationError, TabError};
use crate::types::events::{EngineEvent, ShellCommand};
use crate::types::navigation::{
    FailureCode, NavigationAction, NavigationDecision, ResponseDecision, ResponseInfo,
};
use crate::types::settings::ShellSettings;
use crate::types::tab::{NavigationState, Tab, TabIcon, TabUpdate};

/// Maps an engine failure to the user-facing taxonomy. `Cancelled` yields
/// `None`: a superseded navigation is not an error.
pub fn classify_failure(code: &FailureCode) -> Option<NavigationError> {
    let err = match code {
        FailureCode::NotConnectedToInternet
        | FailureCode::NetworkConnectionLost
        | FailureCode::CannotFindHost => NavigationError::NoConnectivity,
        FailureCode::TimedOut => NavigationError::Timeout,
        FailureCode::BadServerResponse | FailureCode::CannotConnectToHost => {
            NavigationError::ServerError
        }
        FailureCode::HttpStatus(status) if (500..=599).contains(status) => {
            NavigationError::ServerError
        }
        FailureCode::HttpStatus(status) => NavigationError::Unknown(format!("HTTP {}", status)),
        FailureCode::Cancelled => return None,
        FailureCode::Other { message, code } => {
            if message.is_empty() {
                NavigationError::Unknown(format!("Navigation failed (code {})", code))
            } else {
                NavigationError::Unknown(message.clone())
            }
        }
    };
    Some(err)
}

struct Watchdog {
    generation: u64,
    timer: TimerHandle,
}

pub struct NavigationController {
    tabs: TabManager,
    home_loaded: bool,
    timeout: Duration,
    scheduler: Arc<dyn Scheduler>,
    watchdogs: HashMap<String, Watchdog>,
    next_generation: u64,
}

impl NavigationController {
    pub fn new(settings: &ShellSettings, scheduler: Arc<dyn Scheduler>) -> Self {
        Self {
            tabs: TabManager::new(&settings.home_url, &settings.home_title),
            home_loaded: false,
            timeout: settings.navigation_timeout(),
            scheduler,
            watchdogs: HashMap::new(),
            next_generation: 0,
        }
    }

    // ─── Observation ───

    pub fn tabs(&self) -> &TabManager {
        &self.tabs
    }

    pub fn selected_tab_id(&self) -> Option<&str> {
        self.tabs.selected_tab_id()
    }

    pub fn selected_tab(&self) -> Option<&Tab> {
        self.tabs.get_selected_tab()
    }

    pub fn home_loaded(&self) -> bool {
        self.home_loaded
    }

    /// The error of the selected tab, if it is in the errored state.
    pub fn current_error(&self) -> Option<&NavigationError> {
        self.tabs.get_selected_tab().and_then(Tab::error)
    }

    pub fn has_watchdog(&self, tab_id: &str) -> bool {
        self.watchdogs.contains_key(tab_id)
    }

    // ─── Tab operations ───

    pub fn add_tab(&mut self, url: Option<&str>, title: Option<&str>) -> String {
        self.tabs.add_tab(url, title)
    }

    pub fn close_tab(&mut self, tab_id: &str) -> Result<bool, TabError> {
        let closed = self.tabs.close_tab(tab_id)?;
        if closed {
            self.disarm(tab_id);
        }
        Ok(closed)
    }

    pub fn select_tab(&mut self, tab_id: &str) -> Result<(), TabError> {
        self.tabs.select_tab(tab_id)
    }

    pub fn update_tab(&mut self, tab_id: &str, update: TabUpdate) -> Result<(), TabError> {
        self.tabs.update_tab(tab_id, update)
    }

    /// Records the first successful load of the home tab. Returns `true`
    /// only for the call that flips the flag.
    pub fn mark_home_loaded(&mut self) -> bool {
        if self.home_loaded {
            return false;
        }
        self.home_loaded = true;
        tracing::info!("home tab loaded");
        true
    }

    // ─── Engine events ───

    pub fn on_navigation_started(&mut self, tab_id: &str, url: Option<&str>) -> Result<(), TabError> {
        let tab = self.tabs.get_tab_mut(tab_id)?;
        if let Some(url) = url {
            tab.url = url.to_string();
            tab.icon = TabIcon::for_url(Some(url));
        }
        tab.loading = true;
        tab.state = NavigationState::Loading;
        self.arm(tab_id);
        Ok(())
    }

    pub fn on_navigation_finished(
        &mut self,
        tab_id: &str,
        url: Option<&str>,
        title: Option<&str>,
    ) -> Result<(), TabError> {
        let tab = self.tabs.get_tab_mut(tab_id)?;
        if let Some(url) = url {
            tab.url = url.to_string();
            tab.icon = TabIcon::for_url(Some(url));
        }
        if let Some(title) = title.map(str::trim).filter(|t| !t.is_empty()) {
            tab.title = title.to_string();
        }
        tab.loading = false;
        tab.state = NavigationState::Loaded;
        let is_home = tab.is_home;

        self.disarm(tab_id);
        if is_home {
            self.mark_home_loaded();
        }
        Ok(())
    }

    pub fn on_navigation_failed(
        &mut self,
        tab_id: &str,
        code: &FailureCode,
        provisional: bool,
    ) -> Result<(), TabError> {
        let tab = self.tabs.get_tab_mut(tab_id)?;
        let Some(err) = classify_failure(code) else {
            tracing::debug!(tab = tab_id, "navigation cancelled by engine");
            return Ok(());
        };
        tracing::info!(tab = tab_id, provisional, error = %err, "navigation failed");
        tab.loading = false;
        tab.state = NavigationState::Errored(err);
        self.disarm(tab_id);
        Ok(())
    }

    /// Applies a watchdog firing. Stale generations (the navigation was
    /// re-armed or settled after the timer was queued) are ignored.
    pub fn on_watchdog_fired(&mut self, tab_id: &str, generation: u64) {
        let armed = self.watchdogs.get(tab_id).map(|w| w.generation);
        if armed != Some(generation) {
            tracing::debug!(tab = tab_id, generation, "stale watchdog ignored");
            return;
        }
        self.watchdogs.remove(tab_id);
        if self.home_loaded {
            return;
        }
        let Ok(tab) = self.tabs.get_tab_mut(tab_id) else {
            return;
        };
        if tab.loading {
            tracing::info!(tab = tab_id, "navigation stalled past timeout");
            tab.loading = false;
            tab.state = NavigationState::Errored(NavigationError::NoConnectivity);
        }
    }

    /// Settles a navigation the engine dropped because another tab's page
    /// replaced it. The tab goes back to idle until it is shown again.
    pub fn abandon_navigation(&mut self, tab_id: &str) -> Result<(), TabError> {
        let tab = self.tabs.get_tab_mut(tab_id)?;
        if tab.state == NavigationState::Loading {
            tab.state = NavigationState::Idle;
        }
        tab.loading = false;
        self.disarm(tab_id);
        tracing::debug!(tab = tab_id, "navigation abandoned");
        Ok(())
    }

    /// Clears the selected tab's error and reloads its last known URL.
    pub fn retry(&mut self) -> Option<ShellCommand> {
        let tab_id = self.tabs.selected_tab_id()?.to_string();
        let tab = self.tabs.get_tab_mut(&tab_id).ok()?;
        tab.loading = true;
        tab.state = NavigationState::Loading;
        let url = tab.url.clone();
        self.arm(&tab_id);
        Some(ShellCommand::LoadUrl { tab_id, url })
    }

    /// Popups never get their own window; they become a tab here.
    pub fn on_new_window_requested(&mut self, url: &str) -> ShellCommand {
        let tab_id = self.tabs.add_tab(Some(url), None);
        tracing::debug!(tab = %tab_id, url, "new window redirected to tab");
        ShellCommand::LoadUrl {
            tab_id,
            url: url.to_string(),
        }
    }

    // ─── Policy hooks ───

    /// Editor documents opened from a subframe are moved into their own tab.
    pub fn decide_navigation(&mut self, action: &NavigationAction) -> NavigationDecision {
        if action.main_frame || !TabIcon::for_url(Some(&action.url)).is_editor() {
            return NavigationDecision::Allow;
        }
        let tab_id = self.tabs.add_tab(Some(&action.url), None);
        NavigationDecision::OpenedInNewTab {
            tab_id,
            url: action.url.clone(),
        }
    }

    /// Diverts downloadable responses away from the renderer. The tab's
    /// pending navigation is settled since the engine will not finish it.
    pub fn decide_response(&mut self, tab_id: &str, info: &ResponseInfo) -> ResponseDecision {
        if !response_policy::is_download(info) {
            return ResponseDecision::Render;
        }
        if let Ok(tab) = self.tabs.get_tab_mut(tab_id) {
            tab.loading = false;
            if tab.state == NavigationState::Loading {
                tab.state = NavigationState::Loaded;
            }
        }
        self.disarm(tab_id);
        ResponseDecision::Download {
            url: info.url.clone(),
            file_name: response_policy::file_name_for(info),
        }
    }

    // ─── Watchdog ───

    fn arm(&mut self, tab_id: &str) {
        self.disarm(tab_id);
        self.next_generation += 1;
        let generation = self.next_generation;
        let timer = self.scheduler.schedule(
            self.timeout,
            EngineEvent::NavigationTimedOut {
                tab_id: tab_id.to_string(),
                generation,
            },
        );
        self.watchdogs
            .insert(tab_id.to_string(), Watchdog { generation, timer });
        tracing::debug!(tab = tab_id, generation, "watchdog armed");
    }

    fn disarm(&mut self, tab_id: &str) {
        if let Some(w) = self.watchdogs.remove(tab_id) {
            w.timer.cancel();
        }
    }
}
