use uuid::Uuid;

use crate::types::errors::TabError;
use crate::types::tab::{NavigationState, Tab, TabIcon, TabUpdate};

pub const NEW_TAB_TITLE: &str = "New Tab";

/// Trait defining the tab management interface.
pub trait TabManagerTrait {
    fn add_tab(&mut self, url: Option<&str>, title: Option<&str>) -> String;
    fn close_tab(&mut self, tab_id: &str) -> Result<bool, TabError>;
    fn select_tab(&mut self, tab_id: &str) -> Result<(), TabError>;
    fn update_tab(&mut self, tab_id: &str, update: TabUpdate) -> Result<(), TabError>;
    fn get_tab(&self, tab_id: &str) -> Option<&Tab>;
    fn get_all_tabs(&self) -> &[Tab];
    fn get_selected_tab(&self) -> Option<&Tab>;
    fn selected_tab_id(&self) -> Option<&str>;
    fn home_tab_id(&self) -> &str;
    fn tab_count(&self) -> usize;
}

/// In-memory tab list. The home tab is created with the manager and can
/// never be closed, so the list is never empty.
pub struct TabManager {
    tabs: Vec<Tab>,
    selected_tab_id: Option<String>,
    home_tab_id: String,
    default_url: String,
}

impl TabManager {
    pub fn new(home_url: &str, home_title: &str) -> Self {
        let home = Tab {
            id: Uuid::new_v4().to_string(),
            title: home_title.to_string(),
            url: home_url.to_string(),
            loading: true,
            is_home: true,
            icon: TabIcon::for_url(Some(home_url)),
            state: NavigationState::Idle,
        };
        let home_tab_id = home.id.clone();
        Self {
            tabs: vec![home],
            selected_tab_id: Some(home_tab_id.clone()),
            home_tab_id,
            default_url: home_url.to_string(),
        }
    }

    fn find_tab_index(&self, tab_id: &str) -> Option<usize> {
        self.tabs.iter().position(|t| t.id == tab_id)
    }

    pub(crate) fn get_tab_mut(&mut self, tab_id: &str) -> Result<&mut Tab, TabError> {
        self.tabs
            .iter_mut()
            .find(|t| t.id == tab_id)
            .ok_or_else(|| TabError::NotFound(tab_id.to_string()))
    }
}

impl TabManagerTrait for TabManager {
    /// Append a tab and select it. Returns the new tab's ID.
    fn add_tab(&mut self, url: Option<&str>, title: Option<&str>) -> String {
        let id = Uuid::new_v4().to_string();
        let tab = Tab {
            id: id.clone(),
            title: title.unwrap_or(NEW_TAB_TITLE).to_string(),
            url: url.unwrap_or(&self.default_url).to_string(),
            loading: true,
            is_home: false,
            icon: TabIcon::for_url(url),
            state: NavigationState::Idle,
        };
        self.tabs.push(tab);
        self.selected_tab_id = Some(id.clone());
        id
    }

    /// Close a tab. Returns `Ok(false)` without doing anything for the home
    /// tab or the last remaining tab. A closed selected tab hands the
    /// selection to whichever tab now sits at its index, else the one before.
    fn close_tab(&mut self, tab_id: &str) -> Result<bool, TabError> {
        let idx = self
            .find_tab_index(tab_id)
            .ok_or_else(|| TabError::NotFound(tab_id.to_string()))?;

        if self.tabs[idx].is_home || self.tabs.len() <= 1 {
            return Ok(false);
        }

        self.tabs.remove(idx);

        if self.selected_tab_id.as_deref() == Some(tab_id) {
            let next = if idx < self.tabs.len() {
                idx
            } else if idx > 0 {
                idx - 1
            } else {
                0
            };
            self.selected_tab_id = self.tabs.get(next).map(|t| t.id.clone());
        }

        Ok(true)
    }

    fn select_tab(&mut self, tab_id: &str) -> Result<(), TabError> {
        if self.find_tab_index(tab_id).is_none() {
            return Err(TabError::NotFound(tab_id.to_string()));
        }
        self.selected_tab_id = Some(tab_id.to_string());
        Ok(())
    }

    /// Apply a partial update. A new URL also recomputes the icon.
    fn update_tab(&mut self, tab_id: &str, update: TabUpdate) -> Result<(), TabError> {
        let tab = self.get_tab_mut(tab_id)?;
        if let Some(title) = update.title {
            tab.title = title;
        }
        if let Some(url) = update.url {
            tab.icon = TabIcon::for_url(Some(&url));
            tab.url = url;
        }
        if let Some(loading) = update.loading {
            tab.loading = loading;
        }
        Ok(())
    }

    fn get_tab(&self, tab_id: &str) -> Option<&Tab> {
        self.tabs.iter().find(|t| t.id == tab_id)
    }

    fn get_all_tabs(&self) -> &[Tab] {
        &self.tabs
    }

    fn get_selected_tab(&self) -> Option<&Tab> {
        self.selected_tab_id
            .as_deref()
            .and_then(|id| self.get_tab(id))
    }

    fn selected_tab_id(&self) -> Option<&str> {
        self.selected_tab_id.as_deref()
    }

    fn home_tab_id(&self) -> &str {
        &self.home_tab_id
    }

    fn tab_count(&self) -> usize {
        self.tabs.len()
    }
}
