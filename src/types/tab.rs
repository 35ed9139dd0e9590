use serde::{Deserialize, Serialize};

use super::errors::NavigationError;

/// Represents a tab in the shell with its current navigation state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tab {
    pub id: String,
    pub title: String,
    pub url: String,
    pub loading: bool,
    pub is_home: bool,
    pub icon: TabIcon,
    pub state: NavigationState,
}

impl Tab {
    pub fn error(&self) -> Option<&NavigationError> {
        match &self.state {
            NavigationState::Errored(err) => Some(err),
            _ => None,
        }
    }
}

/// Per-tab navigation lifecycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "state", content = "error", rename_all = "snake_case")]
pub enum NavigationState {
    #[default]
    Idle,
    Loading,
    Loaded,
    Errored(NavigationError),
}

/// Icon category shown in the tab bar, derived from the tab's URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TabIcon {
    Document,
    Spreadsheet,
    Presentation,
    Form,
    Storage,
    #[default]
    Generic,
}

/// URL fragments of the service's sub-apps, checked in order.
const ICON_PATTERNS: &[(&str, TabIcon)] = &[
    ("docs.google.com/document", TabIcon::Document),
    ("docs.google.com/spreadsheets", TabIcon::Spreadsheet),
    ("sheets.google.com", TabIcon::Spreadsheet),
    ("docs.google.com/presentation", TabIcon::Presentation),
    ("slides.google.com", TabIcon::Presentation),
    ("docs.google.com/forms", TabIcon::Form),
    ("forms.google.com", TabIcon::Form),
    ("drive.google.com", TabIcon::Storage),
];

impl TabIcon {
    pub fn for_url(url: Option<&str>) -> Self {
        let Some(url) = url else {
            return TabIcon::Generic;
        };
        ICON_PATTERNS
            .iter()
            .find(|(pattern, _)| url.contains(pattern))
            .map(|(_, icon)| *icon)
            .unwrap_or(TabIcon::Generic)
    }

    /// True for the editor sub-apps that open in their own tab when a page
    /// targets them from a subframe.
    pub fn is_editor(self) -> bool {
        matches!(
            self,
            TabIcon::Document | TabIcon::Spreadsheet | TabIcon::Presentation
        )
    }
}

/// Partial update applied by `update_tab`; `None` fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct TabUpdate {
    pub title: Option<String>,
    pub url: Option<String>,
    pub loading: Option<bool>,
}
