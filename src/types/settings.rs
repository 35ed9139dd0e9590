use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

pub const DEFAULT_HOME_URL: &str = "https://drive.google.com/drive/u/0/home";
pub const DEFAULT_HOME_TITLE: &str = "Google Drive";
pub const DEFAULT_NAVIGATION_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/16.0 Safari/605.1.15";

/// Top-level shell settings. Every field has a default so a partial
/// `settings.json` is accepted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ShellSettings {
    pub home_url: String,
    pub home_title: String,
    pub navigation_timeout_secs: u64,
    pub user_agent: String,
    /// Overrides the platform downloads folder when set.
    pub downloads_dir: Option<PathBuf>,
    pub window: WindowSettings,
}

impl Default for ShellSettings {
    fn default() -> Self {
        Self {
            home_url: DEFAULT_HOME_URL.to_string(),
            home_title: DEFAULT_HOME_TITLE.to_string(),
            navigation_timeout_secs: DEFAULT_NAVIGATION_TIMEOUT_SECS,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            downloads_dir: None,
            window: WindowSettings::default(),
        }
    }
}

impl ShellSettings {
    pub fn navigation_timeout(&self) -> Duration {
        Duration::from_secs(self.navigation_timeout_secs)
    }
}

/// Initial (and minimum) window size.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WindowSettings {
    pub width: f64,
    pub height: f64,
}

impl Default for WindowSettings {
    fn default() -> Self {
        Self {
            width: 1000.0,
            height: 700.0,
        }
    }
}
