use serde::{Deserialize, Serialize};

/// Transport failure reported by the rendering engine for a navigation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureCode {
    NotConnectedToInternet,
    NetworkConnectionLost,
    TimedOut,
    CannotFindHost,
    CannotConnectToHost,
    BadServerResponse,
    HttpStatus(u16),
    /// The engine abandoned the navigation, usually because a newer one replaced it.
    Cancelled,
    Other { code: i64, message: String },
}

impl FailureCode {
    /// Maps the numeric URL-loading error codes that WebKit-based engines
    /// report into the closed set above.
    pub fn from_url_error_code(code: i64, message: &str) -> Self {
        match code {
            -1009 => FailureCode::NotConnectedToInternet,
            -1005 => FailureCode::NetworkConnectionLost,
            -1001 => FailureCode::TimedOut,
            -1003 => FailureCode::CannotFindHost,
            -1004 => FailureCode::CannotConnectToHost,
            -1011 => FailureCode::BadServerResponse,
            -999 => FailureCode::Cancelled,
            _ => FailureCode::Other {
                code,
                message: message.to_string(),
            },
        }
    }
}

/// What the engine knows about a navigation before it commits.
#[derive(Debug, Clone, Default)]
pub struct NavigationAction {
    pub url: String,
    /// False when the navigation targets a subframe.
    pub main_frame: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationDecision {
    Allow,
    /// Cancel this navigation; the URL has been opened in the new tab.
    OpenedInNewTab { tab_id: String, url: String },
}

/// Response metadata inspected before the engine renders it.
#[derive(Debug, Clone, Default)]
pub struct ResponseInfo {
    pub url: String,
    pub content_type: Option<String>,
    pub content_disposition: Option<String>,
    pub suggested_file_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponseDecision {
    Render,
    /// Cancel the navigation and hand the URL to the download controller.
    Download { url: String, file_name: String },
}
