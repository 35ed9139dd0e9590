//! DriveDesk UI layer.
//!
//! Uses `wry` for cross-platform WebView rendering:
//! - Windows: WebView2
//! - Linux: WebKitGTK
//! - macOS: WKWebView
//!
//! The tab strip, download panel and overlays are plain HTML injected into
//! every page. They only render `ShellSnapshot`s and post IPC commands.

pub mod webview_app;
