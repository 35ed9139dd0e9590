//! DriveDesk entry point.
//!
//! With the `gui` feature this opens the shell window. Without it the binary
//! runs headless: every URL given on the command line is downloaded through
//! the same download controller the window uses.

use drivedesk::services::settings_engine::{SettingsEngine, SettingsEngineTrait};
use drivedesk::types::settings::ShellSettings;
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,hyper=warn,reqwest=warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init();
}

fn load_settings() -> ShellSettings {
    let mut engine = SettingsEngine::new(std::env::var("DRIVEDESK_CONFIG").ok());
    match engine.load() {
        Ok(settings) => settings,
        Err(e) => {
            tracing::warn!(path = engine.get_config_path(), error = %e, "falling back to default settings");
            ShellSettings::default()
        }
    }
}

#[cfg(feature = "gui")]
fn main() {
    init_tracing();
    let settings = load_settings();
    if let Err(e) = drivedesk::ui::webview_app::run(settings) {
        tracing::error!(error = %e, "shell exited with an error");
        std::process::exit(1);
    }
}

#[cfg(not(feature = "gui"))]
fn main() {
    init_tracing();
    let settings = load_settings();
    let urls: Vec<String> = std::env::args().skip(1).collect();
    if urls.is_empty() {
        eprintln!("usage: drivedesk <url>...");
        std::process::exit(2);
    }

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            tracing::error!(error = %e, "could not start async runtime");
            std::process::exit(1);
        }
    };
    let failed = runtime.block_on(headless::download_all(settings, urls));
    std::process::exit(if failed == 0 { 0 } else { 1 });
}

#[cfg(not(feature = "gui"))]
mod headless {
    use std::sync::Arc;

    use drivedesk::app::App;
    use drivedesk::managers::download_manager::DownloadManagerTrait;
    use drivedesk::managers::response_policy::url_file_name;
    use drivedesk::types::download::DownloadStatus;
    use drivedesk::types::settings::ShellSettings;
    use tokio::sync::mpsc;

    /// Downloads every URL and returns how many failed. The receiver loop
    /// is the single context that mutates `App`.
    pub async fn download_all(settings: ShellSettings, urls: Vec<String>) -> usize {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut app = match App::with_system(settings, tokio::runtime::Handle::current(), Arc::new(tx)) {
            Ok(app) => app,
            Err(e) => {
                tracing::error!(error = %e, "could not build transfer engine");
                return urls.len();
            }
        };

        for url in &urls {
            let name = url_file_name(url).unwrap_or_default();
            app.downloads.start_download(url, &name);
        }

        while app.downloads.active_count() > 0 {
            let Some(event) = rx.recv().await else {
                break;
            };
            app.handle_event(event);
        }

        let mut failed = 0;
        for item in app.downloads.list_downloads() {
            match item.status {
                DownloadStatus::Completed => println!(
                    "{}  {}",
                    item.file_name,
                    item.destination
                        .as_ref()
                        .map(|p| p.display().to_string())
                        .unwrap_or_default()
                ),
                _ => {
                    failed += 1;
                    println!("{}  failed", item.file_name);
                }
            }
        }
        failed
    }
}
