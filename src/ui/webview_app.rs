//! WebView shell using `wry` + `tao`.
//!
//! Architecture:
//! - One window, one webview. Tabs are logical: the webview shows the
//!   selected tab's URL and switching tabs reloads it.
//! - `with_initialization_script(SHELL_JS)` injects the tab strip, the
//!   download panel and the loading/error overlays on every page.
//! - IPC messages carry the URL of the page that posted them. `App`
//!   refuses download commands from pages off the home domain.
//! - Every webview and transfer callback is turned into a `UserEvent` and
//!   sent through the event loop proxy. `App` is owned by the event loop
//!   closure, so all state changes happen on the main thread.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use tao::event::{Event, WindowEvent};
use tao::event_loop::{ControlFlow, EventLoop, EventLoopBuilder, EventLoopProxy};
use tao::window::WindowBuilder;
use wry::{PageLoadEvent, WebView, WebViewBuilder};

use crate::app::App;
use crate::engine::EventSink;
use crate::types::events::{EngineEvent, ShellCommand};
use crate::types::ipc::UiCommand;
use crate::types::navigation::{ResponseDecision, ResponseInfo};
use crate::types::settings::ShellSettings;

#[derive(Debug)]
enum UserEvent {
    Engine(EngineEvent),
    PageLoad { finished: bool, url: String },
    DownloadRequested { url: String, suggested: Option<String> },
    Ipc { origin: String, body: String },
}

/// Forwards background events into the window's event loop.
struct ProxySink(Mutex<EventLoopProxy<UserEvent>>);

impl EventSink for ProxySink {
    fn emit(&self, event: EngineEvent) {
        if let Ok(proxy) = self.0.lock() {
            let _ = proxy.send_event(UserEvent::Engine(event));
        }
    }
}

const SHELL_JS: &str = include_str!("../../resources/ui/shell.js");

struct Shell {
    app: App,
    webview: WebView,
}

impl Shell {
    fn run_command(&mut self, command: ShellCommand) {
        self.app.begin_load(&command);
        let ShellCommand::LoadUrl { tab_id, url } = command;
        tracing::debug!(tab = %tab_id, %url, "loading");
        if let Err(e) = self.webview.load_url(&url) {
            tracing::warn!(error = %e, %url, "webview refused to load");
        }
    }

    fn render(&self) {
        match serde_json::to_string(&self.app.snapshot()) {
            Ok(json) => {
                let _ = self
                    .webview
                    .evaluate_script(&format!("if(window.__dd_render)__dd_render({})", json));
            }
            Err(e) => tracing::warn!(error = %e, "could not serialize snapshot"),
        }
    }

    fn handle(&mut self, event: UserEvent) {
        match event {
            UserEvent::Engine(event) => {
                if let Some(command) = self.app.handle_event(event) {
                    self.run_command(command);
                }
            }
            UserEvent::PageLoad { finished, url } => self.app.handle_page_load(finished, &url),
            UserEvent::DownloadRequested { url, suggested } => {
                let tab_id = self.app.displayed_tab_id().unwrap_or_default().to_string();
                let info = ResponseInfo {
                    url,
                    content_type: None,
                    content_disposition: Some("attachment".to_string()),
                    suggested_file_name: suggested,
                };
                if let ResponseDecision::Download { file_name, .. } =
                    self.app.handle_response(&tab_id, &info)
                {
                    tracing::info!(file = %file_name, "download handed to transfer engine");
                }
            }
            UserEvent::Ipc { origin, body } => match serde_json::from_str::<UiCommand>(&body) {
                Ok(command) => {
                    if let Some(load) = self.app.handle_ui_command(&origin, command) {
                        self.run_command(load);
                    }
                }
                Err(e) => tracing::debug!(error = %e, "unreadable ipc message"),
            },
        }
        self.render();
    }
}

// ─── Main entry point ───

pub fn run(settings: ShellSettings) -> Result<(), Box<dyn std::error::Error>> {
    let runtime = tokio::runtime::Runtime::new()?;

    let event_loop: EventLoop<UserEvent> = EventLoopBuilder::with_user_event().build();
    let proxy = event_loop.create_proxy();
    let sink: Arc<dyn EventSink> = Arc::new(ProxySink(Mutex::new(proxy.clone())));

    let mut app = App::with_system(settings, runtime.handle().clone(), sink)?;

    let min_size = tao::dpi::LogicalSize::new(app.settings.window.width, app.settings.window.height);
    let window = WindowBuilder::new()
        .with_title(app.settings.home_title.as_str())
        .with_inner_size(min_size)
        .with_min_inner_size(min_size)
        .build(&event_loop)?;

    let ipc_proxy = proxy.clone();
    let load_proxy = proxy.clone();
    let dl_proxy = proxy.clone();
    let nw_proxy = proxy.clone();

    let initial = app.initial_command();
    app.begin_load(&initial);
    let ShellCommand::LoadUrl { url: home_url, .. } = initial;

    let builder = WebViewBuilder::new()
        .with_url(&home_url)
        .with_user_agent(&app.settings.user_agent)
        .with_initialization_script(SHELL_JS)
        .with_ipc_handler(move |msg: wry::http::Request<String>| {
            let origin = msg.uri().to_string();
            let body = msg.body().clone();
            let _ = ipc_proxy.send_event(UserEvent::Ipc { origin, body });
        })
        .with_on_page_load_handler(move |event, url| {
            let finished = matches!(event, PageLoadEvent::Finished);
            let _ = load_proxy.send_event(UserEvent::PageLoad { finished, url });
        })
        .with_download_started_handler(move |url: String, path: &mut PathBuf| {
            let suggested = path
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .filter(|n| !n.is_empty());
            let _ = dl_proxy.send_event(UserEvent::DownloadRequested { url, suggested });
            // Transfers are ours; the webview never writes the file.
            false
        })
        .with_new_window_req_handler(move |url, _features| {
            if url.starts_with("http://") || url.starts_with("https://") {
                let _ = nw_proxy.send_event(UserEvent::Engine(EngineEvent::NewWindowRequested { url }));
            }
            wry::NewWindowResponse::Deny
        })
        .with_devtools(cfg!(debug_assertions));

    #[cfg(target_os = "linux")]
    let webview = {
        use tao::platform::unix::WindowExtUnix;
        use wry::WebViewBuilderExtUnix;
        let vbox = window.default_vbox().ok_or("missing GTK container")?;
        builder.build_gtk(vbox)?
    };

    #[cfg(not(target_os = "linux"))]
    let webview = builder.build(&window)?;

    let mut shell = Shell { app, webview };

    event_loop.run(move |event, _, control_flow| {
        // Keeps the transfer tasks and timers alive for the window's lifetime.
        let _runtime = &runtime;
        *control_flow = ControlFlow::Wait;

        match event {
            Event::WindowEvent {
                event: WindowEvent::CloseRequested,
                ..
            } => {
                *control_flow = ControlFlow::Exit;
            }
            Event::UserEvent(user_event) => shell.handle(user_event),
            _ => {}
        }
    });
}
