//! Unit tests for the download lifecycle controller, driven through a
//! recording transfer engine and a temp-dir backed host.

#[path = "../common/mod.rs"]
mod common;

use std::sync::Arc;

use common::{RecordingEngine, RecordingHost};
use drivedesk::managers::download_manager::{DownloadManager, DownloadManagerTrait};
use drivedesk::types::download::{DownloadStatus, INITIAL_SPEED, INITIAL_TIME_REMAINING};
use drivedesk::types::errors::DownloadError;
use drivedesk::types::events::TransferHandle;
use tempfile::TempDir;

struct Fixture {
    manager: DownloadManager,
    engine: Arc<RecordingEngine>,
    host: Arc<RecordingHost>,
    downloads: TempDir,
    staging: TempDir,
}

fn fixture() -> Fixture {
    let downloads = TempDir::new().unwrap();
    let staging = TempDir::new().unwrap();
    let engine = RecordingEngine::new();
    let host = RecordingHost::new(downloads.path());
    let manager = DownloadManager::new(engine.clone(), host.clone());
    Fixture {
        manager,
        engine,
        host,
        downloads,
        staging,
    }
}

impl Fixture {
    fn start(&mut self, name: &str) -> (String, TransferHandle) {
        let url = format!("https://files.example/{}", name);
        let id = self.manager.start_download(&url, name);
        (id, self.engine.last_handle())
    }

    /// Writes a staged payload the way the transfer engine would.
    fn stage(&self, name: &str, body: &[u8]) -> std::path::PathBuf {
        let path = self.staging.path().join(name);
        std::fs::write(&path, body).unwrap();
        path
    }
}

// === Start ===

#[test]
fn test_start_adds_item_on_top_and_opens_panel() {
    let mut f = fixture();
    assert!(!f.manager.is_panel_open());
    let (first, _) = f.start("a.pdf");
    let (second, _) = f.start("b.pdf");

    let list = f.manager.list_downloads();
    assert_eq!(list.len(), 2);
    assert_eq!(list[0].id, second);
    assert_eq!(list[1].id, first);
    assert!(f.manager.is_panel_open());
    assert_eq!(f.manager.active_count(), 2);

    let item = f.manager.get_download(&first).unwrap();
    assert_eq!(item.status, DownloadStatus::Downloading);
    assert_eq!(item.file_name, "a.pdf");
    assert_eq!(item.progress, 0.0);
    assert_eq!(item.speed, INITIAL_SPEED);
    assert_eq!(item.time_remaining, INITIAL_TIME_REMAINING);
    assert!(item.destination.is_none());
    assert_eq!(
        f.engine.requested_urls(),
        vec!["https://files.example/a.pdf", "https://files.example/b.pdf"]
    );
}

#[test]
fn test_start_sanitizes_file_name() {
    let mut f = fixture();
    let id = f
        .manager
        .start_download("https://files.example/x", "../../secret.txt");
    assert_eq!(f.manager.get_download(&id).unwrap().file_name, "secret.txt");
}

// === Progress ===

#[test]
fn test_progress_updates_counters_speed_and_eta() {
    let mut f = fixture();
    let (id, handle) = f.start("movie.mp4");

    f.manager.on_progress(handle, 1000, 5000, 10000);

    let item = f.manager.get_download(&id).unwrap();
    assert_eq!(item.progress, 0.5);
    assert_eq!(item.file_size, 10000);
    assert_eq!(item.downloaded_size, 5000);
    assert_eq!(item.speed, "1 KB/s");
    assert_eq!(item.time_remaining, "5 sec");
}

#[test]
fn test_progress_without_expected_size_keeps_eta() {
    let mut f = fixture();
    let (id, handle) = f.start("stream.bin");

    f.manager.on_progress(handle, 2048, 2048, 0);

    let item = f.manager.get_download(&id).unwrap();
    assert_eq!(item.progress, 0.0);
    assert_eq!(item.downloaded_size, 2048);
    assert_eq!(item.file_size, 0);
    assert_eq!(item.time_remaining, INITIAL_TIME_REMAINING);
}

#[test]
fn test_progress_is_clamped_when_server_overshoots() {
    let mut f = fixture();
    let (id, handle) = f.start("odd.bin");

    f.manager.on_progress(handle, 500, 1500, 1000);

    let item = f.manager.get_download(&id).unwrap();
    assert_eq!(item.progress, 1.0);
    assert_eq!(item.downloaded_size, 1000);
}

#[test]
fn test_events_for_unknown_handle_are_dropped() {
    let mut f = fixture();
    let (id, _) = f.start("a.bin");

    f.manager.on_progress(TransferHandle(999), 10, 10, 100);
    f.manager.on_failed(TransferHandle(999), "boom");

    let item = f.manager.get_download(&id).unwrap();
    assert_eq!(item.progress, 0.0);
    assert_eq!(item.status, DownloadStatus::Downloading);
}

// === Pause / resume / cancel ===

#[test]
fn test_pause_cancels_transfer_and_ignores_late_progress() {
    let mut f = fixture();
    let (id, handle) = f.start("a.bin");
    f.manager.on_progress(handle, 100, 100, 1000);

    f.manager.pause_download(&id).unwrap();

    assert_eq!(f.engine.cancelled(), vec![handle]);
    assert_eq!(f.manager.active_count(), 0);
    f.manager.on_progress(handle, 100, 900, 1000);
    let item = f.manager.get_download(&id).unwrap();
    assert_eq!(item.status, DownloadStatus::Paused);
    assert_eq!(item.downloaded_size, 100);
}

#[test]
fn test_resume_starts_fresh_transfer_and_resets_progress() {
    let mut f = fixture();
    let (id, first) = f.start("a.bin");
    f.manager.on_progress(first, 400, 400, 1000);
    f.manager.pause_download(&id).unwrap();

    f.manager.resume_download(&id).unwrap();

    let second = f.engine.last_handle();
    assert_ne!(first, second);
    assert_eq!(f.engine.requested_urls().len(), 2);
    let item = f.manager.get_download(&id).unwrap();
    assert_eq!(item.status, DownloadStatus::Downloading);
    assert_eq!(item.progress, 0.0);
    assert_eq!(item.downloaded_size, 0);
    assert_eq!(item.speed, INITIAL_SPEED);

    // Old handle no longer maps to the item.
    f.manager.on_progress(first, 100, 900, 1000);
    assert_eq!(f.manager.get_download(&id).unwrap().progress, 0.0);
    f.manager.on_progress(second, 250, 250, 1000);
    assert_eq!(f.manager.get_download(&id).unwrap().progress, 0.25);
}

#[test]
fn test_invalid_transitions_are_rejected() {
    let mut f = fixture();
    let (id, _) = f.start("a.bin");

    let err = f.manager.resume_download(&id).unwrap_err();
    assert!(matches!(
        err,
        DownloadError::InvalidTransition {
            action: "resume",
            status: "downloading",
            ..
        }
    ));

    f.manager.pause_download(&id).unwrap();
    assert!(f.manager.pause_download(&id).is_err());
}

#[test]
fn test_unknown_id_is_not_found() {
    let mut f = fixture();
    assert!(matches!(
        f.manager.pause_download("nope"),
        Err(DownloadError::NotFound(_))
    ));
    assert!(f.manager.cancel_download("nope").is_err());
    assert!(f.manager.open_destination("nope").is_err());
}

#[test]
fn test_cancel_removes_item_and_stops_transfer() {
    let mut f = fixture();
    let (id, handle) = f.start("a.bin");

    f.manager.cancel_download(&id).unwrap();

    assert!(f.manager.get_download(&id).is_none());
    assert_eq!(f.engine.cancelled(), vec![handle]);
    assert_eq!(f.manager.active_count(), 0);
}

#[test]
fn test_cancel_paused_download_does_not_cancel_twice() {
    let mut f = fixture();
    let (id, handle) = f.start("a.bin");
    f.manager.pause_download(&id).unwrap();

    f.manager.cancel_download(&id).unwrap();

    assert_eq!(f.engine.cancelled(), vec![handle]);
    assert!(f.manager.list_downloads().is_empty());
}

// === Finalization ===

#[test]
fn test_completion_moves_file_into_downloads_folder() {
    let mut f = fixture();
    let (id, handle) = f.start("report.pdf");
    f.manager.on_progress(handle, 7, 7, 7);
    let staged = f.stage("staged.part", b"payload");

    f.manager.on_completed(handle, &staged);

    let destination = f.downloads.path().join("report.pdf");
    let item = f.manager.get_download(&id).unwrap();
    assert_eq!(item.status, DownloadStatus::Completed);
    assert_eq!(item.progress, 1.0);
    assert_eq!(item.destination.as_deref(), Some(destination.as_path()));
    assert_eq!(std::fs::read(&destination).unwrap(), b"payload");
    assert!(!staged.exists());
    assert_eq!(f.manager.active_count(), 0);
}

#[test]
fn test_completion_overwrites_existing_file() {
    let mut f = fixture();
    std::fs::write(f.downloads.path().join("notes.txt"), b"old").unwrap();
    let (_, handle) = f.start("notes.txt");
    let staged = f.stage("staged.part", b"new");

    f.manager.on_completed(handle, &staged);

    assert_eq!(
        std::fs::read(f.downloads.path().join("notes.txt")).unwrap(),
        b"new"
    );
}

#[test]
fn test_completion_with_missing_payload_still_completes() {
    let mut f = fixture();
    let (id, handle) = f.start("ghost.bin");
    let missing = f.staging.path().join("never-written.part");

    f.manager.on_completed(handle, &missing);

    assert_eq!(
        f.manager.get_download(&id).unwrap().status,
        DownloadStatus::Completed
    );
}

#[test]
fn test_completion_after_pause_discards_payload() {
    let mut f = fixture();
    let (id, handle) = f.start("late.bin");
    f.manager.pause_download(&id).unwrap();
    let staged = f.stage("late.part", b"too late");

    f.manager.on_completed(handle, &staged);

    assert!(!staged.exists());
    assert!(!f.downloads.path().join("late.bin").exists());
    let item = f.manager.get_download(&id).unwrap();
    assert_eq!(item.status, DownloadStatus::Paused);
    assert!(item.destination.is_none());
}

#[test]
fn test_completion_after_cancel_discards_payload() {
    let mut f = fixture();
    let (id, handle) = f.start("gone.bin");
    f.manager.cancel_download(&id).unwrap();
    let staged = f.stage("gone.part", b"orphan");

    f.manager.on_completed(handle, &staged);

    assert!(!staged.exists());
    assert!(f.manager.list_downloads().is_empty());
}

#[test]
fn test_failure_marks_item_failed() {
    let mut f = fixture();
    let (id, handle) = f.start("a.bin");

    f.manager.on_failed(handle, "Server responded with status 404");

    assert_eq!(
        f.manager.get_download(&id).unwrap().status,
        DownloadStatus::Failed
    );
    assert_eq!(f.manager.active_count(), 0);
    assert!(f.manager.pause_download(&id).is_err());
}

// === Open / reveal / clear ===

#[test]
fn test_open_and_reveal_require_destination() {
    let mut f = fixture();
    let (id, handle) = f.start("a.pdf");

    assert!(!f.manager.open_destination(&id).unwrap());
    assert!(!f.manager.reveal_destination(&id).unwrap());
    assert!(f.host.opened.lock().unwrap().is_empty());

    let staged = f.stage("a.part", b"x");
    f.manager.on_completed(handle, &staged);

    assert!(f.manager.open_destination(&id).unwrap());
    assert!(f.manager.reveal_destination(&id).unwrap());
    let expected = f.downloads.path().join("a.pdf");
    assert_eq!(*f.host.opened.lock().unwrap(), vec![expected.clone()]);
    assert_eq!(*f.host.revealed.lock().unwrap(), vec![expected]);
}

#[test]
fn test_clear_finished_keeps_active_items() {
    let mut f = fixture();
    let (done, h1) = f.start("done.bin");
    let (failed, h2) = f.start("failed.bin");
    let (paused, _) = f.start("paused.bin");
    let (running, _) = f.start("running.bin");
    let staged = f.stage("done.part", b"ok");
    f.manager.on_completed(h1, &staged);
    f.manager.on_failed(h2, "reset");
    f.manager.pause_download(&paused).unwrap();

    assert_eq!(f.manager.clear_finished(), 2);

    let ids: Vec<&str> = f
        .manager
        .list_downloads()
        .iter()
        .map(|d| d.id.as_str())
        .collect();
    assert_eq!(ids, vec![running.as_str(), paused.as_str()]);
    assert!(f.manager.get_download(&done).is_none());
    assert!(f.manager.get_download(&failed).is_none());
}

#[test]
fn test_rows_stay_correct_after_removals() {
    let mut f = fixture();
    let (a, ha) = f.start("a.bin");
    let (b, _) = f.start("b.bin");
    let (c, hc) = f.start("c.bin");
    let (d, hd) = f.start("d.bin");

    f.manager.cancel_download(&b).unwrap();
    f.manager.on_progress(ha, 10, 10, 100);
    f.manager.on_progress(hc, 30, 30, 100);
    f.manager.on_failed(hd, "reset");
    f.manager.clear_finished();
    f.manager.on_progress(hc, 20, 50, 100);

    assert!(f.manager.get_download(&b).is_none());
    assert!(f.manager.get_download(&d).is_none());
    assert_eq!(f.manager.get_download(&a).unwrap().progress, 0.1);
    assert_eq!(f.manager.get_download(&c).unwrap().progress, 0.5);
    assert_eq!(f.manager.get_download(&c).unwrap().file_name, "c.bin");
    f.manager.pause_download(&a).unwrap();
    assert_eq!(
        f.manager.get_download(&a).unwrap().status,
        DownloadStatus::Paused
    );
}

#[test]
fn test_toggle_panel() {
    let mut f = fixture();
    assert!(f.manager.toggle_panel());
    assert!(!f.manager.toggle_panel());
    f.manager.set_panel_open(true);
    assert!(f.manager.is_panel_open());
}
