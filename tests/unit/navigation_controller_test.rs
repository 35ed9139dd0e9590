//! Unit tests for the navigation state machine: failure classification,
//! the per-tab watchdog, retry and the popup/response policies.

#[path = "../common/mod.rs"]
mod common;

use std::time::Duration;

use common::{watchdog_parts, ManualScheduler};
use drivedesk::managers::navigation_controller::{classify_failure, NavigationController};
use drivedesk::managers::tab_manager::TabManagerTrait;
use drivedesk::types::errors::NavigationError;
use drivedesk::types::events::ShellCommand;
use drivedesk::types::navigation::{
    FailureCode, NavigationAction, NavigationDecision, ResponseDecision, ResponseInfo,
};
use drivedesk::types::settings::ShellSettings;
use drivedesk::types::tab::NavigationState;
use rstest::rstest;
use std::sync::Arc;

fn controller() -> (NavigationController, Arc<ManualScheduler>) {
    let scheduler = ManualScheduler::new();
    let nav = NavigationController::new(&ShellSettings::default(), scheduler.clone());
    (nav, scheduler)
}

fn home_id(nav: &NavigationController) -> String {
    nav.tabs().home_tab_id().to_string()
}

// === Classification ===

#[rstest]
#[case(FailureCode::NotConnectedToInternet, Some(NavigationError::NoConnectivity))]
#[case(FailureCode::NetworkConnectionLost, Some(NavigationError::NoConnectivity))]
#[case(FailureCode::CannotFindHost, Some(NavigationError::NoConnectivity))]
#[case(FailureCode::TimedOut, Some(NavigationError::Timeout))]
#[case(FailureCode::BadServerResponse, Some(NavigationError::ServerError))]
#[case(FailureCode::CannotConnectToHost, Some(NavigationError::ServerError))]
#[case(FailureCode::HttpStatus(503), Some(NavigationError::ServerError))]
#[case(FailureCode::HttpStatus(404), Some(NavigationError::Unknown("HTTP 404".to_string())))]
#[case(FailureCode::Cancelled, None)]
#[case(
    FailureCode::Other { code: -1202, message: "certificate invalid".to_string() },
    Some(NavigationError::Unknown("certificate invalid".to_string()))
)]
#[case(
    FailureCode::Other { code: -1, message: String::new() },
    Some(NavigationError::Unknown("Navigation failed (code -1)".to_string()))
)]
fn test_classify_failure(#[case] code: FailureCode, #[case] expected: Option<NavigationError>) {
    assert_eq!(classify_failure(&code), expected);
}

// === Navigation lifecycle ===

#[test]
fn test_start_marks_loading_and_arms_watchdog() {
    let (mut nav, scheduler) = controller();
    let home = home_id(&nav);

    nav.on_navigation_started(&home, Some("https://drive.google.com/drive/u/0/home"))
        .unwrap();

    let tab = nav.selected_tab().unwrap();
    assert!(tab.loading);
    assert_eq!(tab.state, NavigationState::Loading);
    assert!(nav.has_watchdog(&home));
    assert_eq!(scheduler.scheduled_count(), 1);
    assert_eq!(scheduler.last_delay(), Duration::from_secs(10));
    assert_eq!(watchdog_parts(&scheduler.last_event()).0, home);
}

#[test]
fn test_finish_on_home_marks_home_loaded_and_disarms() {
    let (mut nav, scheduler) = controller();
    let home = home_id(&nav);
    nav.on_navigation_started(&home, None).unwrap();

    nav.on_navigation_finished(&home, None, Some("  My Drive - Google Drive "))
        .unwrap();

    assert!(nav.home_loaded());
    assert!(!nav.has_watchdog(&home));
    assert!(scheduler.is_cancelled(0));
    let tab = nav.selected_tab().unwrap();
    assert!(!tab.loading);
    assert_eq!(tab.state, NavigationState::Loaded);
    assert_eq!(tab.title, "My Drive - Google Drive");
}

#[test]
fn test_finish_with_blank_title_keeps_old_title() {
    let (mut nav, _scheduler) = controller();
    let home = home_id(&nav);
    nav.on_navigation_finished(&home, None, Some("   ")).unwrap();
    assert_eq!(nav.selected_tab().unwrap().title, "Google Drive");
}

#[test]
fn test_finish_on_secondary_tab_does_not_mark_home_loaded() {
    let (mut nav, _scheduler) = controller();
    let tab = nav.add_tab(Some("https://docs.google.com/document/d/1"), None);
    nav.on_navigation_finished(&tab, None, Some("Notes")).unwrap();
    assert!(!nav.home_loaded());
}

#[test]
fn test_mark_home_loaded_only_flips_once() {
    let (mut nav, _scheduler) = controller();
    assert!(nav.mark_home_loaded());
    assert!(!nav.mark_home_loaded());
    assert!(nav.home_loaded());
}

#[test]
fn test_failure_sets_selected_error() {
    let (mut nav, scheduler) = controller();
    let home = home_id(&nav);
    nav.on_navigation_started(&home, None).unwrap();

    nav.on_navigation_failed(&home, &FailureCode::NotConnectedToInternet, true)
        .unwrap();

    assert_eq!(nav.current_error(), Some(&NavigationError::NoConnectivity));
    assert!(!nav.selected_tab().unwrap().loading);
    assert!(scheduler.is_cancelled(0));
}

#[test]
fn test_cancelled_failure_is_ignored() {
    let (mut nav, _scheduler) = controller();
    let home = home_id(&nav);
    nav.on_navigation_started(&home, None).unwrap();

    nav.on_navigation_failed(&home, &FailureCode::Cancelled, true)
        .unwrap();

    assert!(nav.current_error().is_none());
    assert_eq!(nav.selected_tab().unwrap().state, NavigationState::Loading);
    assert!(nav.has_watchdog(&home));
}

#[test]
fn test_error_follows_selected_tab() {
    let (mut nav, _scheduler) = controller();
    let home = home_id(&nav);
    let other = nav.add_tab(None, None);
    nav.on_navigation_failed(&other, &FailureCode::HttpStatus(502), false)
        .unwrap();
    assert_eq!(nav.current_error(), Some(&NavigationError::ServerError));

    nav.select_tab(&home).unwrap();
    assert!(nav.current_error().is_none());
}

#[test]
fn test_events_for_unknown_tab_are_errors() {
    let (mut nav, _scheduler) = controller();
    assert!(nav.on_navigation_started("gone", None).is_err());
    assert!(nav.on_navigation_finished("gone", None, None).is_err());
    assert!(nav
        .on_navigation_failed("gone", &FailureCode::TimedOut, true)
        .is_err());
}

// === Watchdog ===

#[test]
fn test_watchdog_fires_no_connectivity_before_home_loads() {
    let (mut nav, scheduler) = controller();
    let home = home_id(&nav);
    nav.on_navigation_started(&home, None).unwrap();
    let (tab_id, generation) = watchdog_parts(&scheduler.last_event());

    nav.on_watchdog_fired(&tab_id, generation);

    assert_eq!(nav.current_error(), Some(&NavigationError::NoConnectivity));
    assert!(!nav.selected_tab().unwrap().loading);
    assert!(!nav.has_watchdog(&home));
}

#[test]
fn test_stale_watchdog_generation_is_ignored() {
    let (mut nav, scheduler) = controller();
    let home = home_id(&nav);
    nav.on_navigation_started(&home, None).unwrap();
    let (_, first) = watchdog_parts(&scheduler.last_event());
    nav.on_navigation_started(&home, None).unwrap();
    assert!(scheduler.is_cancelled(0));

    nav.on_watchdog_fired(&home, first);

    assert!(nav.current_error().is_none());
    assert!(nav.has_watchdog(&home));
    assert_eq!(scheduler.live_count(), 1);
}

#[test]
fn test_watchdog_after_settle_is_ignored() {
    let (mut nav, scheduler) = controller();
    let home = home_id(&nav);
    nav.on_navigation_started(&home, None).unwrap();
    let (_, generation) = watchdog_parts(&scheduler.last_event());
    nav.on_navigation_finished(&home, None, None).unwrap();

    nav.on_watchdog_fired(&home, generation);

    assert!(nav.current_error().is_none());
}

#[test]
fn test_watchdog_is_silent_once_home_has_loaded() {
    let (mut nav, scheduler) = controller();
    let home = home_id(&nav);
    nav.on_navigation_finished(&home, None, None).unwrap();
    let tab = nav.add_tab(None, None);
    nav.on_navigation_started(&tab, None).unwrap();
    let (_, generation) = watchdog_parts(&scheduler.last_event());

    nav.on_watchdog_fired(&tab, generation);

    assert!(nav.current_error().is_none());
    assert!(nav.selected_tab().unwrap().loading);
    assert!(!nav.has_watchdog(&tab));
}

#[test]
fn test_close_tab_disarms_its_watchdog() {
    let (mut nav, scheduler) = controller();
    let tab = nav.add_tab(None, None);
    nav.on_navigation_started(&tab, None).unwrap();

    assert!(nav.close_tab(&tab).unwrap());

    assert!(!nav.has_watchdog(&tab));
    assert!(scheduler.is_cancelled(0));
}

#[test]
fn test_watchdogs_are_per_tab() {
    let (mut nav, scheduler) = controller();
    let home = home_id(&nav);
    let tab = nav.add_tab(None, None);
    nav.on_navigation_started(&home, None).unwrap();
    nav.on_navigation_started(&tab, None).unwrap();

    nav.on_navigation_finished(&tab, None, None).unwrap();

    assert!(nav.has_watchdog(&home));
    assert!(!nav.has_watchdog(&tab));
    assert!(!scheduler.is_cancelled(0));
    assert!(scheduler.is_cancelled(1));
}

#[test]
fn test_abandoned_navigation_settles_tab() {
    let (mut nav, scheduler) = controller();
    let tab = nav.add_tab(None, None);
    nav.on_navigation_started(&tab, None).unwrap();

    nav.abandon_navigation(&tab).unwrap();

    let t = nav.tabs().get_tab(&tab).unwrap();
    assert!(!t.loading);
    assert_eq!(t.state, NavigationState::Idle);
    assert!(!nav.has_watchdog(&tab));
    assert!(scheduler.is_cancelled(0));
}

#[test]
fn test_abandon_keeps_loaded_and_errored_state() {
    let (mut nav, _scheduler) = controller();
    let home = home_id(&nav);
    nav.on_navigation_failed(&home, &FailureCode::TimedOut, true)
        .unwrap();

    nav.abandon_navigation(&home).unwrap();

    assert_eq!(nav.current_error(), Some(&NavigationError::Timeout));
    assert!(nav.abandon_navigation("missing").is_err());
}

// === Retry and popups ===

#[test]
fn test_retry_reloads_selected_tab_and_clears_error() {
    let (mut nav, scheduler) = controller();
    let home = home_id(&nav);
    nav.on_navigation_failed(&home, &FailureCode::TimedOut, true)
        .unwrap();
    assert_eq!(nav.current_error(), Some(&NavigationError::Timeout));

    let command = nav.retry().unwrap();

    assert_eq!(
        command,
        ShellCommand::LoadUrl {
            tab_id: home.clone(),
            url: "https://drive.google.com/drive/u/0/home".to_string(),
        }
    );
    assert!(nav.current_error().is_none());
    assert!(nav.selected_tab().unwrap().loading);
    assert!(nav.has_watchdog(&home));
    assert_eq!(scheduler.live_count(), 1);
}

#[test]
fn test_new_window_request_opens_tab() {
    let (mut nav, _scheduler) = controller();
    let url = "https://docs.google.com/document/d/xyz/edit";

    let ShellCommand::LoadUrl { tab_id, url: loaded } = nav.on_new_window_requested(url);

    assert_eq!(loaded, url);
    assert_eq!(nav.selected_tab_id(), Some(tab_id.as_str()));
    assert_eq!(nav.tabs().tab_count(), 2);
    assert_eq!(nav.selected_tab().unwrap().url, url);
}

#[test]
fn test_subframe_editor_navigation_opens_new_tab() {
    let (mut nav, _scheduler) = controller();
    let action = NavigationAction {
        url: "https://docs.google.com/spreadsheets/d/1/edit".to_string(),
        main_frame: false,
    };

    let decision = nav.decide_navigation(&action);

    match decision {
        NavigationDecision::OpenedInNewTab { tab_id, url } => {
            assert_eq!(url, action.url);
            assert_eq!(nav.selected_tab_id(), Some(tab_id.as_str()));
        }
        other => panic!("expected new tab, got {:?}", other),
    }
}

#[rstest]
#[case("https://docs.google.com/document/d/1/edit", true)]
#[case("https://drive.google.com/drive/folders/abc", false)]
#[case("https://accounts.google.com/signin", false)]
fn test_other_navigations_are_allowed(#[case] url: &str, #[case] main_frame: bool) {
    let (mut nav, _scheduler) = controller();
    let action = NavigationAction {
        url: url.to_string(),
        main_frame,
    };
    assert_eq!(nav.decide_navigation(&action), NavigationDecision::Allow);
    assert_eq!(nav.tabs().tab_count(), 1);
}

#[test]
fn test_download_response_settles_tab() {
    let (mut nav, scheduler) = controller();
    let home = home_id(&nav);
    nav.on_navigation_started(&home, None).unwrap();
    let info = ResponseInfo {
        url: "https://drive.usercontent.google.com/download?id=1".to_string(),
        content_type: Some("application/pdf".to_string()),
        content_disposition: Some("attachment; filename=\"Q3.pdf\"".to_string()),
        suggested_file_name: None,
    };

    let decision = nav.decide_response(&home, &info);

    assert_eq!(
        decision,
        ResponseDecision::Download {
            url: info.url.clone(),
            file_name: "Q3.pdf".to_string(),
        }
    );
    let tab = nav.selected_tab().unwrap();
    assert!(!tab.loading);
    assert_eq!(tab.state, NavigationState::Loaded);
    assert!(scheduler.is_cancelled(0));
}

#[test]
fn test_page_response_is_rendered() {
    let (mut nav, _scheduler) = controller();
    let home = home_id(&nav);
    nav.on_navigation_started(&home, None).unwrap();
    let info = ResponseInfo {
        url: "https://drive.google.com/drive/u/0/home".to_string(),
        content_type: Some("text/html; charset=utf-8".to_string()),
        ..ResponseInfo::default()
    };

    assert_eq!(nav.decide_response(&home, &info), ResponseDecision::Render);
    assert!(nav.has_watchdog(&home));
}
