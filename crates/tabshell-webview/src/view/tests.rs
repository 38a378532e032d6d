//! Tests for View lifecycle, event routing and actions.

use super::*;
use crate::testing::RecordingHost;
use std::sync::atomic::{AtomicUsize, Ordering};

fn view(host: &Arc<RecordingHost>, url: &str) -> Arc<View> {
    Arc::new(View::new(
        host.clone(),
        Duration::from_millis(500),
        ViewState::with_url(url),
    ))
}

fn mounted(host: &Arc<RecordingHost>, url: &str) -> Arc<View> {
    let v = view(host, url);
    v.mount(SurfaceOptions::with_url(url)).unwrap();
    v
}

// -- Lifecycle --

#[test]
fn new_view_is_cold() {
    let host = RecordingHost::new();
    let v = view(&host, "https://a.test");
    assert!(!v.is_hot());
    assert!(host.created().is_empty());
}

#[test]
fn mount_creates_surface() {
    let host = RecordingHost::new();
    let v = mounted(&host, "https://a.test");
    assert!(v.is_hot());
    assert_eq!(v.binding_mode(), Some(BindingMode::Created));
    assert_eq!(host.created(), vec![v.id().clone()]);
}

#[test]
fn remount_replaces_live_surface() {
    let host = RecordingHost::new();
    let v = mounted(&host, "https://a.test");
    v.mount(SurfaceOptions::with_url("https://a.test")).unwrap();
    assert_eq!(host.created().len(), 2);
    assert_eq!(host.count_for(v.id(), "DESTROY"), 1);
    assert!(v.is_hot());
}

#[test]
fn failed_create_leaves_view_cold() {
    let host = RecordingHost::new();
    host.fail_creates(true);
    let v = view(&host, "https://a.test");
    assert!(v.mount(SurfaceOptions::with_url("https://a.test")).is_err());
    assert!(!v.is_hot());
}

#[test]
fn mount_fills_empty_url_from_options() {
    let host = RecordingHost::new();
    let v = view(&host, "");
    v.mount(SurfaceOptions::with_url("about:blank")).unwrap();
    assert_eq!(v.url(), "about:blank");
}

#[test]
fn preload_never_shows() {
    let host = RecordingHost::new();
    let v = view(&host, "about:blank");
    v.preload(SurfaceOptions {
        activate: true,
        ..SurfaceOptions::with_url("about:blank")
    })
    .unwrap();
    assert!(v.is_hot());
    assert!(!v.is_shown());
    assert!(!host.create_options(v.id()).unwrap().activate);
}

#[test]
fn attach_mounted_binds_without_create() {
    let host = RecordingHost::new();
    let v = view(&host, "https://a.test");
    v.attach_mounted(None).unwrap();
    assert!(v.is_hot());
    assert_eq!(v.binding_mode(), Some(BindingMode::Attached));
    assert!(host.created().is_empty());
}

#[test]
fn unmount_keeps_state() {
    let host = RecordingHost::new();
    let v = mounted(&host, "https://a.test");
    v.modify(|s| s.title = "A".into());
    assert!(v.unmount());
    assert!(!v.is_hot());
    assert_eq!(v.state().title, "A");
    assert!(!v.unmount());
}

#[test]
fn relocation_guard_survives_unmount_and_is_consumed_by_mount() {
    let host = RecordingHost::new();
    let v = mounted(&host, "https://a.test");
    v.prevent_unmounting_until_next_mount();

    assert!(!v.unmount());
    assert!(v.is_hot());

    v.mount(SurfaceOptions::with_url("https://a.test")).unwrap();
    assert_eq!(host.created().len(), 1, "live surface is re-attached");
    assert!(!v.has_relocation_guard());

    assert!(v.unmount());
}

#[test]
fn destroy_is_idempotent() {
    let host = RecordingHost::new();
    let v = mounted(&host, "https://a.test");
    assert!(v.destroy());
    assert!(!v.destroy());
    assert!(v.is_destroyed());
    assert!(v.state().destroyed);
    assert_eq!(host.count_for(v.id(), "DESTROY"), 1);
    assert!(v.mount(SurfaceOptions::default()).is_err());
}

#[test]
fn destroy_clears_subscribers() {
    let host = RecordingHost::new();
    let v = mounted(&host, "https://a.test");
    v.add_subscriber(|_, _| Interception::Pass, false);
    v.destroy();
    assert_eq!(v.subscriber_count(), 0);
}

// -- Readiness --

#[tokio::test]
async fn wait_until_ready_resolves_on_dom_ready() {
    let host = RecordingHost::new();
    let v = mounted(&host, "https://a.test");
    let waiter = {
        let v = Arc::clone(&v);
        tokio::spawn(async move { v.wait_until_ready(Duration::from_secs(5)).await })
    };
    tokio::task::yield_now().await;
    v.handle_event(&HostEventKind::DomReady);
    assert_eq!(waiter.await.unwrap(), Some(()));
}

#[tokio::test(start_paused = true)]
async fn wait_until_ready_times_out_to_none() {
    let host = RecordingHost::new();
    let v = mounted(&host, "https://a.test");
    assert_eq!(v.wait_until_ready(Duration::from_millis(100)).await, None);
}

#[tokio::test]
async fn destroy_wakes_readiness_waiters() {
    let host = RecordingHost::new();
    let v = mounted(&host, "https://a.test");
    let waiter = {
        let v = Arc::clone(&v);
        tokio::spawn(async move { v.wait_until_ready(Duration::from_secs(60)).await })
    };
    tokio::task::yield_now().await;
    v.destroy();
    v.destroy();
    assert_eq!(waiter.await.unwrap(), None);
}

#[tokio::test(start_paused = true)]
async fn highlight_selection_times_out_silently() {
    let host = RecordingHost::new();
    let v = mounted(&host, "https://a.test");
    assert!(!v.highlight_selection(&SelectionData::new("x")).await);
    assert_eq!(host.count_for(v.id(), "SEND"), 0);
}

#[tokio::test]
async fn highlight_selection_detects_app_then_sends() {
    let host = RecordingHost::new();
    let v = mounted(&host, "https://github.com/tokio-rs/tokio");
    v.handle_event(&HostEventKind::DomReady);

    assert!(v.highlight_selection(&SelectionData::new("spawn")).await);
    assert_eq!(v.state().detected_app.unwrap().kind, AppKind::Github);
    let sent = host.actions_for(v.id());
    assert!(sent.iter().any(|a| matches!(
        a,
        HostAction::Send { channel, .. } if channel == crate::ipc::channels::HIGHLIGHT_SELECTION
    )));
}

// -- Event routing --

#[test]
fn events_update_state_and_report_changes() {
    let host = RecordingHost::new();
    let v = mounted(&host, "https://a.test");
    let mut rx = v.subscribe();
    rx.borrow_and_update();

    let update = v.handle_event(&HostEventKind::PageTitleUpdated { title: "A".into() });
    assert!(update.changed);
    assert!(rx.has_changed().unwrap());
    assert_eq!(v.state().title, "A");
}

#[test]
fn events_for_cold_views_are_dropped() {
    let host = RecordingHost::new();
    let v = view(&host, "https://a.test");
    let update = v.handle_event(&HostEventKind::DomReady);
    assert!(!update.changed);
    assert!(!v.state().dom_ready);
}

#[test]
fn consuming_subscriber_vetoes_default_handling() {
    let host = RecordingHost::new();
    let v = mounted(&host, "https://a.test");
    v.add_subscriber(
        |kind, _| match kind {
            HostEventKind::PageTitleUpdated { .. } => Interception::Consume,
            _ => Interception::Pass,
        },
        true,
    );

    let update = v.handle_event(&HostEventKind::PageTitleUpdated { title: "A".into() });
    assert!(update.consumed);
    assert_eq!(v.state().title, "");

    v.handle_event(&HostEventKind::PageTitleUpdated { title: "B".into() });
    assert_eq!(v.state().title, "B");
}

#[test]
fn subscribers_see_state_before_default_handling() {
    let host = RecordingHost::new();
    let v = mounted(&host, "https://a.test");
    let seen = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&seen);
    v.add_subscriber(
        move |_, state| {
            if state.title.is_empty() {
                counter.fetch_add(1, Ordering::SeqCst);
            }
            Interception::Pass
        },
        false,
    );
    v.handle_event(&HostEventKind::PageTitleUpdated { title: "A".into() });
    v.handle_event(&HostEventKind::PageTitleUpdated { title: "B".into() });
    assert_eq!(seen.load(Ordering::SeqCst), 1);
}

#[test]
fn fatal_failure_hides_surface_without_destroying() {
    let host = RecordingHost::new();
    let v = mounted(&host, "https://a.test");
    v.show();
    v.handle_event(&HostEventKind::DidFailLoad {
        code: -105,
        description: "NAME_NOT_RESOLVED".into(),
        url: "https://a.test".into(),
        is_main_frame: true,
    });
    assert!(v.is_hot());
    assert!(v.state().failed);
    assert_eq!(host.actions_for(v.id()).last(), Some(&HostAction::Hide));

    v.handle_event(&HostEventKind::DidStartLoading);
    assert_eq!(host.actions_for(v.id()).last(), Some(&HostAction::Activate));
}

#[test]
fn render_process_gone_makes_view_cold() {
    let host = RecordingHost::new();
    let v = mounted(&host, "https://a.test");
    let update = v.handle_event(&HostEventKind::RenderProcessGone {
        reason: "crashed".into(),
    });
    assert!(update.signals.contains(&BindingSignal::SurfaceGone));
    assert!(!v.is_hot());
    assert!(!v.is_destroyed());
}

#[test]
fn events_after_destroy_are_ignored() {
    let host = RecordingHost::new();
    let v = mounted(&host, "https://a.test");
    v.destroy();
    let update = v.handle_event(&HostEventKind::DomReady);
    assert!(!update.changed);
}

// -- Actions --

#[test]
fn actions_on_cold_view_return_false() {
    let host = RecordingHost::new();
    let v = view(&host, "https://a.test");
    assert!(!v.navigate("https://b.test"));
    assert!(!v.reload());
    assert!(!v.focus());
    assert!(!v.go_back());
    assert!(!v.set_bounds(Rect::new(0.0, 0.0, 10.0, 10.0)));
    assert!(host.calls().is_empty());
}

#[tokio::test]
async fn requests_on_cold_view_return_none() {
    let host = RecordingHost::new();
    let v = view(&host, "https://a.test");
    assert_eq!(v.capture_page().await, None);
    assert_eq!(v.fetch_url().await, None);
    assert_eq!(v.is_currently_audible().await, None);
}

#[test]
fn navigate_is_organic() {
    let host = RecordingHost::new();
    let v = mounted(&host, "https://a.test");
    assert!(v.navigate("https://b.test"));
    let update = v.handle_event(&HostEventKind::DidNavigate {
        url: "https://b.test".into(),
        in_page: false,
    });
    assert_eq!(
        update.signals,
        vec![BindingSignal::Visited("https://b.test".into())]
    );
}

#[test]
fn load_programmatic_does_not_add_history() {
    let host = RecordingHost::new();
    let v = mounted(&host, "https://a.test");
    v.handle_event(&HostEventKind::DidNavigate {
        url: "https://a.test".into(),
        in_page: false,
    });
    v.modify(|s| s.history = NavigationHistory::single(HistoryEntry::new("https://a.test", "")));

    assert!(v.load_programmatic("https://b.test"));
    v.handle_event(&HostEventKind::DidNavigate {
        url: "https://b.test".into(),
        in_page: false,
    });
    assert_eq!(v.state().history.len(), 1);
    assert_eq!(v.url(), "https://b.test");
}

#[test]
fn go_back_moves_cursor_when_the_engine_commits() {
    let host = RecordingHost::new();
    let v = mounted(&host, "https://a.test");
    v.modify(|s| s.history = NavigationHistory::single(HistoryEntry::new("https://a.test", "")));
    v.handle_event(&HostEventKind::DidNavigate {
        url: "https://b.test".into(),
        in_page: false,
    });
    assert_eq!(v.state().history.len(), 2);

    assert!(v.go_back());
    assert_eq!(v.state().history.index, 1);
    assert_eq!(host.actions_for(v.id()).last(), Some(&HostAction::GoBack));

    v.handle_event(&HostEventKind::DidNavigate {
        url: "https://a.test".into(),
        in_page: false,
    });
    assert_eq!(v.state().history.index, 0);
    assert_eq!(v.state().history.len(), 2);
    assert!(v.go_forward());
    v.handle_event(&HostEventKind::DidNavigate {
        url: "https://b.test".into(),
        in_page: false,
    });
    assert!(!v.go_forward());
}

#[test]
fn uncommitted_step_does_not_swallow_next_navigation() {
    let host = RecordingHost::new();
    let v = mounted(&host, "https://a.test");
    v.modify(|s| s.history = NavigationHistory::single(HistoryEntry::new("https://a.test", "")));
    v.handle_event(&HostEventKind::DidNavigate {
        url: "https://b.test".into(),
        in_page: false,
    });

    // The engine never commits the step.
    assert!(v.go_back());
    v.navigate("https://c.test");
    let update = v.handle_event(&HostEventKind::DidNavigate {
        url: "https://c.test".into(),
        in_page: false,
    });

    assert_eq!(update.signals, vec![BindingSignal::Visited("https://c.test".into())]);
    let state = v.state();
    let urls: Vec<&str> = state.history.entries.iter().map(|e| e.url.as_str()).collect();
    assert_eq!(urls, vec!["https://a.test", "https://b.test", "https://c.test"]);
    assert_eq!(state.history.index, 2);
}

#[test]
fn mount_hands_history_to_the_surface() {
    let host = RecordingHost::new();
    let mut initial = ViewState::with_url("https://b.test");
    initial.history = NavigationHistory {
        entries: vec![
            HistoryEntry::new("https://a.test", "A"),
            HistoryEntry::new("https://b.test", "B"),
        ],
        index: 1,
    };
    let v = Arc::new(View::new(host.clone(), Duration::from_millis(500), initial.clone()));
    v.mount(SurfaceOptions::with_url("https://b.test")).unwrap();
    assert_eq!(host.create_options(v.id()).unwrap().history, Some(initial.history));

    let single = mounted(&host, "https://c.test");
    assert_eq!(host.create_options(single.id()).unwrap().history, None);
}

#[test]
fn set_bounds_is_remembered() {
    let host = RecordingHost::new();
    let v = mounted(&host, "https://a.test");
    let bounds = Rect::new(0.0, 40.0, 800.0, 600.0);
    assert!(v.set_bounds(bounds));
    assert_eq!(v.bounds(), Some(bounds));
}

#[tokio::test]
async fn capture_snapshot_is_a_png_data_url() {
    let host = RecordingHost::new();
    host.set_capture(vec![1, 2, 3]);
    let v = mounted(&host, "https://a.test");
    let snapshot = v.capture_snapshot().await.unwrap();
    assert_eq!(snapshot, "data:image/png;base64,AQID");
}

#[test]
fn change_permanently_active_notifies_live_page() {
    let host = RecordingHost::new();
    let v = mounted(&host, "https://a.test");
    assert!(v.change_permanently_active(true));
    assert!(!v.change_permanently_active(true));
    assert!(v.is_permanently_active());
    assert_eq!(host.count_for(v.id(), "SEND"), 2);
}

#[test]
fn show_and_hide_toggle_shown() {
    let host = RecordingHost::new();
    let v = mounted(&host, "https://a.test");
    assert!(v.show());
    assert!(v.is_shown());
    assert!(v.hide());
    assert!(!v.hide());
    assert!(!v.is_shown());
}

#[test]
fn debug_output_shows_url_and_binding() {
    let host = RecordingHost::new();
    let v = mounted(&host, "https://a.test");
    let text = format!("{v:?}");
    assert!(text.contains("https://a.test"));
    assert!(text.contains("hot: true"));

    v.unmount();
    assert!(format!("{v:?}").contains("hot: false"));
}
