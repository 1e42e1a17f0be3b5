//! Scenario tests for page-view dedup, session anchoring and preloader gating.
//!
//! All scenarios run on virtual time (`ManualClock`) over an in-memory tab.

use std::time::Duration;
use tabtrack::clock::ManualClock;
use tabtrack::model::{LoadKind, NavigationKind, PageKey};
use tabtrack::navigation::StaticNavigation;
use tabtrack::store::{keys, DetachedStore, MemoryStore, TabStore};
use tabtrack::{EngagementTracker, MountOutcome, PageViewMount, TrackOptions};

const TTL: Duration = Duration::from_millis(1000);

fn key(locale: &str, id: &str) -> PageKey {
    PageKey::new(id, Some(locale)).expect("valid page key")
}

fn tab() -> EngagementTracker<MemoryStore, ManualClock> {
    EngagementTracker::new(MemoryStore::new(), ManualClock::new(0), TTL)
}

// ===== Dedup timeline =====

#[test]
fn concrete_timeline_with_one_second_ttl() {
    // GIVEN ttl = 1000ms on a fresh tab
    let tab = tab();
    let dedup = tab.deduplicator();
    let vi42 = key("vi", "42");

    // t=0: first view counts
    assert!(dedup.record_view(&vi42, TTL));

    // t=500: still within TTL
    tab.clock().set(500);
    assert!(!dedup.record_view(&vi42, TTL));

    // t=1001: marker and session lapsed, counts again
    tab.clock().set(1001);
    assert!(dedup.record_view(&vi42, TTL));

    // and the freshly written marker is honoured immediately
    assert!(dedup.has_valid_marker(&vi42));
}

#[test]
fn idempotent_within_ttl() {
    let tab = tab();
    let dedup = tab.deduplicator();
    let page = key("en", "about");

    assert!(dedup.record_view(&page, TTL));
    tab.clock().set(999);
    assert!(!dedup.record_view(&page, TTL));
}

#[test]
fn rearms_after_expiry() {
    let tab = tab();
    let dedup = tab.deduplicator();
    let page = key("en", "about");

    assert!(dedup.record_view(&page, TTL));
    tab.clock().advance(TTL + Duration::from_millis(1));
    assert!(dedup.record_view(&page, TTL));
}

#[test]
fn keys_in_different_locales_are_isolated() {
    let tab = tab();
    let dedup = tab.deduplicator();

    assert!(dedup.record_view(&key("vi", "42"), TTL));
    assert!(dedup.record_view(&key("en", "42"), TTL));
    assert!(!dedup.record_view(&key("vi", "42"), TTL));
    assert!(!dedup.record_view(&key("en", "42"), TTL));
}

// ===== Session anchoring =====

#[test]
fn session_expiry_forces_recount_before_marker_ttl() {
    // GIVEN a short session and a long-lived marker created under it
    let tab = tab();
    tab.sessions().create(Duration::from_millis(100));
    let long = Duration::from_secs(60);
    let page = key("vi", "42");
    assert!(tab.deduplicator().record_view(&page, long));

    // WHEN the session lapses while the marker's own TTL has not
    tab.clock().set(200);

    // THEN the view counts again
    assert!(tab.deduplicator().record_view(&page, long));
}

#[test]
fn session_expiry_invalidates_every_marker() {
    let tab = tab();
    let dedup = tab.deduplicator();
    for id in ["1", "2", "3"] {
        dedup.record_view(&key("en", id), TTL);
    }

    tab.clock().set(1001);
    assert!(!tab.sessions().is_valid());
    assert!(dedup.markers().is_empty());
}

// ===== Preloader =====

#[test]
fn preloader_decision_table_through_document_loads() {
    let cases = [
        (LoadKind::Navigate, NavigationKind::FreshEntry, true),
        (LoadKind::Reload, NavigationKind::Reload, true),
        (LoadKind::BackForward, NavigationKind::HistoryNav, false),
    ];
    for (load, expected_kind, expected_show) in cases {
        let tab = tab();
        let decision = tab.on_document_load(&StaticNavigation::in_tab(load));
        assert_eq!(decision.kind, expected_kind, "{load:?}");
        assert_eq!(decision.show, expected_show, "{load:?}");
    }
}

#[test]
fn intra_app_navigation_skips_preloader() {
    let tab = tab();
    let navigate = StaticNavigation::in_tab(LoadKind::Navigate);
    assert!(tab.on_document_load(&navigate).show);

    let decision = tab.on_document_load(&navigate);
    assert_eq!(decision.kind, NavigationKind::IntraApp);
    assert!(!decision.show);
}

#[test]
fn locale_switch_trigger_is_consumed_by_one_load() {
    let tab = tab();
    let back = StaticNavigation::in_tab(LoadKind::BackForward);
    tab.locale_switch().raise("en");

    let first = tab.on_document_load(&back);
    assert_eq!(first.kind, NavigationKind::AppTriggered);
    assert!(first.show);
    assert!(tab.store().get(keys::LOCALE_SWITCH).is_none());

    let second = tab.on_document_load(&back);
    assert_eq!(second.kind, NavigationKind::HistoryNav);
    assert!(!second.show);
}

#[test]
fn reload_always_shows_preloader_within_session() {
    let tab = tab();
    let reload = StaticNavigation::in_tab(LoadKind::Reload);
    assert!(tab.on_document_load(&reload).show);
    tab.clock().set(10);
    assert!(tab.on_document_load(&reload).show);
}

// ===== Mount tracking =====

#[test]
fn strict_mode_double_mount_fires_once() {
    let tab = tab();
    let mount = PageViewMount::new(TrackOptions::new("42").with_locale("vi"));
    let mut increments = Vec::new();

    for _ in 0..2 {
        mount.run_with(&tab, |key| {
            increments.push(key.to_string());
            Ok::<(), String>(())
        });
    }

    assert_eq!(increments, vec!["vi:42".to_string()]);
}

#[test]
fn soft_navigation_back_to_page_does_not_recount() {
    let tab = tab();
    let article = || PageViewMount::new(TrackOptions::new("42").with_locale("vi"));

    assert!(matches!(article().run(&tab), MountOutcome::NewView(_)));
    // User navigates away and back: a new component instance mounts
    tab.clock().set(300);
    assert!(matches!(
        article().run(&tab),
        MountOutcome::AlreadyCounted(_)
    ));
}

#[test]
fn full_visit_lifecycle() {
    let tab = tab();
    let navigate = StaticNavigation::in_tab(LoadKind::Navigate);

    // First entry: intro plays, article counts
    assert!(tab.on_document_load(&navigate).show);
    let first = PageViewMount::new(TrackOptions::new("7").with_locale("en"));
    assert!(matches!(first.run(&tab), MountOutcome::NewView(_)));

    // Reload within session: intro plays, article does not recount
    tab.clock().set(400);
    assert!(tab
        .on_document_load(&StaticNavigation::in_tab(LoadKind::Reload))
        .show);
    let reloaded = PageViewMount::new(TrackOptions::new("7").with_locale("en"));
    assert!(matches!(
        reloaded.run(&tab),
        MountOutcome::AlreadyCounted(_)
    ));

    // Visit lapses: new visit plays intro again and recounts
    tab.clock().set(1500);
    let lapsed = tab.on_document_load(&navigate);
    assert_eq!(lapsed.kind, NavigationKind::FreshEntry);
    assert!(lapsed.show);
    let later = PageViewMount::new(TrackOptions::new("7").with_locale("en"));
    assert!(matches!(later.run(&tab), MountOutcome::NewView(_)));
}

// ===== Degraded storage =====

#[test]
fn detached_tab_treats_everything_as_new() {
    let tab = EngagementTracker::new(DetachedStore, ManualClock::new(0), TTL);

    let decision = tab.on_document_load(&StaticNavigation::detached());
    assert_eq!(decision.kind, NavigationKind::FreshEntry);
    assert!(decision.show);

    for _ in 0..3 {
        let mount = PageViewMount::new(TrackOptions::new("42").with_locale("vi"));
        assert!(matches!(mount.run(&tab), MountOutcome::NewView(_)));
    }
    assert_eq!(tab.sweep_expired(), 0);
}

#[test]
fn corrupted_payloads_are_cache_misses() {
    let tab = tab();
    tab.store().set(keys::SESSION, "not json".to_string());
    tab.store().set(keys::PAGE_VIEWS, "{\"vi:42\": 5}".to_string());

    let mount = PageViewMount::new(TrackOptions::new("42").with_locale("vi"));
    assert!(matches!(mount.run(&tab), MountOutcome::NewView(_)));
    assert!(tab.sessions().is_valid());
}
