//! Mount-time page-view tracking.
//!
//! [`EngagementTracker`] bundles a tab store, a clock and the default TTL,
//! and hands out the individual components. [`PageViewMount`] is what a
//! page or article view holds for its lifetime: it makes at most one dedup
//! decision, on first mount, however often the view re-renders.

use crate::clock::{Clock, Millis};
use crate::dedup::Deduplicator;
use crate::model::{MarkerMap, PageKey, SessionRecord};
use crate::navigation::{LocaleSwitchSignal, NavigationClassifier, NavigationContext};
use crate::preloader::{PreloaderDecision, PreloaderGate};
use crate::session::{clear_tracking_state, SessionManager};
use crate::store::TabStore;
use serde::Serialize;
use std::cell::Cell;
use std::fmt::Display;
use std::time::Duration;
use tracing::{info, warn};

/// Default lifetime of sessions and page-view markers: 30 minutes.
pub const DEFAULT_TTL: Duration = Duration::from_secs(30 * 60);

/// Entry point owning the tab store and clock for one tab.
#[derive(Debug)]
pub struct EngagementTracker<S, C> {
    store: S,
    clock: C,
    ttl: Duration,
}

impl<S: TabStore, C: Clock> EngagementTracker<S, C> {
    /// Tracker whose sessions and markers last `ttl` unless a mount overrides it.
    pub fn new(store: S, clock: C, ttl: Duration) -> Self {
        Self { store, clock, ttl }
    }

    /// Tracker using [`DEFAULT_TTL`].
    pub fn with_default_ttl(store: S, clock: C) -> Self {
        Self::new(store, clock, DEFAULT_TTL)
    }

    /// Default TTL for sessions and markers.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// The tab store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// The clock.
    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Session manager for this tab.
    pub fn sessions(&self) -> SessionManager<'_, S, C> {
        SessionManager::new(&self.store, &self.clock)
    }

    /// Page-view deduplicator for this tab.
    pub fn deduplicator(&self) -> Deduplicator<'_, S, C> {
        Deduplicator::new(&self.store, &self.clock)
    }

    /// Preloader gate for this tab.
    pub fn preloader(&self) -> PreloaderGate<'_, S, C> {
        PreloaderGate::new(&self.store, &self.clock)
    }

    /// Navigation classifier for this tab.
    pub fn classifier(&self) -> NavigationClassifier<'_, S> {
        NavigationClassifier::new(&self.store)
    }

    /// Locale-switch signal slot for this tab.
    pub fn locale_switch(&self) -> LocaleSwitchSignal<'_, S> {
        LocaleSwitchSignal::new(&self.store)
    }

    /// Per-document-load preloader decision using the tracker's TTL.
    pub fn on_document_load(&self, ctx: &dyn NavigationContext) -> PreloaderDecision {
        self.preloader().on_document_load(ctx, self.ttl)
    }

    /// Opportunistic cleanup, typically once per app initialisation.
    pub fn sweep_expired(&self) -> usize {
        self.deduplicator().sweep_expired()
    }

    /// Clear the session, all page-view markers and the preloader flag.
    pub fn reset_all(&self) {
        clear_tracking_state(&self.store);
        info!("Tracking state reset");
    }

    /// Read-only view of everything stored for this tab.
    ///
    /// Unlike [`SessionManager::is_valid`], this never clears expired state.
    pub fn snapshot(&self) -> TrackingSnapshot {
        let now = self.clock.now_millis();
        let session = self.sessions().get_session();
        TrackingSnapshot {
            now,
            session_live: session.as_ref().is_some_and(|s| s.is_live_at(now)),
            session,
            preloader_shown: self.preloader().was_shown(),
            pending_locale_switch: self.locale_switch().is_pending(),
            page_views: self.deduplicator().markers(),
        }
    }
}

/// Point-in-time dump of a tab's tracking state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackingSnapshot {
    /// Clock reading the snapshot was taken at.
    pub now: Millis,
    /// Stored session, expired or not.
    pub session: Option<SessionRecord>,
    /// Whether that session is live at `now`.
    pub session_live: bool,
    /// Whether the intro already played.
    pub preloader_shown: bool,
    /// Whether a locale switch awaits the next load.
    pub pending_locale_switch: bool,
    /// All markers, expired ones included.
    pub page_views: MarkerMap,
}

/// Inputs of one tracked page view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackOptions {
    /// Page identifier; empty skips tracking.
    pub page_id: String,
    /// Locale prefix of the page key.
    pub locale: Option<String>,
    /// Marker lifetime; `None` uses the tracker's TTL.
    pub ttl: Option<Duration>,
    /// When false the mount is skipped.
    pub enabled: bool,
}

impl TrackOptions {
    /// Enabled tracking of `page_id` with no locale and the tracker TTL.
    pub fn new(page_id: impl Into<String>) -> Self {
        Self {
            page_id: page_id.into(),
            locale: None,
            ttl: None,
            enabled: true,
        }
    }

    /// Set the locale prefix.
    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = Some(locale.into());
        self
    }

    /// Override the marker lifetime for this page.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = Some(ttl);
        self
    }

    /// Enable or disable tracking.
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }
}

/// What a mount run did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MountOutcome {
    /// Empty page id or tracking disabled. The latch stays open.
    Skipped,
    /// This instance already made its decision.
    AlreadyRan,
    /// Counted earlier within the marker lifetime; no callback.
    AlreadyCounted(PageKey),
    /// New view; the callback (if any) was invoked.
    NewView(PageKey),
}

/// Tracking state of one component instance.
///
/// The latch lives only as long as this value and is never persisted, so a
/// fresh mount of the same page gets a fresh decision (which the marker map
/// then dedups).
#[derive(Debug)]
pub struct PageViewMount {
    options: TrackOptions,
    ran: Cell<bool>,
}

impl PageViewMount {
    /// Fresh instance that has not decided yet.
    pub fn new(options: TrackOptions) -> Self {
        Self {
            options,
            ran: Cell::new(false),
        }
    }

    /// Current inputs.
    pub fn options(&self) -> &TrackOptions {
        &self.options
    }

    /// Prop change. Has no effect once the instance has run.
    pub fn set_options(&mut self, options: TrackOptions) {
        self.options = options;
    }

    /// Whether this instance already made its one decision.
    pub fn has_run(&self) -> bool {
        self.ran.get()
    }

    /// Mount without a side effect.
    pub fn run<S: TabStore, C: Clock>(&self, tracker: &EngagementTracker<S, C>) -> MountOutcome {
        self.run_with(tracker, |_| Ok::<(), std::convert::Infallible>(()))
    }

    /// Mount, invoking `on_new_view` with the page key when a new view is
    /// recorded.
    ///
    /// The marker is written before `on_new_view` runs. A callback error is
    /// logged and dropped; neither an error nor a panic in the callback can
    /// cause the same view to be counted again.
    pub fn run_with<S, C, F, E>(
        &self,
        tracker: &EngagementTracker<S, C>,
        on_new_view: F,
    ) -> MountOutcome
    where
        S: TabStore,
        C: Clock,
        F: FnOnce(&PageKey) -> Result<(), E>,
        E: Display,
    {
        if self.ran.get() {
            return MountOutcome::AlreadyRan;
        }
        if !self.options.enabled {
            return MountOutcome::Skipped;
        }
        let Ok(key) = PageKey::new(&self.options.page_id, self.options.locale.as_deref()) else {
            return MountOutcome::Skipped;
        };

        self.ran.set(true);
        let ttl = self.options.ttl.unwrap_or(tracker.ttl());
        if !tracker.deduplicator().record_view(&key, ttl) {
            return MountOutcome::AlreadyCounted(key);
        }

        if let Err(e) = on_new_view(&key) {
            warn!(page = %key, error = %e, "New-view callback failed");
        }
        MountOutcome::NewView(key)
    }
}

#[cfg(test)]
#[path = "tracker_tests.rs"]
mod tests;
