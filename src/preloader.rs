//! Intro animation gating.

use crate::clock::Clock;
use crate::dedup::Deduplicator;
use crate::model::NavigationKind;
use crate::navigation::{NavigationClassifier, NavigationContext};
use crate::session::SessionManager;
use crate::store::{keys, TabStore};
use serde::Serialize;
use std::time::Duration;
use tracing::debug;

/// Outcome of one document load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PreloaderDecision {
    /// Why the document loaded.
    pub kind: NavigationKind,
    /// Whether the intro plays.
    pub show: bool,
}

/// Decision table for the intro animation.
///
/// | kind            | show |
/// |-----------------|------|
/// | `AppTriggered`  | yes  |
/// | `Reload`        | yes  |
/// | `HistoryNav`    | no   |
/// | `FreshEntry`    | yes  |
/// | `IntraApp`      | no   |
pub fn should_show(kind: NavigationKind) -> bool {
    match kind {
        NavigationKind::AppTriggered | NavigationKind::Reload | NavigationKind::FreshEntry => true,
        NavigationKind::HistoryNav | NavigationKind::IntraApp => false,
    }
}

/// Decides once per page load whether the intro animation runs.
#[derive(Debug)]
pub struct PreloaderGate<'a, S: ?Sized, C: ?Sized> {
    store: &'a S,
    sessions: SessionManager<'a, S, C>,
    dedup: Deduplicator<'a, S, C>,
}

impl<'a, S, C> PreloaderGate<'a, S, C>
where
    S: TabStore + ?Sized,
    C: Clock + ?Sized,
{
    /// Gate over a tab store and clock.
    pub fn new(store: &'a S, clock: &'a C) -> Self {
        Self {
            store,
            sessions: SessionManager::new(store, clock),
            dedup: Deduplicator::new(store, clock),
        }
    }

    /// See [`should_show`].
    pub fn should_show(&self, kind: NavigationKind) -> bool {
        should_show(kind)
    }

    /// Record that the intro played in this tab. Never expires on its own;
    /// only a full tracking reset clears it.
    pub fn mark_shown(&self) {
        self.store.set(keys::PRELOADER_SHOWN, "1".to_string());
    }

    /// Whether the intro already played in this tab.
    pub fn was_shown(&self) -> bool {
        self.store.get(keys::PRELOADER_SHOWN).is_some()
    }

    /// Run the full per-load procedure.
    ///
    /// Validates the session first, so an expired visit has its state
    /// cleared and classifies as a fresh entry. When the intro shows, the
    /// shown marker is written and a session is ensured for `ttl` (see
    /// [`Deduplicator::ensure_session`]).
    ///
    /// Call exactly once per full document load: classification consumes a
    /// pending locale-switch signal.
    pub fn on_document_load(&self, ctx: &dyn NavigationContext, ttl: Duration) -> PreloaderDecision {
        self.sessions.expire_if_lapsed();

        let kind = NavigationClassifier::new(self.store).classify(ctx);
        let show = should_show(kind);
        if show {
            self.mark_shown();
            self.dedup.ensure_session(ttl);
        }

        debug!(%kind, show, "Preloader decision");
        PreloaderDecision { kind, show }
    }
}
