//! Page-view deduplication.
//!
//! Maps a [`PageKey`] to a bounded-lifetime "already counted" marker and
//! decides whether an increment is owed. All markers live in one JSON blob
//! under [`keys::PAGE_VIEWS`].
//!
//! # Session coupling
//! Every marker is anchored to a live session. `record_view` creates a
//! session when none is valid, and session expiry clears every marker
//! (see [`SessionManager::is_valid`]), so a new visit always re-counts.

use crate::clock::{expiry_after, Clock, Millis};
use crate::model::{MarkerMap, PageKey, PageViewMarker, SessionRecord};
use crate::session::SessionManager;
use crate::store::{keys, read_json, write_json, TabStore};
use std::time::Duration;
use tracing::debug;

/// Decides once per mount whether a page's view counter should be bumped.
#[derive(Debug)]
pub struct Deduplicator<'a, S: ?Sized, C: ?Sized> {
    store: &'a S,
    clock: &'a C,
    sessions: SessionManager<'a, S, C>,
}

impl<'a, S, C> Deduplicator<'a, S, C>
where
    S: TabStore + ?Sized,
    C: Clock + ?Sized,
{
    /// Deduplicator over a tab store and clock.
    pub fn new(store: &'a S, clock: &'a C) -> Self {
        Self {
            store,
            clock,
            sessions: SessionManager::new(store, clock),
        }
    }

    /// Snapshot of all stored markers, expired ones included.
    pub fn markers(&self) -> MarkerMap {
        read_json(self.store, keys::PAGE_VIEWS).unwrap_or_default()
    }

    fn save(&self, markers: &MarkerMap) {
        if markers.is_empty() {
            self.store.remove(keys::PAGE_VIEWS);
        } else {
            write_json(self.store, keys::PAGE_VIEWS, markers);
        }
    }

    /// Whether `key` has an unexpired marker. An expired one is deleted.
    pub fn has_valid_marker(&self, key: &PageKey) -> bool {
        let mut markers = self.markers();
        let Some(marker) = markers.get(key.as_str()) else {
            return false;
        };

        if marker.is_live_at(self.clock.now_millis()) {
            return true;
        }

        markers.remove(key.as_str());
        self.save(&markers);
        false
    }

    /// Record a view of `key`.
    ///
    /// Returns `true` when this is a new view the caller should count, and
    /// `false` when the page was already counted within its marker's
    /// lifetime. The marker is written before returning `true`.
    ///
    /// There is no yield point between the check and the write, so two
    /// mounts racing for the same key in one turn cannot both see a miss.
    pub fn record_view(&self, key: &PageKey, ttl: Duration) -> bool {
        self.ensure_session(ttl);

        if self.has_valid_marker(key) {
            debug!(page = %key, "Page view already counted");
            return false;
        }

        let now = self.clock.now_millis();
        let mut markers = self.markers();
        markers.insert(
            key.as_str().to_string(),
            PageViewMarker {
                viewed_at: now,
                expires_at: expiry_after(now, ttl),
            },
        );
        self.save(&markers);
        debug!(page = %key, "New page view recorded");
        true
    }

    /// The live session, or a new one lasting `ttl`.
    ///
    /// Markers that survive a session being (re)created have their expiry
    /// pushed forward to the new session's. Every component that starts a
    /// session goes through here.
    pub fn ensure_session(&self, ttl: Duration) -> SessionRecord {
        if self.sessions.is_valid() {
            if let Some(session) = self.sessions.get_session() {
                return session;
            }
        }

        let session = self.sessions.create(ttl);
        self.extend_live_markers(session.expires_at);
        session
    }

    /// Delete every expired marker. Returns how many were removed.
    ///
    /// Not needed for correctness; expired markers are inert and are also
    /// removed lazily on read.
    pub fn sweep_expired(&self) -> usize {
        let now = self.clock.now_millis();
        let mut markers = self.markers();
        let before = markers.len();
        markers.retain(|_, marker| marker.is_live_at(now));

        let removed = before - markers.len();
        if removed > 0 {
            self.save(&markers);
        }
        debug!(removed, remaining = markers.len(), "Swept expired page-view markers");
        removed
    }

    /// Push surviving markers' expiry forward to a newly created session's.
    ///
    /// Only reachable when markers outlive their session record (e.g. the
    /// record was lost or corrupted), since session expiry clears markers.
    fn extend_live_markers(&self, until: Millis) {
        let now = self.clock.now_millis();
        let mut markers = self.markers();
        let mut changed = false;
        for marker in markers.values_mut() {
            if marker.is_live_at(now) && marker.expires_at < until {
                marker.expires_at = until;
                changed = true;
            }
        }
        if changed {
            self.save(&markers);
        }
    }
}
