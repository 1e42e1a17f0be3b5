//! Visit session management.
//!
//! A session is a coarse "this tab is actively engaged" window with an
//! absolute expiry. It is a TTL anchor, not an authentication concept.
//! Letting it expire models the user starting a new visit: the intro plays
//! again and every page-view marker is forgotten.

use crate::clock::{expiry_after, Clock, Millis};
use crate::model::{SessionId, SessionRecord};
use crate::store::{keys, read_json, write_json, TabStore};
use std::time::Duration;
use tracing::debug;

/// Owner of the single session record in a tab store.
///
/// # Invariant
/// At most one non-expired [`SessionRecord`] exists at any instant: `create`
/// overwrites unconditionally.
#[derive(Debug)]
pub struct SessionManager<'a, S: ?Sized, C: ?Sized> {
    store: &'a S,
    clock: &'a C,
}

impl<'a, S, C> SessionManager<'a, S, C>
where
    S: TabStore + ?Sized,
    C: Clock + ?Sized,
{
    /// Manager over a tab store and clock.
    pub fn new(store: &'a S, clock: &'a C) -> Self {
        Self { store, clock }
    }

    /// Stored session, if present and well-formed. Expiry is not checked.
    pub fn get_session(&self) -> Option<SessionRecord> {
        read_json(self.store, keys::SESSION)
    }

    /// Whether a live session exists.
    ///
    /// When the stored session has expired this clears all tracking state
    /// (session, page-view markers, preloader flag) before returning `false`.
    /// An absent session clears nothing.
    pub fn is_valid(&self) -> bool {
        let now = self.clock.now_millis();
        match self.get_session() {
            Some(session) if session.is_live_at(now) => true,
            Some(session) => {
                self.expire(&session, now);
                false
            }
            None => false,
        }
    }

    /// Clear all tracking state if the stored session has lapsed.
    ///
    /// Run at the start of a document load so an expired visit is forgotten
    /// before anything reads the preloader flag or the marker map.
    pub fn expire_if_lapsed(&self) {
        let now = self.clock.now_millis();
        if let Some(session) = self.get_session() {
            if !session.is_live_at(now) {
                self.expire(&session, now);
            }
        }
    }

    fn expire(&self, session: &SessionRecord, now: Millis) {
        debug!(
            session_id = %session.id,
            expired_at = session.expires_at,
            now,
            "Session expired, clearing tracking state"
        );
        clear_tracking_state(self.store);
    }

    /// Start a new session lasting `ttl`, replacing any previous one.
    pub fn create(&self, ttl: Duration) -> SessionRecord {
        let now = self.clock.now_millis();
        let record = SessionRecord {
            id: SessionId::generate(),
            created_at: now,
            expires_at: expiry_after(now, ttl),
        };
        write_json(self.store, keys::SESSION, &record);
        debug!(session_id = %record.id, expires_at = record.expires_at, "Session created");
        record
    }

    /// The live session, or a freshly created one.
    pub fn get_or_create(&self, ttl: Duration) -> SessionRecord {
        if self.is_valid() {
            if let Some(session) = self.get_session() {
                return session;
            }
        }
        self.create(ttl)
    }
}

/// Forget everything this subsystem tracks in the tab.
///
/// Removes the session record, the page-view marker map, and the
/// preloader-shown flag. A pending locale-switch signal is left alone: it
/// belongs to the next document load, not to the visit being discarded.
pub fn clear_tracking_state<S: TabStore + ?Sized>(store: &S) {
    store.remove(keys::SESSION);
    store.remove(keys::PAGE_VIEWS);
    store.remove(keys::PRELOADER_SHOWN);
}
