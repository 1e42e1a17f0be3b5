//! Persisted tracking records.
//!
//! These are the only payloads written to the tab store. They serialize as
//! camelCase JSON so the stored blobs stay readable when inspected by hand.

use super::identifiers::SessionId;
use crate::clock::Millis;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One visit's validity window.
///
/// # Invariant
/// `created_at <= expires_at`. Expiration is absolute, never sliding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
    /// Opaque unique id.
    pub id: SessionId,
    /// When the session started.
    pub created_at: Millis,
    /// Absolute expiry; live while `now <= expires_at`.
    pub expires_at: Millis,
}

impl SessionRecord {
    /// Valid while `now <= expires_at`.
    pub fn is_live_at(&self, now: Millis) -> bool {
        now <= self.expires_at
    }
}

/// "This page's counter has already been incremented."
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageViewMarker {
    /// When the counted view happened.
    pub viewed_at: Millis,
    /// Absolute expiry; live while `now <= expires_at`.
    pub expires_at: Millis,
}

impl PageViewMarker {
    /// Honoured while `now <= expires_at`.
    pub fn is_live_at(&self, now: Millis) -> bool {
        now <= self.expires_at
    }
}

/// All page-view markers, keyed by page key string. Stored as a single blob.
pub type MarkerMap = BTreeMap<String, PageViewMarker>;
