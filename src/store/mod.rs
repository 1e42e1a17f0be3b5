//! Tab-scoped key/value storage.
//!
//! This module provides the storage port used by every tracking component:
//! - [`MemoryStore`] for tests and embedding
//! - [`FileStore`] as the CLI's stand-in for a browser tab's session storage
//! - [`DetachedStore`] for execution contexts with no tab at all
//!
//! Stores are flat string-keyed blob stores with no TTL semantics of their
//! own. Only the component owning a key interprets its value.
//!
//! # Failure model
//! Stores never report errors through this interface. An unavailable medium
//! behaves like an empty store that forgets every write, and callers treat
//! that exactly like a cache miss.

use serde::de::DeserializeOwned;
use serde::Serialize;

pub mod file;
pub mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

/// Logical keys written by the tracking components.
///
/// Each key has exactly one owning component.
pub mod keys {
    /// Session record, owned by the session manager.
    pub const SESSION: &str = "tabtrack:session";
    /// Marker map (one JSON blob for all pages), owned by the deduplicator.
    pub const PAGE_VIEWS: &str = "tabtrack:page-views";
    /// "Preloader already shown in this tab", owned by the preloader gate.
    pub const PRELOADER_SHOWN: &str = "tabtrack:preloader-shown";
    /// Pending locale-switch signal, owned by the navigation classifier.
    pub const LOCALE_SWITCH: &str = "tabtrack:locale-switch";
}

/// Storage scoped to the lifetime of one browser tab.
///
/// Every `set`/`remove` is durable for the remainder of the tab's life.
/// Methods take `&self`; implementations use interior mutability because the
/// store is shared by several components on a single thread.
pub trait TabStore {
    /// Stored value, or `None` when absent or when storage is unavailable.
    fn get(&self, key: &str) -> Option<String>;

    /// Insert or overwrite a value.
    fn set(&self, key: &str, value: String);

    /// Delete a value. Removing a missing key is a no-op.
    fn remove(&self, key: &str);
}

impl<S: TabStore + ?Sized> TabStore for &S {
    fn get(&self, key: &str) -> Option<String> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: String) {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) {
        (**self).remove(key)
    }
}

impl<S: TabStore + ?Sized> TabStore for Box<S> {
    fn get(&self, key: &str) -> Option<String> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: String) {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) {
        (**self).remove(key)
    }
}

/// Store for contexts without a tab (server-side rendering, disabled storage).
///
/// Every read misses and every write is dropped.
#[derive(Debug, Clone, Copy, Default)]
pub struct DetachedStore;

impl TabStore for DetachedStore {
    fn get(&self, _key: &str) -> Option<String> {
        None
    }

    fn set(&self, _key: &str, _value: String) {}

    fn remove(&self, _key: &str) {}
}

/// Read and decode a JSON value.
///
/// A malformed payload is treated exactly like an absent one. The offending
/// value is left in place; the next write of that key replaces it.
pub(crate) fn read_json<T, S>(store: &S, key: &str) -> Option<T>
where
    T: DeserializeOwned,
    S: TabStore + ?Sized,
{
    let raw = store.get(key)?;
    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!(key, error = %e, "Ignoring malformed stored payload");
            None
        }
    }
}

/// Encode a value as JSON and store it.
pub(crate) fn write_json<T, S>(store: &S, key: &str, value: &T)
where
    T: Serialize,
    S: TabStore + ?Sized,
{
    match serde_json::to_string(value) {
        Ok(raw) => store.set(key, raw),
        // Only reachable for non-string map keys, which no record uses.
        Err(e) => tracing::warn!(key, error = %e, "Failed to encode payload"),
    }
}
