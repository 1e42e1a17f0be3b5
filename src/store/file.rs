//! File-backed tab store.
//!
//! One JSON object per simulated tab. The file plays the role of the
//! browser's session storage: it survives reloads (separate CLI invocations)
//! and disappears when the tab is closed ([`FileStore::discard`]).

use super::TabStore;
use crate::model::error::StoreError;
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Write-through tab store persisted to a single JSON file.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: RefCell<BTreeMap<String, String>>,
}

impl FileStore {
    /// Open the tab state at `path`.
    ///
    /// A missing file is an empty (new) tab. A file that is not a JSON object
    /// of strings is treated as empty and replaced on the next write.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Read` if the file exists but cannot be read.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();

        let entries = match std::fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(entries) => entries,
                Err(e) => {
                    tracing::warn!(path = ?path, error = %e, "Tab state is corrupted, starting empty");
                    BTreeMap::new()
                }
            },
            Err(e) if e.kind() == ErrorKind::NotFound => BTreeMap::new(),
            Err(source) => return Err(StoreError::Read { path, source }),
        };

        Ok(Self {
            path,
            entries: RefCell::new(entries),
        })
    }

    /// Close the tab: delete its state file. Missing files are fine.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Remove` if the file exists but cannot be deleted.
    pub fn discard(path: &Path) -> Result<(), StoreError> {
        match std::fs::remove_file(path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(source) => Err(StoreError::Remove {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    /// Location of the state file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self) {
        if let Err(e) = self.try_persist() {
            // Storage is best effort; the in-memory view stays authoritative
            // for the rest of this run.
            tracing::warn!(path = ?self.path, error = %e, "Failed to persist tab state");
        }
    }

    fn try_persist(&self) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|source| StoreError::DirectoryCreation {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let written = serde_json::to_string_pretty(&*self.entries.borrow())
            .map_err(|e| std::io::Error::new(ErrorKind::InvalidData, e))
            .and_then(|json| std::fs::write(&self.path, json));

        written.map_err(|source| StoreError::Write {
            path: self.path.clone(),
            source,
        })
    }
}

impl TabStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.borrow().get(key).cloned()
    }

    fn set(&self, key: &str, value: String) {
        self.entries.borrow_mut().insert(key.to_string(), value);
        self.persist();
    }

    fn remove(&self, key: &str) {
        let removed = self.entries.borrow_mut().remove(key).is_some();
        if removed {
            self.persist();
        }
    }
}
