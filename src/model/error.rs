//! Error types for tabtrack.
//!
//! Errors exist only in the outer shell (configuration, logging setup, opening a
//! file-backed tab). The tracking core never returns them: an unavailable store
//! or a corrupted payload is absorbed as a cache miss, so a page always renders
//! and the worst outcome is a lost or repeated count.
//!
//! # Error Hierarchy
//!
//! - [`AppError`] - Top-level error returned from the CLI entry point
//!   - [`ConfigError`] - Config file could not be read or parsed
//!   - [`LoggingError`] - Tracing subscriber setup failed
//!   - [`StoreError`] - A file-backed tab could not be opened or removed

use std::path::PathBuf;
use thiserror::Error;

pub use crate::config::ConfigError;
pub use crate::logging::LoggingError;

/// Top-level application error encompassing all failure modes.
///
/// All domain-specific errors convert via `From`, enabling `?` in `main`.
///
/// # Examples
///
/// ```no_run
/// use tabtrack::model::error::{AppError, StoreError};
///
/// fn run() -> Result<(), AppError> {
///     open_tab()?;
///     Ok(())
/// }
/// # fn open_tab() -> Result<(), StoreError> { Ok(()) }
/// ```
#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration could not be loaded.
    ///
    /// **Recovery**: Report and exit. A missing file is never an error.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Logging could not be initialised.
    #[error("Logging error: {0}")]
    Logging(#[from] LoggingError),

    /// The simulated tab's storage file could not be accessed.
    ///
    /// **Recovery**: The CLI falls back to a detached store for reads, so this
    /// only surfaces for explicit operations such as closing the tab.
    #[error("Tab storage error: {0}")]
    Store(#[from] StoreError),

    /// Writing command output failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors opening or discarding a file-backed tab store.
///
/// Reads and writes after a successful open never error; they degrade as
/// described in the module docs.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The state file exists but could not be read.
    #[error("Failed to read tab state at {path:?}: {source}")]
    Read {
        /// Path of the tab state file or directory involved.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The state file could not be written.
    #[error("Failed to write tab state at {path:?}: {source}")]
    Write {
        /// Path of the tab state file or directory involved.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The directory holding the state file could not be created.
    #[error("Failed to create tab state directory at {path:?}: {source}")]
    DirectoryCreation {
        /// Path of the tab state file or directory involved.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The state file could not be deleted.
    #[error("Failed to remove tab state at {path:?}: {source}")]
    Remove {
        /// Path of the tab state file or directory involved.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}
