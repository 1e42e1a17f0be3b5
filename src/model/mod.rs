//! Domain model types (pure).
//!
//! All types in this module are pure data with smart constructors.

pub mod error;
pub mod identifiers;
pub mod navigation;
pub mod records;

// Re-export for convenience
pub use identifiers::{InvalidPageKey, InvalidSessionId, PageKey, SessionId};
pub use navigation::{LoadKind, NavigationKind};
pub use records::{MarkerMap, PageViewMarker, SessionRecord};
