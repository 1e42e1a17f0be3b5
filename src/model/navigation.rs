//! Navigation categories.

use serde::Serialize;
use std::fmt;

/// How the host says the current document was loaded.
///
/// Mirrors the navigation-timing `type` reported by the host environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadKind {
    /// Ordinary navigation (typed URL, link from elsewhere, new tab).
    #[default]
    Navigate,
    /// The user reloaded the document.
    Reload,
    /// History traversal (back/forward button).
    BackForward,
}

/// Why this page load happened, as consumed by the preloader gate.
///
/// # Cardinality
/// 5 states, all reachable:
/// - `AppTriggered`: a pending locale-switch signal was consumed
/// - `Reload` / `HistoryNav`: straight from [`LoadKind`]
/// - `FreshEntry` / `IntraApp`: a `Navigate` load split by whether the
///   preloader was already shown in this tab
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NavigationKind {
    /// First load of the site in this tab, or first after the visit lapsed.
    FreshEntry,
    /// User-initiated reload.
    Reload,
    /// Back/forward through history.
    HistoryNav,
    /// Reload the application itself asked for (locale switch).
    AppTriggered,
    /// Full navigation within a tab that already saw the intro.
    IntraApp,
}

impl fmt::Display for NavigationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            NavigationKind::FreshEntry => "FRESH_ENTRY",
            NavigationKind::Reload => "RELOAD",
            NavigationKind::HistoryNav => "HISTORY_NAV",
            NavigationKind::AppTriggered => "APP_TRIGGERED",
            NavigationKind::IntraApp => "INTRA_APP",
        };
        f.write_str(name)
    }
}
