//! Navigation classification.
//!
//! Decides, once per full document load, why the page loaded. Client-side
//! route changes do not reload the document and are never classified.

use crate::model::{LoadKind, NavigationKind};
use crate::store::{keys, TabStore};
use tracing::debug;

/// Host introspection for the current document load.
pub trait NavigationContext {
    /// Navigation-timing category reported by the host.
    fn load_kind(&self) -> LoadKind;

    /// Whether there is a tab at all (false during server-side execution).
    fn has_tab_context(&self) -> bool;
}

/// Fixed navigation context, for tests and for hosts that resolve the load
/// kind up front.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StaticNavigation {
    /// Reported load category.
    pub kind: LoadKind,
    /// False when running without a tab.
    pub has_tab_context: bool,
}

impl StaticNavigation {
    /// A load of `kind` inside a tab.
    pub fn in_tab(kind: LoadKind) -> Self {
        Self {
            kind,
            has_tab_context: true,
        }
    }

    /// No tab at all, e.g. server-side rendering.
    pub fn detached() -> Self {
        Self {
            kind: LoadKind::Navigate,
            has_tab_context: false,
        }
    }
}

impl NavigationContext for StaticNavigation {
    fn load_kind(&self) -> LoadKind {
        self.kind
    }

    fn has_tab_context(&self) -> bool {
        self.has_tab_context
    }
}

/// A locale switch requested by the application before reloading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocaleSwitch {
    /// Locale being switched to. May be empty if the writer did not record it.
    pub locale: String,
}

/// One-shot signal slot: at most one pending locale switch per tab.
///
/// The application raises it immediately before a locale switch; the next
/// classification takes it. Taking both reads and clears, so a signal is
/// observed by exactly one document load.
#[derive(Debug)]
pub struct LocaleSwitchSignal<'a, S: ?Sized> {
    store: &'a S,
}

impl<'a, S: TabStore + ?Sized> LocaleSwitchSignal<'a, S> {
    /// Signal slot in `store`.
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Queue a switch. A second raise before a take replaces the first.
    pub fn raise(&self, locale: &str) {
        debug!(locale, "Locale switch signalled");
        self.store.set(keys::LOCALE_SWITCH, locale.to_string());
    }

    /// Whether a switch is queued. Does not consume it.
    pub fn is_pending(&self) -> bool {
        self.store.get(keys::LOCALE_SWITCH).is_some()
    }

    /// Consume the pending switch, if any.
    pub fn take(&self) -> Option<LocaleSwitch> {
        let locale = self.store.get(keys::LOCALE_SWITCH)?;
        self.store.remove(keys::LOCALE_SWITCH);
        Some(LocaleSwitch { locale })
    }
}

/// Classifies the current document load into a [`NavigationKind`].
#[derive(Debug)]
pub struct NavigationClassifier<'a, S: ?Sized> {
    store: &'a S,
}

impl<'a, S: TabStore + ?Sized> NavigationClassifier<'a, S> {
    /// Classifier reading flags from `store`.
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Classify this load.
    ///
    /// # Precedence
    /// 1. Pending locale switch (consumed here) → `AppTriggered`
    /// 2. `Reload` → `Reload`, `BackForward` → `HistoryNav`
    /// 3. `Navigate` → `IntraApp` if the preloader was already shown in this
    ///    tab, else `FreshEntry`
    ///
    /// Without a tab every load is a fresh entry.
    pub fn classify(&self, ctx: &dyn NavigationContext) -> NavigationKind {
        if !ctx.has_tab_context() {
            return NavigationKind::FreshEntry;
        }

        if let Some(switch) = LocaleSwitchSignal::new(self.store).take() {
            debug!(locale = %switch.locale, "Load triggered by locale switch");
            return NavigationKind::AppTriggered;
        }

        let kind = match ctx.load_kind() {
            LoadKind::Reload => NavigationKind::Reload,
            LoadKind::BackForward => NavigationKind::HistoryNav,
            LoadKind::Navigate if self.store.get(keys::PRELOADER_SHOWN).is_some() => {
                NavigationKind::IntraApp
            }
            LoadKind::Navigate => NavigationKind::FreshEntry,
        };
        debug!(%kind, "Document load classified");
        kind
    }
}
