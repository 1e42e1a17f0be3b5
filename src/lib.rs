//! tabtrack
//!
//! Tab-scoped engagement tracking for content sites. Decides, per document
//! load, whether the intro preloader plays, and per page mount, whether a
//! view counter is owed, without double counting across re-renders, soft
//! navigations and reloads within a bounded window.
//!
//! Pure core over two injected ports: a [`store::TabStore`] for persistence
//! and a [`clock::Clock`] for time. Data flows one way at mount time:
//! navigation classifier → preloader gate / session manager → deduplicator
//! → mount tracker → caller's callback.

pub mod clock;
pub mod config;
pub mod dedup;
pub mod logging;
pub mod model;
pub mod navigation;
pub mod preloader;
pub mod session;
pub mod store;
pub mod tracker;

pub use tracker::{
    EngagementTracker, MountOutcome, PageViewMount, TrackOptions, TrackingSnapshot, DEFAULT_TTL,
};
