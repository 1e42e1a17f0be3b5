//! tabtrack - Entry Point
//!
//! Drives one simulated browser tab whose tab-scoped storage is a JSON state
//! file. Each invocation is one event in that tab's life.

use clap::{Parser, Subcommand, ValueEnum};
use std::io::Write;
use std::path::PathBuf;
use tabtrack::clock::SystemClock;
use tabtrack::model::error::AppError;
use tabtrack::model::LoadKind;
use tabtrack::navigation::StaticNavigation;
use tabtrack::store::{DetachedStore, FileStore, TabStore};
use tabtrack::{EngagementTracker, MountOutcome, PageViewMount, TrackOptions};
use tracing::{info, warn};

/// tabtrack - tab-scoped preloader gating and page-view deduplication
#[derive(Parser, Debug)]
#[command(name = "tabtrack")]
#[command(version)]
#[command(about = "Simulate a browser tab's engagement tracking from the command line")]
pub struct Args {
    /// Tab event to simulate
    #[command(subcommand)]
    pub command: Command,

    /// Path to configuration file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// State file standing in for the tab's storage
    #[arg(long, global = true)]
    pub state_file: Option<PathBuf>,

    /// Session and page-view marker lifetime in milliseconds
    #[arg(long, global = true, value_parser = clap::value_parser!(u64).range(1..))]
    pub ttl_ms: Option<u64>,

    /// Disable page-view tracking (views are skipped)
    #[arg(long, global = true)]
    pub no_tracking: bool,

    /// Log every tracking decision at debug level
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// One event in the life of the simulated tab
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Full document load: decide whether the intro preloader plays
    Load {
        /// How the host reports the load
        #[arg(long, value_enum, default_value = "navigate")]
        nav: NavArg,
    },
    /// Mount a page view and report whether it counts
    View {
        /// Page identifier
        page_id: String,

        /// Locale prefix for the page key
        #[arg(short, long)]
        locale: Option<String>,
    },
    /// Signal a locale switch; the next load is app-triggered
    SwitchLocale {
        /// Locale being switched to
        locale: String,
    },
    /// Delete expired page-view markers
    Sweep,
    /// Clear session, page-view markers and the preloader flag
    Reset,
    /// Print the tab's tracking state as JSON
    Status,
    /// Close the tab, discarding all of its storage
    CloseTab,
}

/// Navigation-timing category of a load.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavArg {
    /// Link click, typed URL or new tab
    Navigate,
    /// Browser reload
    Reload,
    /// Back or forward button
    BackForward,
}

impl From<NavArg> for LoadKind {
    fn from(nav: NavArg) -> Self {
        match nav {
            NavArg::Navigate => LoadKind::Navigate,
            NavArg::Reload => LoadKind::Reload,
            NavArg::BackForward => LoadKind::BackForward,
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    run(args)?;
    Ok(())
}

fn run(args: Args) -> Result<(), AppError> {
    // Defaults → Config File → Env Vars → CLI Args
    let config = {
        let config_file = tabtrack::config::load_config_with_precedence(args.config.clone())?;
        let merged = tabtrack::config::merge_config(config_file);
        let with_env = tabtrack::config::apply_env_overrides(merged);

        let tracking_override = if args.no_tracking { Some(false) } else { None };
        tabtrack::config::apply_cli_overrides(
            with_env,
            args.ttl_ms,
            args.state_file.clone(),
            tracking_override,
        )
    };

    tabtrack::logging::init(&config.log_file_path, args.verbose)?;
    info!(config = ?config, command = ?args.command, "Configuration loaded and resolved");

    let mut out = std::io::stdout().lock();

    let store: Box<dyn TabStore> = match FileStore::open(&config.state_file) {
        Ok(store) => Box::new(store),
        Err(e) => {
            warn!(error = %e, "Tab storage unavailable, nothing will be remembered");
            Box::new(DetachedStore)
        }
    };
    let tracker = EngagementTracker::new(store, SystemClock, config.ttl());

    let sweeps_itself = matches!(args.command, Command::Sweep | Command::CloseTab);
    if config.sweep_on_start && !sweeps_itself {
        tracker.sweep_expired();
    }

    match args.command {
        Command::Load { nav } => {
            let decision = tracker.on_document_load(&StaticNavigation::in_tab(nav.into()));
            writeln!(out, "navigation: {}", decision.kind)?;
            let preloader = if decision.show { "show" } else { "skip" };
            writeln!(out, "preloader: {preloader}")?;
        }
        Command::View { page_id, locale } => {
            let mut options = TrackOptions::new(page_id).with_enabled(config.tracking_enabled);
            if let Some(locale) = locale {
                options = options.with_locale(locale);
            }

            let mount = PageViewMount::new(options);
            let outcome = mount.run_with(&tracker, |key| writeln!(out, "new view: {key}"));
            match outcome {
                MountOutcome::NewView(_) => {}
                MountOutcome::AlreadyCounted(key) => writeln!(out, "already counted: {key}")?,
                MountOutcome::Skipped => writeln!(out, "skipped")?,
                MountOutcome::AlreadyRan => writeln!(out, "already ran")?,
            }
        }
        Command::SwitchLocale { locale } => {
            tracker.locale_switch().raise(&locale);
            writeln!(out, "locale switch pending: {locale}")?;
        }
        Command::Sweep => {
            let removed = tracker.sweep_expired();
            writeln!(out, "removed: {removed}")?;
        }
        Command::Reset => {
            tracker.reset_all();
            writeln!(out, "reset")?;
        }
        Command::Status => {
            let json = serde_json::to_string_pretty(&tracker.snapshot())
                .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
            writeln!(out, "{json}")?;
        }
        Command::CloseTab => {
            FileStore::discard(&config.state_file)?;
            info!(path = ?config.state_file, "Tab closed");
            writeln!(out, "tab closed")?;
        }
    }

    Ok(())
}
