//! Configuration file loading with precedence handling.

use crate::tracker::DEFAULT_TTL;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Environment variable naming an explicit config file.
pub const ENV_CONFIG: &str = "TABTRACK_CONFIG";
/// Environment variable overriding the TTL in milliseconds.
pub const ENV_TTL_MS: &str = "TABTRACK_TTL_MS";
/// Environment variable overriding the simulated tab's state file.
pub const ENV_STATE_FILE: &str = "TABTRACK_STATE_FILE";

/// Errors that can occur during config loading.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Failed to read config file (file may not exist or have permission issues).
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError {
        /// Path that failed to read.
        path: PathBuf,
        /// Reason for failure.
        reason: String,
    },

    /// Config file contains invalid TOML syntax.
    #[error("Invalid TOML in {path}: {reason}")]
    ParseError {
        /// Path with invalid TOML.
        path: PathBuf,
        /// Parse error details.
        reason: String,
    },

    /// Config file parsed but a value is out of range.
    #[error("Invalid value for '{field}' in {path}: {reason}")]
    InvalidValue {
        /// Path of the offending file.
        path: PathBuf,
        /// Field name as written in TOML.
        field: &'static str,
        /// Why the value was rejected.
        reason: String,
    },
}

/// TOML configuration file structure.
///
/// All fields are optional - if not specified, hardcoded defaults are used.
/// Corresponds to `~/.config/tabtrack/config.toml`.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    /// Lifetime of sessions and page-view markers, in milliseconds.
    #[serde(default)]
    pub ttl_ms: Option<u64>,

    /// Whether page views are tracked at all.
    #[serde(default)]
    pub tracking_enabled: Option<bool>,

    /// Sweep expired markers once at startup.
    #[serde(default)]
    pub sweep_on_start: Option<bool>,

    /// State file standing in for the browser tab's storage.
    #[serde(default)]
    pub state_file: Option<PathBuf>,

    /// Path to log file for tracing output.
    #[serde(default)]
    pub log_file_path: Option<PathBuf>,
}

/// Resolved configuration after applying precedence rules.
///
/// Created by merging defaults, config file, env vars, and CLI args.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedConfig {
    /// TTL in milliseconds, always non-zero.
    pub ttl_ms: u64,
    /// Whether page views are tracked.
    pub tracking_enabled: bool,
    /// Sweep expired markers once per invocation.
    pub sweep_on_start: bool,
    /// State file of the simulated tab.
    pub state_file: PathBuf,
    /// Log file for tracing output.
    pub log_file_path: PathBuf,
}

impl ResolvedConfig {
    /// Lifetime of sessions and markers.
    pub fn ttl(&self) -> Duration {
        Duration::from_millis(self.ttl_ms)
    }
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        Self {
            ttl_ms: DEFAULT_TTL.as_millis() as u64,
            tracking_enabled: true,
            sweep_on_start: true,
            state_file: default_state_path(),
            log_file_path: default_log_path(),
        }
    }
}

/// Resolve default log file path.
///
/// Returns `~/.local/state/tabtrack/tabtrack.log` on Unix-like systems,
/// or appropriate platform path on other systems.
///
/// If state directory cannot be determined, falls back to current directory.
pub fn default_log_path() -> PathBuf {
    if let Some(state_dir) = dirs::state_dir() {
        state_dir.join("tabtrack").join("tabtrack.log")
    } else {
        PathBuf::from("tabtrack.log")
    }
}

/// Resolve default simulated-tab state file, next to the log file.
pub fn default_state_path() -> PathBuf {
    if let Some(state_dir) = dirs::state_dir() {
        state_dir.join("tabtrack").join("tab.json")
    } else {
        PathBuf::from("tabtrack-tab.json")
    }
}

/// Load configuration file from a specific path.
///
/// Returns `Ok(None)` if file doesn't exist (not an error - use defaults).
///
/// # Errors
///
/// Returns error if file exists but has read or parse errors, or sets
/// `ttl_ms = 0`.
pub fn load_config_file(path: impl Into<PathBuf>) -> Result<Option<ConfigFile>, ConfigError> {
    let path = path.into();

    // Missing file is not an error - use defaults
    if !path.exists() {
        return Ok(None);
    }

    let contents = std::fs::read_to_string(&path).map_err(|e| ConfigError::ReadError {
        path: path.clone(),
        reason: e.to_string(),
    })?;

    let config: ConfigFile = toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
        path: path.clone(),
        reason: e.to_string(),
    })?;

    if config.ttl_ms == Some(0) {
        return Err(ConfigError::InvalidValue {
            path,
            field: "ttl_ms",
            reason: "must be greater than zero".to_string(),
        });
    }

    Ok(Some(config))
}

/// Resolve default config file path.
///
/// Returns `~/.config/tabtrack/config.toml` on Unix, appropriate path on
/// other platforms. Returns `None` if home directory cannot be determined.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("tabtrack").join("config.toml"))
}

/// Load configuration with precedence handling.
///
/// Precedence (highest to lowest):
/// 1. Explicit `config_path` argument (CLI `--config`)
/// 2. `TABTRACK_CONFIG` environment variable
/// 3. Default path `~/.config/tabtrack/config.toml`
///
/// Missing config files are NOT errors - defaults are used.
///
/// # Errors
///
/// Returns error only if a config file exists but cannot be read or parsed.
pub fn load_config_with_precedence(
    config_path: Option<PathBuf>,
) -> Result<Option<ConfigFile>, ConfigError> {
    if let Some(path) = config_path {
        return load_config_file(path);
    }

    if let Ok(env_path) = std::env::var(ENV_CONFIG) {
        return load_config_file(PathBuf::from(env_path));
    }

    if let Some(default_path) = default_config_path() {
        return load_config_file(default_path);
    }

    Ok(None)
}

/// Merge config file into defaults to create resolved config.
///
/// For each field in `ConfigFile`, if `Some(value)`, use it; otherwise use default.
pub fn merge_config(config_file: Option<ConfigFile>) -> ResolvedConfig {
    let defaults = ResolvedConfig::default();

    let Some(config) = config_file else {
        return defaults;
    };

    ResolvedConfig {
        ttl_ms: config.ttl_ms.unwrap_or(defaults.ttl_ms),
        tracking_enabled: config.tracking_enabled.unwrap_or(defaults.tracking_enabled),
        sweep_on_start: config.sweep_on_start.unwrap_or(defaults.sweep_on_start),
        state_file: config.state_file.unwrap_or(defaults.state_file),
        log_file_path: config.log_file_path.unwrap_or(defaults.log_file_path),
    }
}

/// Apply environment variable overrides to resolved config.
///
/// Checks for:
/// - `TABTRACK_TTL_MS`: Override TTL (ignored unless a positive integer)
/// - `TABTRACK_STATE_FILE`: Override state file path
pub fn apply_env_overrides(mut config: ResolvedConfig) -> ResolvedConfig {
    if let Ok(raw) = std::env::var(ENV_TTL_MS) {
        match raw.trim().parse::<u64>() {
            Ok(ttl_ms) if ttl_ms > 0 => config.ttl_ms = ttl_ms,
            _ => tracing::warn!(value = %raw, "Ignoring invalid TABTRACK_TTL_MS"),
        }
    }

    if let Ok(path) = std::env::var(ENV_STATE_FILE) {
        if !path.is_empty() {
            config.state_file = PathBuf::from(path);
        }
    }

    config
}

/// Apply CLI argument overrides to resolved config.
///
/// CLI args have the highest precedence and override all other sources.
/// Only applies overrides for flags that were explicitly set by the user.
///
/// Precedence chain: Defaults → Config File → Env Vars → CLI Args (highest)
///
/// # Arguments
///
/// * `config` - Base resolved config (already merged with defaults, file, and env vars)
/// * `ttl_override` - Optional TTL from `--ttl-ms` (zero is ignored)
/// * `state_file_override` - Optional path from `--state-file`
/// * `tracking_override` - `Some(false)` from `--no-tracking`
pub fn apply_cli_overrides(
    mut config: ResolvedConfig,
    ttl_override: Option<u64>,
    state_file_override: Option<PathBuf>,
    tracking_override: Option<bool>,
) -> ResolvedConfig {
    if let Some(ttl_ms) = ttl_override.filter(|ms| *ms > 0) {
        config.ttl_ms = ttl_ms;
    }

    if let Some(path) = state_file_override {
        config.state_file = path;
    }

    if let Some(enabled) = tracking_override {
        config.tracking_enabled = enabled;
    }

    config
}

#[cfg(test)]
#[path = "loader_tests.rs"]
mod tests;

#[cfg(test)]
mod path_tests {
    use super::*;

    #[test]
    fn default_log_path_ends_with_tabtrack_log() {
        let path = default_log_path();
        assert!(
            path.to_string_lossy().ends_with("tabtrack.log"),
            "Default log path should end with 'tabtrack.log', got: {:?}",
            path
        );
    }

    #[test]
    fn default_state_path_ends_with_json() {
        let path = default_state_path();
        assert!(
            path.to_string_lossy().ends_with(".json"),
            "Default state path should be a JSON file, got: {:?}",
            path
        );
    }

    #[test]
    fn config_file_log_path_overrides_default() {
        let custom_path = PathBuf::from("/custom/path/to/app.log");
        let config_file = ConfigFile {
            log_file_path: Some(custom_path.clone()),
            ..ConfigFile::default()
        };

        let resolved = merge_config(Some(config_file));
        assert_eq!(resolved.log_file_path, custom_path);
    }

    #[test]
    fn missing_config_file_paths_use_defaults() {
        let resolved = merge_config(Some(ConfigFile::default()));
        assert_eq!(resolved.log_file_path, default_log_path());
        assert_eq!(resolved.state_file, default_state_path());
    }
}
