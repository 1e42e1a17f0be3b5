//! Tests for configuration file loading.

use super::*;
use serial_test::serial;
use std::env;
use std::fs;

fn temp_config(name: &str, contents: &str) -> PathBuf {
    let path = env::temp_dir().join(name);
    fs::write(&path, contents).expect("Failed to write test config");
    path
}

#[test]
fn default_config_path_contains_tabtrack_config_toml() {
    let path = default_config_path().expect("Should have default path");
    let path_str = path.to_string_lossy();
    assert!(
        path_str.contains("tabtrack") && path_str.ends_with("config.toml"),
        "Path should contain 'tabtrack' and end with 'config.toml', got: {}",
        path_str
    );
}

#[test]
fn load_config_file_returns_ok_none_for_missing_file() {
    let result = load_config_file("/nonexistent/path/to/config.toml");
    assert_eq!(
        result,
        Ok(None),
        "Missing config file should return Ok(None), not an error"
    );
}

#[test]
fn load_config_file_parses_valid_toml() {
    let config_path = temp_config(
        "tabtrack_test_config.toml",
        r#"
ttl_ms = 60000
tracking_enabled = false
sweep_on_start = false
state_file = "/tmp/tabtrack/tab-a.json"
"#,
    );

    let config = load_config_file(&config_path)
        .expect("Should successfully parse valid TOML")
        .expect("Should return Some(ConfigFile) for existing file");

    assert_eq!(config.ttl_ms, Some(60_000));
    assert_eq!(config.tracking_enabled, Some(false));
    assert_eq!(config.sweep_on_start, Some(false));
    assert_eq!(
        config.state_file,
        Some(PathBuf::from("/tmp/tabtrack/tab-a.json"))
    );
    assert_eq!(config.log_file_path, None);

    fs::remove_file(config_path).ok();
}

#[test]
fn load_config_file_returns_error_for_invalid_toml() {
    let config_path = temp_config("tabtrack_test_invalid.toml", "this is not valid TOML ][}{");

    let result = load_config_file(&config_path);
    match result {
        Err(ConfigError::ParseError { path, reason: _ }) => {
            assert_eq!(path, config_path);
        }
        _ => panic!("Expected ParseError, got {:?}", result),
    }

    fs::remove_file(config_path).ok();
}

#[test]
fn load_config_file_rejects_unknown_fields() {
    let config_path = temp_config("tabtrack_test_unknown.toml", "ttl = 5\n");

    let result = load_config_file(&config_path);
    assert!(
        matches!(result, Err(ConfigError::ParseError { .. })),
        "Unknown keys should be rejected, got {:?}",
        result
    );

    fs::remove_file(config_path).ok();
}

#[test]
fn load_config_file_rejects_zero_ttl() {
    let config_path = temp_config("tabtrack_test_zero_ttl.toml", "ttl_ms = 0\n");

    let result = load_config_file(&config_path);
    match result {
        Err(ConfigError::InvalidValue { field, .. }) => assert_eq!(field, "ttl_ms"),
        _ => panic!("Expected InvalidValue, got {:?}", result),
    }

    fs::remove_file(config_path).ok();
}

#[test]
fn merge_config_uses_defaults_when_none() {
    let resolved = merge_config(None);
    assert_eq!(resolved, ResolvedConfig::default());
    assert_eq!(resolved.ttl_ms, 1_800_000);
    assert_eq!(resolved.ttl(), DEFAULT_TTL);
    assert!(resolved.tracking_enabled);
    assert!(resolved.sweep_on_start);
}

#[test]
fn merge_config_overrides_with_config_file_values() {
    let config_file = ConfigFile {
        ttl_ms: Some(5_000),
        tracking_enabled: Some(false),
        sweep_on_start: None,
        state_file: Some(PathBuf::from("tab.json")),
        log_file_path: None,
    };

    let resolved = merge_config(Some(config_file));
    let defaults = ResolvedConfig::default();

    assert_eq!(resolved.ttl_ms, 5_000);
    assert!(!resolved.tracking_enabled);
    assert_eq!(resolved.sweep_on_start, defaults.sweep_on_start);
    assert_eq!(resolved.state_file, PathBuf::from("tab.json"));
    assert_eq!(resolved.log_file_path, defaults.log_file_path);
}

/// RAII guard to ensure environment variable cleanup even under test parallelism.
struct EnvGuard(&'static str);

impl EnvGuard {
    fn new(name: &'static str) -> Self {
        env::remove_var(name);
        EnvGuard(name)
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        env::remove_var(self.0);
    }
}

#[test]
#[serial(tabtrack_env)]
fn apply_env_overrides_respects_ttl() {
    let _guard = EnvGuard::new(ENV_TTL_MS);
    env::set_var(ENV_TTL_MS, "1000");

    let result = apply_env_overrides(ResolvedConfig::default());
    assert_eq!(result.ttl_ms, 1000, "TABTRACK_TTL_MS should override ttl");
}

#[test]
#[serial(tabtrack_env)]
fn apply_env_overrides_ignores_invalid_ttl() {
    let _guard = EnvGuard::new(ENV_TTL_MS);
    let base = ResolvedConfig::default();

    for raw in ["soon", "0", "-5", ""] {
        env::set_var(ENV_TTL_MS, raw);
        let result = apply_env_overrides(base.clone());
        assert_eq!(result.ttl_ms, base.ttl_ms, "{raw:?} should be ignored");
    }
}

#[test]
#[serial(tabtrack_env)]
fn apply_env_overrides_respects_state_file() {
    let _guard = EnvGuard::new(ENV_STATE_FILE);
    env::set_var(ENV_STATE_FILE, "/tmp/other-tab.json");

    let result = apply_env_overrides(ResolvedConfig::default());
    assert_eq!(result.state_file, PathBuf::from("/tmp/other-tab.json"));
}

#[test]
#[serial(tabtrack_env)]
fn apply_env_overrides_no_change_when_env_vars_not_set() {
    let _ttl = EnvGuard::new(ENV_TTL_MS);
    let _state = EnvGuard::new(ENV_STATE_FILE);

    let base = ResolvedConfig::default();
    let result = apply_env_overrides(base.clone());
    assert_eq!(result, base);
}

#[test]
#[serial(tabtrack_config)]
fn load_config_with_precedence_prefers_explicit_path() {
    let _guard = EnvGuard::new(ENV_CONFIG);

    let explicit_path = temp_config("tabtrack_explicit.toml", "ttl_ms = 111\n");
    let env_path = temp_config("tabtrack_env.toml", "ttl_ms = 222\n");
    env::set_var(ENV_CONFIG, env_path.to_str().unwrap());

    let config = load_config_with_precedence(Some(explicit_path.clone()))
        .unwrap()
        .unwrap();
    assert_eq!(
        config.ttl_ms,
        Some(111),
        "Should use explicit path, not TABTRACK_CONFIG env var"
    );

    fs::remove_file(explicit_path).ok();
    fs::remove_file(env_path).ok();
}

#[test]
#[serial(tabtrack_config)]
fn load_config_with_precedence_uses_env_var_when_no_explicit_path() {
    let _guard = EnvGuard::new(ENV_CONFIG);

    let env_path = temp_config("tabtrack_env_only.toml", "ttl_ms = 333\n");
    env::set_var(ENV_CONFIG, env_path.to_str().unwrap());

    let config = load_config_with_precedence(None).unwrap().unwrap();
    assert_eq!(config.ttl_ms, Some(333));

    fs::remove_file(env_path).ok();
}

#[test]
fn apply_cli_overrides_takes_highest_precedence() {
    let base = ResolvedConfig {
        ttl_ms: 5_000,
        ..ResolvedConfig::default()
    };

    let result = apply_cli_overrides(
        base,
        Some(1_000),
        Some(PathBuf::from("cli-tab.json")),
        Some(false),
    );

    assert_eq!(result.ttl_ms, 1_000);
    assert_eq!(result.state_file, PathBuf::from("cli-tab.json"));
    assert!(!result.tracking_enabled);
}

#[test]
fn apply_cli_overrides_none_leaves_config_unchanged() {
    let base = ResolvedConfig::default();
    let result = apply_cli_overrides(base.clone(), None, None, None);
    assert_eq!(result, base);
}

#[test]
fn apply_cli_overrides_ignores_zero_ttl() {
    let base = ResolvedConfig::default();
    let result = apply_cli_overrides(base.clone(), Some(0), None, None);
    assert_eq!(result.ttl_ms, base.ttl_ms);
}
