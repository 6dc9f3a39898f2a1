use super::types::Config;
use crate::core::error::{ConfigError, ConfigResult};

use std::path::{Path, PathBuf};

/// Prefix for environment overrides.
pub const ENV_PREFIX: &str = "SECRETGATE_";

/// Configuration file name searched for in each directory.
pub const CONFIG_FILE_NAME: &str = "config.yaml";

/// Directory holding user configuration (`~/.secretgate`).
pub fn default_config_dir() -> PathBuf {
    dirs::home_dir()
        .map(|home| home.join(".secretgate"))
        .unwrap_or_else(|| PathBuf::from(".secretgate"))
}

/// Expands a leading `~` to the home directory.
pub fn expand_home(path: &str) -> PathBuf {
    let rest = match path.strip_prefix('~') {
        Some(rest) if rest.is_empty() || rest.starts_with('/') => rest.trim_start_matches('/'),
        _ => return PathBuf::from(path),
    };

    match dirs::home_dir() {
        Some(home) if rest.is_empty() => home,
        Some(home) => home.join(rest),
        None => PathBuf::from(path),
    }
}

/// Resolves and layers configuration: defaults, then the first config file
/// found, then `SECRETGATE_*` environment variables.
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    explicit: Option<PathBuf>,
    search_paths: Vec<PathBuf>,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self {
            explicit: None,
            search_paths: vec![
                default_config_dir().join(CONFIG_FILE_NAME),
                PathBuf::from(CONFIG_FILE_NAME),
            ],
        }
    }
}

impl ConfigLoader {
    /// Creates a loader using the standard search paths.
    pub fn new() -> Self {
        Self::default()
    }

    /// Uses this file instead of searching. It must exist.
    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.explicit = Some(path.into());
        self
    }

    /// Replaces the search paths.
    pub fn with_search_paths(mut self, paths: Vec<PathBuf>) -> Self {
        self.search_paths = paths;
        self
    }

    /// Returns the file that would be loaded, if any.
    pub fn resolve(&self) -> Option<PathBuf> {
        if let Some(path) = &self.explicit {
            return Some(path.clone());
        }
        self.search_paths.iter().find(|path| path.is_file()).cloned()
    }

    /// Loads configuration using the process environment.
    pub fn load(&self) -> ConfigResult<Config> {
        self.load_with_env(|key| std::env::var(key).ok())
    }

    /// Loads configuration using `env` for variable lookup.
    pub fn load_with_env<F>(&self, env: F) -> ConfigResult<Config>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = match self.resolve() {
            Some(path) => read_config_file(&path)?,
            None => Config::default(),
        };
        apply_env_overrides(&mut config, env)?;
        Ok(config)
    }
}

/// Reads a YAML config file. Keys it omits keep their defaults.
pub fn read_config_file(path: &Path) -> ConfigResult<Config> {
    let display = path.display().to_string();
    let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: display.clone(),
        source,
    })?;

    if contents.trim().is_empty() {
        return Ok(Config::default());
    }

    serde_yaml::from_str(&contents).map_err(|source| ConfigError::Parse {
        path: display,
        source,
    })
}

/// Applies `SECRETGATE_*` overrides for scalar settings.
pub fn apply_env_overrides<F>(config: &mut Config, env: F) -> ConfigResult<()>
where
    F: Fn(&str) -> Option<String>,
{
    let var = |suffix: &str| {
        let key = format!("{}{}", ENV_PREFIX, suffix);
        env(&key).map(|value| (key, value))
    };

    if let Some((_, value)) = var("FRAMEWORK") {
        config.framework = value;
    }
    if let Some((_, value)) = var("LOGGING_LEVEL") {
        config.logging.level = value;
    }
    if let Some((_, value)) = var("LOGGING_FORMAT") {
        config.logging.format = value;
    }
    if let Some((_, value)) = var("LOGGING_LOG_FILE") {
        config.logging.log_file = Some(value).filter(|v| !v.is_empty());
    }
    if let Some((key, value)) = var("DECISION_BLOCK_ON_FINDINGS") {
        config.decision.block_on_findings = parse_bool(&key, &value)?;
    }
    if let Some((_, value)) = var("DECISION_SEVERITY_THRESHOLD") {
        config.decision.severity_threshold = value;
    }
    if let Some((key, value)) = var("DECISION_FAIL_CLOSED") {
        config.decision.fail_closed = parse_bool(&key, &value)?;
    }
    if let Some((_, value)) = var("VAULT_RADAR_COMMAND") {
        config.vault_radar.command = value;
    }
    if let Some((key, value)) = var("VAULT_RADAR_TIMEOUT_SECONDS") {
        config.vault_radar.timeout_seconds = parse_number(&key, &value)?;
    }
    if let Some((key, value)) = var("REMEDIATION_ENABLED") {
        config.remediation.enabled = parse_bool(&key, &value)?;
    }
    if let Some((key, value)) = var("REMEDIATION_TIMEOUT_SECONDS") {
        config.remediation.timeout_seconds = parse_number(&key, &value)?;
    }

    Ok(())
}

fn parse_bool(key: &str, value: &str) -> ConfigResult<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(invalid(key, value)),
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, value: &str) -> ConfigResult<T> {
    value.trim().parse().map_err(|_| invalid(key, value))
}

fn invalid(key: &str, value: &str) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    }
}
