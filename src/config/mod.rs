//! Configuration loading.
//!
//! Settings come from built-in defaults, then a YAML file, then
//! `SECRETGATE_*` environment variables. Command-line flags are applied by
//! the binary on top of the loaded [`Config`].

mod loader;
mod types;

pub use loader::{
    apply_env_overrides, default_config_dir, expand_home, read_config_file, ConfigLoader,
    CONFIG_FILE_NAME, ENV_PREFIX,
};
pub use types::{
    Config, DecisionConfig, LoggingConfig, RemediationConfig, VaultRadarConfig,
    DEFAULT_FRAMEWORK, DEFAULT_REMEDIATION_TIMEOUT_SECS, DEFAULT_SCANNER_COMMAND,
};
