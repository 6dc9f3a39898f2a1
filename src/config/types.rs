use crate::remediation::Protocol;

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default framework identifier.
pub const DEFAULT_FRAMEWORK: &str = "claude";

/// Default scanner executable.
pub const DEFAULT_SCANNER_COMMAND: &str = "vault-radar";

/// Default remediation deadline in seconds.
pub const DEFAULT_REMEDIATION_TIMEOUT_SECS: i64 = 10;

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Hook framework to speak (e.g. "claude").
    pub framework: String,

    /// Scanner invocation settings.
    pub vault_radar: VaultRadarConfig,

    /// Diagnostic logging.
    pub logging: LoggingConfig,

    /// Block/allow policy.
    pub decision: DecisionConfig,

    /// Automated remediation.
    pub remediation: RemediationConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            framework: DEFAULT_FRAMEWORK.to_string(),
            vault_radar: VaultRadarConfig::default(),
            logging: LoggingConfig::default(),
            decision: DecisionConfig::default(),
            remediation: RemediationConfig::default(),
        }
    }
}

impl Config {
    /// Creates the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the framework.
    pub fn with_framework(mut self, framework: impl Into<String>) -> Self {
        self.framework = framework.into();
        self
    }

    /// Sets the decision policy.
    pub fn with_decision(mut self, decision: DecisionConfig) -> Self {
        self.decision = decision;
        self
    }

    /// Sets the remediation settings.
    pub fn with_remediation(mut self, remediation: RemediationConfig) -> Self {
        self.remediation = remediation;
        self
    }

    /// Sets the scanner settings.
    pub fn with_vault_radar(mut self, vault_radar: VaultRadarConfig) -> Self {
        self.vault_radar = vault_radar;
        self
    }

    /// Sets the logging settings.
    pub fn with_logging(mut self, logging: LoggingConfig) -> Self {
        self.logging = logging;
        self
    }
}

/// How to invoke the vault-radar CLI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VaultRadarConfig {
    /// Executable name or path.
    pub command: String,

    /// Subcommand words, split on whitespace.
    pub scan_command: String,

    /// Scan time budget.
    pub timeout_seconds: u64,

    /// Arguments appended after the generated ones.
    pub extra_args: Vec<String>,
}

impl Default for VaultRadarConfig {
    fn default() -> Self {
        Self {
            command: DEFAULT_SCANNER_COMMAND.to_string(),
            scan_command: "scan file".to_string(),
            timeout_seconds: 30,
            extra_args: vec!["--disable-ui".to_string()],
        }
    }
}

impl VaultRadarConfig {
    /// Returns the scan time budget.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

/// Diagnostic log settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `debug`, `info`, `warn` or `error`.
    pub level: String,

    /// `json` or `text`.
    pub format: String,

    /// Destination file. Logging is off when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_file: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "json".to_string(),
            log_file: None,
        }
    }
}

/// Block/allow policy settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecisionConfig {
    /// Block when findings at or above the threshold exist.
    pub block_on_findings: bool,

    /// Minimum severity that counts.
    pub severity_threshold: String,

    /// Block when the scanner itself fails.
    pub fail_closed: bool,
}

impl Default for DecisionConfig {
    fn default() -> Self {
        Self {
            block_on_findings: true,
            severity_threshold: "high".to_string(),
            fail_closed: false,
        }
    }
}

impl DecisionConfig {
    /// Creates the default policy.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets whether findings block.
    pub fn with_block_on_findings(mut self, block: bool) -> Self {
        self.block_on_findings = block;
        self
    }

    /// Sets the severity threshold.
    pub fn with_severity_threshold(mut self, threshold: impl Into<String>) -> Self {
        self.severity_threshold = threshold.into();
        self
    }

    /// Sets whether scanner failures block.
    pub fn with_fail_closed(mut self, fail_closed: bool) -> Self {
        self.fail_closed = fail_closed;
        self
    }
}

/// Remediation settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RemediationConfig {
    /// Master switch.
    pub enabled: bool,

    /// Deadline for a whole protocol run. Non-positive disables it.
    pub timeout_seconds: i64,

    /// Protocols in evaluation order.
    pub protocols: Vec<Protocol>,
}

impl Default for RemediationConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            timeout_seconds: DEFAULT_REMEDIATION_TIMEOUT_SECS,
            protocols: Vec::new(),
        }
    }
}

impl RemediationConfig {
    /// Creates disabled remediation settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the master switch.
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Sets the deadline in seconds.
    pub fn with_timeout_seconds(mut self, seconds: i64) -> Self {
        self.timeout_seconds = seconds;
        self
    }

    /// Replaces the protocol list.
    pub fn with_protocols(mut self, protocols: Vec<Protocol>) -> Self {
        self.protocols = protocols;
        self
    }

    /// Appends a protocol.
    pub fn with_protocol(mut self, protocol: Protocol) -> Self {
        self.protocols.push(protocol);
        self
    }

    /// Returns the deadline, or `None` when it is disabled.
    pub fn timeout(&self) -> Option<Duration> {
        u64::try_from(self.timeout_seconds)
            .ok()
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
    }
}
