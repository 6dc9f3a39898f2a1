//! Error types for the secretgate library.
//!
//! Every concern gets its own typed error. Nothing in the decision or
//! remediation pipeline escalates an error to the caller: scanner failures
//! fail open (or closed, by policy), and strategy failures become failed
//! [`RemediationResult`](crate::remediation::RemediationResult)s.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Errors raised by the scanner collaborator.
#[derive(Debug, Error)]
pub enum ScanError {
    /// The scanner process could not be started or exited abnormally.
    #[error("scanner '{scanner}' command failed: {message}")]
    CommandFailed {
        /// Name of the scanner.
        scanner: String,
        /// Description of the failure.
        message: String,
    },

    /// The scan did not finish within its time budget.
    #[error("scanner '{scanner}' timed out after {elapsed:?}")]
    Timeout {
        /// Name of the scanner.
        scanner: String,
        /// How long the scan ran before it was abandoned.
        elapsed: Duration,
    },

    /// The scanner output could not be read.
    #[error("unreadable output from scanner '{scanner}': {details}")]
    OutputUnreadable {
        /// Name of the scanner.
        scanner: String,
        /// What went wrong.
        details: String,
    },

    /// An I/O error occurred while preparing the scan.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// An internal error occurred.
    #[error("internal error: {message}")]
    Internal {
        /// Description of the internal error.
        message: String,
    },

    /// The scanner is misconfigured.
    #[error("configuration error: {message}")]
    Configuration {
        /// Description of the configuration error.
        message: String,
    },
}

impl ScanError {
    /// Returns the scanner name if this error is associated with one.
    pub fn scanner(&self) -> Option<&str> {
        match self {
            Self::CommandFailed { scanner, .. }
            | Self::Timeout { scanner, .. }
            | Self::OutputUnreadable { scanner, .. } => Some(scanner),
            _ => None,
        }
    }

    /// Creates a `CommandFailed` error.
    pub fn command_failed(scanner: impl Into<String>, message: impl Into<String>) -> Self {
        Self::CommandFailed {
            scanner: scanner.into(),
            message: message.into(),
        }
    }

    /// Creates a `Timeout` error.
    pub fn timeout(scanner: impl Into<String>, elapsed: Duration) -> Self {
        Self::Timeout {
            scanner: scanner.into(),
            elapsed,
        }
    }

    /// Creates an `Internal` error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Creates a `Configuration` error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }
}

/// Errors raised by the strategy registry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// The strategy reported an empty type identifier.
    #[error("strategy type cannot be empty")]
    EmptyType,

    /// The strategy rejected its own configuration.
    #[error("strategy '{strategy_type}' failed validation: {reason}")]
    Validation {
        /// Type of the strategy that failed validation.
        strategy_type: String,
        /// Validation failure.
        reason: String,
    },

    /// A strategy with this type is already registered.
    #[error("strategy type '{0}' is already registered")]
    AlreadyRegistered(String),

    /// No strategy with this type is registered.
    #[error("strategy type '{0}' not found")]
    NotFound(String),
}

/// Errors attached to a failed remediation result.
///
/// These are values, not escalations: the engine records them on the
/// result and keeps going.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "kind", content = "message", rename_all = "snake_case")]
pub enum StrategyError {
    /// The strategy observed cancellation before finishing its work.
    #[error("strategy cancelled")]
    Cancelled,

    /// The strategy was still running when the protocol deadline fired.
    #[error("remediation deadline exceeded")]
    DeadlineExceeded,

    /// The strategy panicked.
    #[error("panic: {0}")]
    Panicked(String),

    /// The strategy type could not be resolved.
    #[error("unknown strategy: {0}")]
    Unknown(String),

    /// The strategy configuration is invalid.
    #[error("invalid strategy configuration: {0}")]
    Configuration(String),

    /// An I/O operation failed.
    #[error("I/O error: {0}")]
    Io(String),

    /// A payload could not be serialized.
    #[error("serialization failed: {0}")]
    Serialization(String),

    /// Any other strategy failure.
    #[error("{0}")]
    Failed(String),
}

impl StrategyError {
    /// Returns `true` if the failure came from cancellation or the deadline.
    pub fn is_cancellation(&self) -> bool {
        matches!(self, Self::Cancelled | Self::DeadlineExceeded)
    }
}

impl From<std::io::Error> for StrategyError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for StrategyError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<RegistryError> for StrategyError {
    fn from(err: RegistryError) -> Self {
        match err {
            RegistryError::NotFound(strategy_type) => Self::Unknown(strategy_type),
            other => Self::Configuration(other.to_string()),
        }
    }
}

/// Errors raised while parsing or rendering hook framework payloads.
#[derive(Debug, Error)]
pub enum FrameworkError {
    /// The hook payload is not valid JSON.
    #[error("failed to decode JSON input: {0}")]
    InvalidJson(#[source] serde_json::Error),

    /// A required field is missing or has the wrong type.
    #[error("missing or invalid field '{0}'")]
    MissingField(String),

    /// No handler accepts this hook type.
    #[error("no handler found for hook type '{0}'")]
    NoHandler(String),

    /// The requested framework is not registered.
    #[error("framework '{name}' not registered; available frameworks: {available:?}")]
    UnknownFramework {
        /// Requested name.
        name: String,
        /// Registered names.
        available: Vec<String>,
    },

    /// The output envelope could not be serialized.
    #[error("failed to serialize output: {0}")]
    Serialization(#[source] serde_json::Error),
}

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file exists but could not be read.
    #[error("failed to read config file '{path}': {source}")]
    Read {
        /// Path of the file.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The configuration file is not valid YAML for the expected shape.
    #[error("failed to parse config file '{path}': {source}")]
    Parse {
        /// Path of the file.
        path: String,
        /// Underlying parse error.
        #[source]
        source: serde_yaml::Error,
    },

    /// An override value could not be interpreted.
    #[error("invalid value for '{key}': {value}")]
    InvalidValue {
        /// Configuration key.
        key: String,
        /// Offending value.
        value: String,
    },
}

/// Errors that abort processing of a hook invocation.
///
/// Only the framework boundary can abort; scanning and remediation never do.
#[derive(Debug, Error)]
pub enum ProcessError {
    /// Input parsing, content extraction or output rendering failed.
    #[error(transparent)]
    Framework(#[from] FrameworkError),
}

/// A specialized `Result` type for scan operations.
pub type ScanResult<T> = Result<T, ScanError>;

/// A specialized `Result` type for registry operations.
pub type RegistryResult<T> = Result<T, RegistryError>;

/// A specialized `Result` type for framework operations.
pub type FrameworkResult<T> = Result<T, FrameworkError>;

/// A specialized `Result` type for configuration loading.
pub type ConfigResult<T> = Result<T, ConfigError>;
