//! Tracing setup for the binary.
//!
//! Stdout belongs to the hook framework's response envelope, so log output
//! goes only to the configured log file. Without one, no subscriber is
//! installed and every event is discarded.

use crate::config::{expand_home, LoggingConfig};

use std::fs::{self, File, OpenOptions};
use std::path::Path;
use std::sync::Mutex;
use thiserror::Error;
use tracing_subscriber::{fmt, prelude::*, EnvFilter, Layer, Registry};

const LEVELS: [&str; 4] = ["debug", "info", "warn", "error"];

/// Error type for logging initialization.
#[derive(Debug, Error)]
pub enum LoggingError {
    /// The level is not one of debug, info, warn or error.
    #[error("invalid log level '{0}'; expected one of debug, info, warn, error")]
    InvalidLevel(String),

    /// The format is not json or text.
    #[error("invalid log format '{0}'; expected json or text")]
    InvalidFormat(String),

    /// The log file or its directory could not be prepared.
    #[error("failed to open log file '{path}': {source}")]
    Open {
        /// Path of the log file.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to set global subscriber.
    #[error("failed to set global subscriber: {0}")]
    SetGlobalSubscriber(#[from] tracing_subscriber::util::TryInitError),
}

/// Installs the global subscriber described by `config`.
///
/// Returns `Ok(false)` when no log file is configured and nothing was
/// installed.
///
/// # Errors
///
/// Returns an error for an unknown level or format, an unopenable log
/// file, or when a global subscriber is already set.
pub fn init_logging(config: &LoggingConfig) -> Result<bool, LoggingError> {
    let level = parse_level(&config.level)?;
    let json = parse_format(&config.format)?;

    let Some(path) = config.log_file.as_deref().filter(|p| !p.trim().is_empty()) else {
        return Ok(false);
    };
    let writer = Mutex::new(open_log_file(&expand_home(path))?);

    let layer: Box<dyn Layer<Registry> + Send + Sync> = if json {
        fmt::layer()
            .json()
            .with_target(true)
            .with_ansi(false)
            .with_writer(writer)
            .boxed()
    } else {
        fmt::layer()
            .with_target(true)
            .with_ansi(false)
            .with_writer(writer)
            .boxed()
    };

    tracing_subscriber::registry()
        .with(layer)
        .with(EnvFilter::new(level))
        .try_init()?;

    Ok(true)
}

fn parse_level(level: &str) -> Result<&'static str, LoggingError> {
    let normalized = level.trim().to_ascii_lowercase();
    LEVELS
        .into_iter()
        .find(|l| *l == normalized)
        .ok_or_else(|| LoggingError::InvalidLevel(level.to_string()))
}

fn parse_format(format: &str) -> Result<bool, LoggingError> {
    match format.trim().to_ascii_lowercase().as_str() {
        "json" => Ok(true),
        "text" => Ok(false),
        _ => Err(LoggingError::InvalidFormat(format.to_string())),
    }
}

fn open_log_file(path: &Path) -> Result<File, LoggingError> {
    let open_error = |source| LoggingError::Open {
        path: path.display().to_string(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(open_error)?;
    }

    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(open_error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_level() {
        assert_eq!(parse_level("info").unwrap(), "info");
        assert_eq!(parse_level(" WARN ").unwrap(), "warn");
        assert!(matches!(
            parse_level("verbose"),
            Err(LoggingError::InvalidLevel(ref l)) if l == "verbose"
        ));
    }

    #[test]
    fn test_parse_format() {
        assert!(parse_format("json").unwrap());
        assert!(!parse_format("Text").unwrap());
        assert!(matches!(parse_format("xml"), Err(LoggingError::InvalidFormat(_))));
    }

    #[test]
    fn test_no_log_file_installs_nothing() {
        assert!(!init_logging(&LoggingConfig::default()).unwrap());

        let blank = LoggingConfig {
            log_file: Some("  ".to_string()),
            ..LoggingConfig::default()
        };
        assert!(!init_logging(&blank).unwrap());
    }

    #[test]
    fn test_invalid_settings_rejected_before_install() {
        let config = LoggingConfig {
            level: "loud".to_string(),
            ..LoggingConfig::default()
        };
        assert!(matches!(init_logging(&config), Err(LoggingError::InvalidLevel(_))));
    }

    #[test]
    fn test_open_log_file_creates_parent() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("secretgate.log");

        open_log_file(&path).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_open_log_file_reports_path() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("file");
        fs::write(&blocker, "x").unwrap();

        let err = open_log_file(&blocker.join("secretgate.log")).unwrap_err();
        assert!(err.to_string().contains("secretgate.log"));
    }
}
