//! Appends finding details to a local log file.

use crate::config::expand_home;
use crate::core::StrategyError;
use crate::remediation::protocol::StrategyConfig;
use crate::remediation::strategy::{RemediationInput, RemediationResult, RemediationStrategy};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Write as _};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tokio::io::AsyncWriteExt;
use tokio_util::sync::CancellationToken;

/// Type identifier of the log strategy.
pub const LOG_STRATEGY_TYPE: &str = "log";

/// Layout of a log entry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// One JSON object per line.
    #[default]
    Json,
    /// A header line followed by one indented line per finding.
    Text,
}

impl LogFormat {
    /// Returns the format name as used in configuration.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Text => "text",
        }
    }
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "json" => Ok(Self::Json),
            "text" => Ok(Self::Text),
            other => Err(format!("format must be 'json' or 'text', got: {}", other)),
        }
    }
}

/// Remediation strategy that appends an entry per invocation to a file.
///
/// Configuration keys:
/// - `log_file` (required) - destination path; a leading `~` is expanded
/// - `format` - `json` (default) or `text`
#[derive(Debug, Clone)]
pub struct LogStrategy {
    log_file: PathBuf,
    format: LogFormat,
}

impl LogStrategy {
    /// Creates a JSON log strategy writing to `log_file`.
    pub fn new(log_file: impl Into<PathBuf>) -> Self {
        Self {
            log_file: log_file.into(),
            format: LogFormat::Json,
        }
    }

    /// Sets the entry format.
    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    /// Builds a strategy from protocol configuration.
    pub fn from_config(config: &StrategyConfig) -> Result<Self, StrategyError> {
        let log_file = config
            .get_str("log_file")
            .filter(|path| !path.is_empty())
            .ok_or_else(|| StrategyError::Configuration("log_file is required".into()))?;

        let format = match config.get_str("format").filter(|f| !f.is_empty()) {
            Some(format) => format.parse().map_err(StrategyError::Configuration)?,
            None => LogFormat::default(),
        };

        let strategy = Self::new(expand_home(log_file)).with_format(format);
        strategy.validate().map_err(StrategyError::Configuration)?;
        Ok(strategy)
    }

    /// Returns the destination path.
    pub fn log_file(&self) -> &Path {
        &self.log_file
    }

    /// Returns the entry format.
    pub fn format(&self) -> LogFormat {
        self.format
    }

    fn render(&self, input: &RemediationInput) -> Result<String, StrategyError> {
        match self.format {
            LogFormat::Json => render_json(input),
            LogFormat::Text => Ok(render_text(input)),
        }
    }

    async fn append(&self, entry: &str) -> Result<(), (&'static str, std::io::Error)> {
        if let Some(parent) = self.log_file.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| ("Failed to create log directory", e))?;
        }

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_file)
            .await
            .map_err(|e| ("Failed to open log file", e))?;

        let mut line = String::with_capacity(entry.len() + 1);
        line.push_str(entry);
        line.push('\n');

        file.write_all(line.as_bytes())
            .await
            .map_err(|e| ("Failed to write to log file", e))?;
        file.flush()
            .await
            .map_err(|e| ("Failed to write to log file", e))
    }

    fn cancelled(&self, message: &str) -> RemediationResult {
        RemediationResult::failure(LOG_STRATEGY_TYPE, message, StrategyError::Cancelled)
    }
}

#[async_trait]
impl RemediationStrategy for LogStrategy {
    fn strategy_type(&self) -> &str {
        LOG_STRATEGY_TYPE
    }

    fn validate(&self) -> Result<(), String> {
        if self.log_file.as_os_str().is_empty() {
            return Err("log_file cannot be empty".to_string());
        }
        Ok(())
    }

    async fn execute(
        &self,
        cancel: &CancellationToken,
        input: &RemediationInput,
    ) -> RemediationResult {
        if cancel.is_cancelled() {
            return self.cancelled("Log operation cancelled");
        }

        let entry = match self.render(input) {
            Ok(entry) => entry,
            Err(err) => {
                return RemediationResult::failure(
                    LOG_STRATEGY_TYPE,
                    format!("Failed to format log content: {}", err),
                    err,
                )
            }
        };

        if cancel.is_cancelled() {
            return self.cancelled("Log operation cancelled before write");
        }

        if let Err((context, err)) = self.append(&entry).await {
            tracing::warn!(
                log_file = %self.log_file.display(),
                error = %err,
                "{}", context
            );
            return RemediationResult::failure(
                LOG_STRATEGY_TYPE,
                format!("{}: {}", context, err),
                err.into(),
            );
        }

        let count = input.scan_results.finding_count();
        let file_name = self
            .log_file
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.log_file.display().to_string());
        let message = if count == 1 {
            format!("Logged 1 finding to {}", file_name)
        } else {
            format!("Logged {} findings to {}", count, file_name)
        };

        RemediationResult::success(LOG_STRATEGY_TYPE, message)
            .with_metadata(
                "log_file",
                serde_json::Value::String(self.log_file.display().to_string()),
            )
            .with_metadata("format", serde_json::Value::String(self.format.to_string()))
            .with_metadata("finding_count", serde_json::json!(count))
    }
}

fn session_id(input: &RemediationInput) -> &str {
    input.hook_input.session_id().unwrap_or_default()
}

fn render_json(input: &RemediationInput) -> Result<String, StrategyError> {
    let entry = serde_json::json!({
        "timestamp": input.timestamp.to_rfc3339_opts(chrono::SecondsFormat::Secs, true),
        "framework": input.framework,
        "session_id": session_id(input),
        "blocked": input.decision.block,
        "finding_count": input.scan_results.finding_count(),
        "findings": input.scan_results.findings,
    });
    Ok(serde_json::to_string(&entry)?)
}

fn render_text(input: &RemediationInput) -> String {
    let mut out = format!(
        "[{}] Framework: {} | Session: {} | Findings: {} | Blocked: {}",
        input.timestamp.format("%Y-%m-%d %H:%M:%S"),
        input.framework,
        session_id(input),
        input.scan_results.finding_count(),
        input.decision.block,
    );

    for finding in &input.scan_results.findings {
        let _ = write!(
            out,
            "\n  - [{}] {}",
            finding.severity.to_uppercase(),
            finding.finding_type
        );
        if !finding.description.is_empty() {
            let _ = write!(out, ": {}", finding.description);
        }
        if !finding.location.is_empty() {
            let _ = write!(out, " ({})", finding.location);
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Decision, Finding, HookInput, ScanResults};

    use chrono::TimeZone;
    use std::time::Duration;
    use tempfile::TempDir;

    fn input(findings: Vec<Finding>) -> RemediationInput {
        let mut raw = serde_json::Map::new();
        raw.insert("session_id".into(), serde_json::json!("sess-42"));

        let mut input = RemediationInput::new(
            ScanResults::from_findings(findings, Duration::from_millis(4)),
            HookInput {
                framework: "claude".into(),
                hook_type: "UserPromptSubmit".into(),
                raw,
            },
            Decision::block("found secrets"),
            "claude",
        );
        input.timestamp = chrono::Utc.with_ymd_and_hms(2024, 3, 9, 14, 5, 7).unwrap();
        input
    }

    fn aws_finding() -> Finding {
        Finding::new("high", "aws_access_key_id")
            .with_description("AWS Access Key")
            .with_location("prompt")
    }

    #[tokio::test]
    async fn test_json_entry() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("findings.log");
        let strategy = LogStrategy::new(&path);

        let result = strategy
            .execute(&CancellationToken::new(), &input(vec![aws_finding()]))
            .await;
        assert!(result.success, "{:?}", result);
        assert_eq!(result.message, "Logged 1 finding to findings.log");
        assert_eq!(result.metadata["format"], "json");
        assert_eq!(result.metadata["finding_count"], 1);

        let contents = std::fs::read_to_string(&path).unwrap();
        let entry: serde_json::Value = serde_json::from_str(contents.trim_end()).unwrap();
        assert_eq!(entry["timestamp"], "2024-03-09T14:05:07Z");
        assert_eq!(entry["framework"], "claude");
        assert_eq!(entry["session_id"], "sess-42");
        assert_eq!(entry["blocked"], true);
        assert_eq!(entry["finding_count"], 1);
        assert_eq!(entry["findings"][0]["type"], "aws_access_key_id");
    }

    #[tokio::test]
    async fn test_text_entry_and_append() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("audit.txt");
        let strategy = LogStrategy::new(&path).with_format(LogFormat::Text);

        let findings = vec![aws_finding(), Finding::new("medium", "generic_secret")];
        let first = strategy
            .execute(&CancellationToken::new(), &input(findings.clone()))
            .await;
        assert!(first.success);
        assert_eq!(first.message, "Logged 2 findings to audit.txt");

        strategy
            .execute(&CancellationToken::new(), &input(findings))
            .await;

        let contents = std::fs::read_to_string(&path).unwrap();
        let expected = "[2024-03-09 14:05:07] Framework: claude | Session: sess-42 | Findings: 2 | Blocked: true\n  - [HIGH] aws_access_key_id: AWS Access Key (prompt)\n  - [MEDIUM] generic_secret\n";
        assert_eq!(contents, format!("{}{}", expected, expected));
    }

    #[tokio::test]
    async fn test_cancelled_before_start() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("findings.log");
        let strategy = LogStrategy::new(&path);

        let cancel = CancellationToken::new();
        cancel.cancel();

        let result = strategy.execute(&cancel, &input(vec![aws_finding()])).await;
        assert!(!result.success);
        assert_eq!(result.message, "Log operation cancelled");
        assert_eq!(result.error, Some(StrategyError::Cancelled));
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_unwritable_destination_fails() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("file");
        std::fs::write(&blocker, "x").unwrap();
        let strategy = LogStrategy::new(blocker.join("findings.log"));

        let result = strategy
            .execute(&CancellationToken::new(), &input(vec![aws_finding()]))
            .await;
        assert!(!result.success);
        assert!(result.message.starts_with("Failed to create log directory"));
        assert!(matches!(result.error, Some(StrategyError::Io(_))));
    }

    #[test]
    fn test_from_config() {
        let config = StrategyConfig::new("log")
            .with_setting("log_file", serde_json::json!("/tmp/secretgate/findings.log"))
            .with_setting("format", serde_json::json!("text"));
        let strategy = LogStrategy::from_config(&config).unwrap();
        assert_eq!(strategy.format(), LogFormat::Text);
        assert_eq!(strategy.log_file(), Path::new("/tmp/secretgate/findings.log"));

        let defaulted = LogStrategy::from_config(
            &StrategyConfig::new("log").with_setting("log_file", serde_json::json!("a.log")),
        )
        .unwrap();
        assert_eq!(defaulted.format(), LogFormat::Json);
    }

    #[test]
    fn test_from_config_rejects_invalid() {
        let missing = LogStrategy::from_config(&StrategyConfig::new("log")).unwrap_err();
        assert_eq!(missing, StrategyError::Configuration("log_file is required".into()));

        let bad_format = LogStrategy::from_config(
            &StrategyConfig::new("log")
                .with_setting("log_file", serde_json::json!("a.log"))
                .with_setting("format", serde_json::json!("xml")),
        )
        .unwrap_err();
        assert!(matches!(bad_format, StrategyError::Configuration(msg) if msg.contains("xml")));
    }

    #[test]
    fn test_validate_empty_path() {
        assert!(LogStrategy::new("").validate().is_err());
        assert!(LogStrategy::new("x.log").validate().is_ok());
    }
}
