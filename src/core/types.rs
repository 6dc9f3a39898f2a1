//! Core types used throughout the secretgate library.
//!
//! These are created fresh for each hook invocation and discarded once the
//! decision has been rendered; nothing here is persisted.

use crate::core::severity::Severity;

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

/// A single security finding reported by the scanner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    /// Severity as reported by the scanner (e.g. "high", "info").
    pub severity: String,

    /// Finding type identifier (e.g. "aws_access_key_id").
    #[serde(rename = "type")]
    pub finding_type: String,

    /// Where the finding was detected.
    #[serde(default)]
    pub location: String,

    /// Human-readable description.
    #[serde(default)]
    pub description: String,
}

impl Finding {
    /// Creates a finding with the given severity and type.
    pub fn new(severity: impl Into<String>, finding_type: impl Into<String>) -> Self {
        Self {
            severity: severity.into(),
            finding_type: finding_type.into(),
            location: String::new(),
            description: String::new(),
        }
    }

    /// Sets the location.
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = location.into();
        self
    }

    /// Sets the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Returns the parsed severity.
    pub fn severity(&self) -> Severity {
        Severity::parse(&self.severity)
    }
}

/// Content extracted from a hook payload for scanning.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanContent {
    /// Kind of content ("text", "file", "directory").
    pub kind: String,

    /// The content itself.
    pub content: String,

    /// Additional context (session id, working directory, ...).
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

impl ScanContent {
    /// Creates text content.
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            kind: "text".to_string(),
            content: content.into(),
            metadata: HashMap::new(),
        }
    }

    /// Adds a metadata entry.
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

/// The outcome of one scanner run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScanResults {
    /// Whether any findings were reported.
    pub has_findings: bool,

    /// Findings in scanner order.
    pub findings: Vec<Finding>,

    /// How long the scan took.
    #[serde(with = "duration_ms")]
    pub duration: Duration,

    /// Scanner infrastructure failure, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ScanResults {
    /// Creates results from a list of findings.
    pub fn from_findings(findings: Vec<Finding>, duration: Duration) -> Self {
        Self {
            has_findings: !findings.is_empty(),
            findings,
            duration,
            error: None,
        }
    }

    /// Creates results with no findings.
    pub fn clean(duration: Duration) -> Self {
        Self::from_findings(Vec::new(), duration)
    }

    /// Creates results recording a scanner failure.
    pub fn failed(error: impl Into<String>, duration: Duration) -> Self {
        Self {
            has_findings: false,
            findings: Vec::new(),
            duration,
            error: Some(error.into()),
        }
    }

    /// Returns the number of findings.
    pub fn finding_count(&self) -> usize {
        self.findings.len()
    }
}

/// The block/allow decision for a hook invocation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Decision {
    /// Whether the action should be blocked.
    pub block: bool,

    /// Human-readable explanation. Only enrichment mutates this after the
    /// decision engine produced it.
    pub reason: String,

    /// Additional observability data.
    #[serde(default)]
    pub metadata: HashMap<String, serde_json::Value>,
}

impl Decision {
    /// Creates an allow decision with empty metadata.
    pub fn allow() -> Self {
        Self::default()
    }

    /// Creates a block decision with the given reason.
    pub fn block(reason: impl Into<String>) -> Self {
        Self {
            block: true,
            reason: reason.into(),
            metadata: HashMap::new(),
        }
    }

    /// Adds a metadata entry.
    pub fn with_metadata(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }
}

/// A hook payload after framework-level parsing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HookInput {
    /// Framework that produced the payload (e.g. "claude").
    pub framework: String,

    /// Hook event type (e.g. "UserPromptSubmit").
    pub hook_type: String,

    /// The raw JSON object as received.
    #[serde(default)]
    pub raw: serde_json::Map<String, serde_json::Value>,
}

impl HookInput {
    /// Returns a string field from the raw payload.
    pub fn raw_str(&self, key: &str) -> Option<&str> {
        self.raw.get(key).and_then(|v| v.as_str())
    }

    /// Returns the session id, if the payload carries one.
    pub fn session_id(&self) -> Option<&str> {
        self.raw_str("session_id")
    }
}

/// Serde helper that stores a `Duration` as whole milliseconds.
pub(crate) mod duration_ms {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        (duration.as_millis() as u64).serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(millis))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_results_from_findings() {
        let results = ScanResults::from_findings(
            vec![Finding::new("high", "aws_access_key_id")],
            Duration::from_millis(12),
        );
        assert!(results.has_findings);
        assert_eq!(results.finding_count(), 1);
        assert!(results.error.is_none());

        let clean = ScanResults::clean(Duration::ZERO);
        assert!(!clean.has_findings);
    }

    #[test]
    fn test_finding_serde_uses_type_key() {
        let finding = Finding::new("info", "github_token").with_location("prompt:3");
        let json = serde_json::to_value(&finding).unwrap();
        assert_eq!(json["type"], "github_token");
        assert_eq!(json["location"], "prompt:3");
        assert_eq!(finding.severity(), Severity::Medium);
    }

    #[test]
    fn test_hook_input_session_id() {
        let mut raw = serde_json::Map::new();
        raw.insert("session_id".into(), serde_json::json!("abc-123"));
        let input = HookInput {
            framework: "claude".into(),
            hook_type: "UserPromptSubmit".into(),
            raw,
        };
        assert_eq!(input.session_id(), Some("abc-123"));
        assert_eq!(input.raw_str("missing"), None);
    }

    #[test]
    fn test_scan_results_duration_serialized_as_millis() {
        let results = ScanResults::failed("boom", Duration::from_millis(1500));
        let json = serde_json::to_value(&results).unwrap();
        assert_eq!(json["duration"], 1500);
        assert_eq!(json["error"], "boom");
    }
}
