//! Remediation protocols and their trigger conditions.

use crate::core::{severity_level, Decision, Finding, ScanResults};
use crate::remediation::strategy::RemediationInput;

use serde::{Deserialize, Serialize};

/// Conditions under which a protocol fires.
///
/// Active conditions are combined with AND. A protocol with neither
/// `on_block` nor `on_findings` set never fires.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriggerSpec {
    /// Fire only when the decision blocks.
    #[serde(default)]
    pub on_block: bool,

    /// Fire only when the scan produced findings.
    #[serde(default)]
    pub on_findings: bool,

    /// At least one finding must meet this severity.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub severity_threshold: Option<String>,

    /// At least one finding type must match one of these patterns.
    #[serde(default, rename = "finding_types", skip_serializing_if = "Vec::is_empty")]
    pub finding_type_patterns: Vec<String>,
}

impl TriggerSpec {
    /// Creates a trigger that fires on blocked decisions.
    pub fn on_block() -> Self {
        Self {
            on_block: true,
            ..Self::default()
        }
    }

    /// Creates a trigger that fires when findings exist.
    pub fn on_findings() -> Self {
        Self {
            on_findings: true,
            ..Self::default()
        }
    }

    /// Sets the severity threshold.
    pub fn with_severity_threshold(mut self, threshold: impl Into<String>) -> Self {
        self.severity_threshold = Some(threshold.into());
        self
    }

    /// Adds a finding type pattern.
    pub fn with_finding_type(mut self, pattern: impl Into<String>) -> Self {
        self.finding_type_patterns.push(pattern.into());
        self
    }

    /// Returns `true` if no trigger is active, so the protocol can never fire.
    pub fn is_disabled(&self) -> bool {
        !self.on_block && !self.on_findings
    }
}

/// Configuration for one strategy inside a protocol.
///
/// The `config` map is opaque here; only the strategy reads it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StrategyConfig {
    /// Type tag used to look the strategy up in the registry.
    #[serde(rename = "type")]
    pub strategy_type: String,

    /// Strategy-specific settings.
    #[serde(default)]
    pub config: serde_json::Map<String, serde_json::Value>,
}

impl StrategyConfig {
    /// Creates a strategy config with an empty settings map.
    pub fn new(strategy_type: impl Into<String>) -> Self {
        Self {
            strategy_type: strategy_type.into(),
            config: serde_json::Map::new(),
        }
    }

    /// Adds a setting.
    pub fn with_setting(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.config.insert(key.into(), value);
        self
    }

    /// Returns a string setting.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.config.get(key).and_then(|v| v.as_str())
    }
}

/// A named set of strategies guarded by a trigger.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Protocol {
    /// Protocol name, reported in the results.
    pub name: String,

    /// When the protocol fires.
    #[serde(default)]
    pub triggers: TriggerSpec,

    /// Strategies to run, in configured order.
    #[serde(default)]
    pub strategies: Vec<StrategyConfig>,
}

impl Protocol {
    /// Creates a protocol with the given name and trigger.
    pub fn new(name: impl Into<String>, triggers: TriggerSpec) -> Self {
        Self {
            name: name.into(),
            triggers,
            strategies: Vec::new(),
        }
    }

    /// Adds a strategy.
    pub fn with_strategy(mut self, strategy: StrategyConfig) -> Self {
        self.strategies.push(strategy);
        self
    }

    /// Evaluates the triggers against a remediation input.
    pub fn should_execute(&self, input: &RemediationInput) -> bool {
        self.matches(&input.scan_results, &input.decision)
    }

    /// Evaluates the triggers against scan results and a decision.
    pub fn matches(&self, scan: &ScanResults, decision: &Decision) -> bool {
        let triggers = &self.triggers;

        if triggers.on_block && !decision.block {
            return false;
        }

        if triggers.on_findings && !scan.has_findings {
            return false;
        }

        if triggers.is_disabled() {
            return false;
        }

        if scan.has_findings {
            if let Some(threshold) = triggers
                .severity_threshold
                .as_deref()
                .filter(|t| !t.is_empty())
            {
                if !any_meets_threshold(&scan.findings, threshold) {
                    return false;
                }
            }

            if !triggers.finding_type_patterns.is_empty()
                && !any_type_matches(&scan.findings, &triggers.finding_type_patterns)
            {
                return false;
            }
        }

        true
    }
}

fn any_meets_threshold(findings: &[Finding], threshold: &str) -> bool {
    let threshold = severity_level(threshold);
    findings
        .iter()
        .any(|f| severity_level(&f.severity) >= threshold)
}

fn any_type_matches(findings: &[Finding], patterns: &[String]) -> bool {
    findings.iter().any(|f| {
        patterns
            .iter()
            .any(|p| matches_pattern(&f.finding_type, p))
    })
}

/// Glob-style matching where `*` matches any run of characters.
///
/// Without a wildcard the match is exact. The prefix and suffix around the
/// wildcards may not share characters of `value`, so `"ab"` does not match
/// `"ab*b"`. Prefix/suffix checks that allow such overlap would accept it.
pub fn matches_pattern(value: &str, pattern: &str) -> bool {
    if !pattern.contains('*') {
        return value == pattern;
    }

    let parts: Vec<&str> = pattern.split('*').collect();
    let (first, rest) = match parts.split_first() {
        Some(split) => split,
        None => return true,
    };
    let (last, middle) = match rest.split_last() {
        Some(split) => split,
        None => return value == *first,
    };

    if value.len() < first.len() + last.len() {
        return false;
    }
    if !value.starts_with(first) || !value.ends_with(last) {
        return false;
    }

    // Middle segments must appear in order between the prefix and suffix.
    let mut remaining = &value[first.len()..value.len() - last.len()];
    for part in middle.iter().filter(|p| !p.is_empty()) {
        match remaining.find(part) {
            Some(idx) => remaining = &remaining[idx + part.len()..],
            None => return false,
        }
    }

    true
}
