//! Severity filtering and the block/allow decision.

use crate::config::DecisionConfig;
use crate::core::{severity_level, Decision, Finding, ScanResults};

use std::fmt::Write as _;

const REASON_TRAILER: &str = "Please remove or redact sensitive information before proceeding.";

/// Turns scan results into a [`Decision`].
///
/// Evaluation is a pure function of the results and the configuration.
#[derive(Debug, Clone, Default)]
pub struct DecisionEngine {
    config: DecisionConfig,
}

impl DecisionEngine {
    /// Creates an engine with the given policy.
    pub fn new(config: DecisionConfig) -> Self {
        Self { config }
    }

    /// Returns the policy.
    pub fn config(&self) -> &DecisionConfig {
        &self.config
    }

    /// Evaluates scan results.
    ///
    /// A scanner error allows the action unless `fail_closed` is set; either
    /// way the error lands in `scan_error` metadata. Findings below the
    /// severity threshold never block.
    pub fn evaluate(&self, results: &ScanResults) -> Decision {
        if let Some(error) = &results.error {
            let decision = if self.config.fail_closed {
                Decision::block(format!(
                    "Secret scan could not be completed: {}\n\nBlocking until the scan succeeds.",
                    error
                ))
            } else {
                Decision::allow()
            };
            tracing::warn!(
                error = %error,
                block = decision.block,
                "Scanner failed, applying scanner failure policy"
            );
            return decision.with_metadata("scan_error", serde_json::Value::String(error.clone()));
        }

        if !results.has_findings {
            return Decision::allow();
        }

        let relevant = self.filter_by_severity(&results.findings);
        if relevant.is_empty() {
            tracing::debug!(
                threshold = %self.config.severity_threshold,
                findings = results.findings.len(),
                "No findings meet the severity threshold"
            );
            return Decision::allow()
                .with_metadata("filtered_findings", findings_value(&results.findings));
        }

        let decision = if self.config.block_on_findings {
            Decision::block(build_reason(&relevant))
        } else {
            Decision::allow()
        };

        decision
            .with_metadata("finding_count", serde_json::json!(relevant.len()))
            .with_metadata("findings", findings_value(&relevant))
    }

    /// Returns the findings at or above the configured threshold, in order.
    pub fn filter_by_severity(&self, findings: &[Finding]) -> Vec<Finding> {
        let threshold = severity_level(&self.config.severity_threshold);
        findings
            .iter()
            .filter(|f| severity_level(&f.severity) >= threshold)
            .cloned()
            .collect()
    }
}

/// Builds the user-facing explanation for a blocking decision.
pub fn build_reason(findings: &[Finding]) -> String {
    let mut reason = if findings.len() == 1 {
        String::from("Secret scan detected 1 security finding:\n\n")
    } else {
        format!("Secret scan detected {} security findings:\n\n", findings.len())
    };

    for (index, finding) in findings.iter().enumerate() {
        let _ = write!(
            reason,
            "{}. [{}] {}",
            index + 1,
            finding.severity.to_uppercase(),
            finding.finding_type
        );
        if !finding.description.is_empty() {
            let _ = write!(reason, ": {}", finding.description);
        }
        if !finding.location.is_empty() {
            let _ = write!(reason, " ({})", finding.location);
        }
        reason.push('\n');
    }

    reason.push('\n');
    reason.push_str(REASON_TRAILER);
    reason
}

fn findings_value(findings: &[Finding]) -> serde_json::Value {
    serde_json::to_value(findings).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn engine(threshold: &str) -> DecisionEngine {
        DecisionEngine::new(DecisionConfig::new().with_severity_threshold(threshold))
    }

    fn scan(findings: Vec<Finding>) -> ScanResults {
        ScanResults::from_findings(findings, Duration::from_millis(7))
    }

    fn aws() -> Finding {
        Finding::new("high", "aws_access_key_id")
            .with_description("AWS Access Key ID")
            .with_location("prompt")
    }

    #[test]
    fn test_scanner_error_fails_open() {
        let decision = engine("high").evaluate(&ScanResults::failed("exit status 2", Duration::ZERO));
        assert!(!decision.block);
        assert!(decision.reason.is_empty());
        assert_eq!(decision.metadata["scan_error"], "exit status 2");
    }

    #[test]
    fn test_scanner_error_fail_closed() {
        let engine = DecisionEngine::new(DecisionConfig::new().with_fail_closed(true));
        let decision = engine.evaluate(&ScanResults::failed("exit status 2", Duration::ZERO));
        assert!(decision.block);
        assert!(decision.reason.contains("exit status 2"));
        assert_eq!(decision.metadata["scan_error"], "exit status 2");
    }

    #[test]
    fn test_no_findings_allows() {
        let decision = engine("low").evaluate(&ScanResults::clean(Duration::ZERO));
        assert_eq!(decision, Decision::allow());
    }

    #[test]
    fn test_below_threshold_allows_and_records() {
        let findings = vec![Finding::new("info", "generic_secret"), Finding::new("low", "password")];
        let decision = engine("high").evaluate(&scan(findings));

        assert!(!decision.block);
        assert_eq!(decision.metadata["filtered_findings"].as_array().unwrap().len(), 2);
        assert!(!decision.metadata.contains_key("findings"));
    }

    #[test]
    fn test_single_finding_reason() {
        let decision = engine("high").evaluate(&scan(vec![aws()]));

        assert!(decision.block);
        assert_eq!(
            decision.reason,
            "Secret scan detected 1 security finding:\n\n\
             1. [HIGH] aws_access_key_id: AWS Access Key ID (prompt)\n\n\
             Please remove or redact sensitive information before proceeding."
        );
        assert_eq!(decision.metadata["finding_count"], 1);
        assert_eq!(decision.metadata["findings"][0]["type"], "aws_access_key_id");
    }

    #[test]
    fn test_plural_reason_only_lists_relevant_findings() {
        let findings = vec![
            Finding::new("critical", "private_key"),
            Finding::new("low", "password"),
            Finding::new("HIGH", "github_token").with_location("line 4"),
        ];
        let decision = engine("high").evaluate(&scan(findings));

        assert!(decision.reason.starts_with("Secret scan detected 2 security findings:\n\n"));
        assert!(decision.reason.contains("1. [CRITICAL] private_key\n"));
        assert!(decision.reason.contains("2. [HIGH] github_token (line 4)\n"));
        assert!(!decision.reason.contains("password"));
    }

    #[test]
    fn test_block_on_findings_disabled_still_records() {
        let engine = DecisionEngine::new(DecisionConfig::new().with_block_on_findings(false));
        let decision = engine.evaluate(&scan(vec![aws()]));

        assert!(!decision.block);
        assert!(decision.reason.is_empty());
        assert_eq!(decision.metadata["finding_count"], 1);
    }

    #[test]
    fn test_threshold_end_to_end() {
        let results = scan(vec![Finding::new("high", "aws_access_key_id")]);

        let decision = engine("high").evaluate(&results);
        assert!(decision.block);
        assert!(decision.reason.contains("1 security finding"));
        assert!(decision.reason.contains("aws_access_key_id"));

        assert!(!engine("critical").evaluate(&results).block);
    }

    #[test]
    fn test_below_threshold_never_blocks() {
        let severities = ["low", "medium", "info", "bogus", ""];
        for threshold in ["high", "critical"] {
            for severity in severities {
                let decision = engine(threshold).evaluate(&scan(vec![Finding::new(severity, "x")]));
                assert!(!decision.block, "{} under {} blocked", severity, threshold);
            }
        }
    }

    #[test]
    fn test_threshold_monotonicity() {
        let findings: Vec<Finding> = ["low", "medium", "info", "high", "critical", "unknown"]
            .iter()
            .map(|s| Finding::new(*s, format!("{}_secret", s)))
            .collect();
        let thresholds = ["low", "medium", "high", "critical"];

        for pair in thresholds.windows(2) {
            let lower = engine(pair[0]).filter_by_severity(&findings);
            let higher = engine(pair[1]).filter_by_severity(&findings);
            assert!(higher.iter().all(|f| lower.contains(f)));
            assert!(lower.len() >= higher.len());
        }
    }

    #[test]
    fn test_evaluation_is_deterministic() {
        let results = scan(vec![aws(), Finding::new("critical", "private_key")]);
        let engine = engine("medium");
        assert_eq!(engine.evaluate(&results), engine.evaluate(&results));
    }
}
