//! Appends the remediation summary to a decision's reason.

use crate::core::Decision;
use crate::remediation::RemediationResults;

use std::fmt::Write as _;
use std::time::Duration;

/// Adds a remediation summary to `decision.reason`.
///
/// Does nothing unless remediation executed and produced at least one
/// result. Only the reason changes; `block` and metadata are untouched.
pub fn enrich_with_remediation(decision: &mut Decision, results: &RemediationResults) {
    if !results.executed || results.results.is_empty() {
        return;
    }

    let summary = remediation_summary(results);
    if decision.reason.is_empty() {
        decision.reason = summary;
    } else {
        decision.reason.push_str("\n\n");
        decision.reason.push_str(&summary);
    }
}

/// Renders the header and one line per result, in completion order.
pub fn remediation_summary(results: &RemediationResults) -> String {
    let count = results.results.len();
    let mut summary = format!(
        "Remediation actions taken ({} {}, {} total):",
        count,
        if count == 1 { "strategy" } else { "strategies" },
        format_duration(results.total_duration)
    );

    for result in &results.results {
        let glyph = if result.success { '✓' } else { '✗' };
        let _ = write!(
            summary,
            "\n  {} {} ({})",
            glyph,
            result.message,
            format_duration(result.duration)
        );
    }

    summary
}

/// Formats a duration as whole milliseconds below one second, otherwise as
/// seconds with one decimal.
pub fn format_duration(duration: Duration) -> String {
    let millis = duration.as_millis();
    if millis < 1000 {
        format!("{}ms", millis)
    } else {
        format!("{:.1}s", millis as f64 / 1000.0)
    }
}
