//! Severity ordering shared by the decision engine and protocol triggers.
//!
//! Both callers go through [`severity_level`] so a threshold means the same
//! thing whether it gates blocking or remediation.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Severity of a finding, ordered from unknown to critical.
///
/// Scanners report severities as free-form strings; anything unrecognized
/// maps to [`Severity::Unknown`], which sits below every threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Unrecognized severity.
    Unknown,
    /// Low severity.
    Low,
    /// Medium severity. The scanner reports many real secrets as "info",
    /// which lands here too.
    Medium,
    /// High severity.
    High,
    /// Critical severity.
    Critical,
}

impl Severity {
    /// Parses a severity string case-insensitively.
    pub fn parse(severity: &str) -> Self {
        match severity.trim().to_ascii_lowercase().as_str() {
            "critical" => Self::Critical,
            "high" => Self::High,
            "medium" | "info" => Self::Medium,
            "low" => Self::Low,
            _ => Self::Unknown,
        }
    }

    /// Returns the numeric level used for threshold comparisons.
    pub fn level(self) -> u8 {
        match self {
            Self::Unknown => 0,
            Self::Low => 1,
            Self::Medium => 2,
            Self::High => 3,
            Self::Critical => 4,
        }
    }

    /// Returns `true` if this severity meets or exceeds `threshold`.
    pub fn meets(self, threshold: Severity) -> bool {
        self.level() >= threshold.level()
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unknown => write!(f, "unknown"),
            Self::Low => write!(f, "low"),
            Self::Medium => write!(f, "medium"),
            Self::High => write!(f, "high"),
            Self::Critical => write!(f, "critical"),
        }
    }
}

/// Maps a severity string to its level: low=1, medium/info=2, high=3,
/// critical=4, anything else 0.
pub fn severity_level(severity: &str) -> u8 {
    Severity::parse(severity).level()
}

/// Returns `true` if `severity` is at or above `threshold`.
pub fn meets_threshold(severity: &str, threshold: &str) -> bool {
    severity_level(severity) >= severity_level(threshold)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_levels() {
        assert_eq!(severity_level("low"), 1);
        assert_eq!(severity_level("medium"), 2);
        assert_eq!(severity_level("info"), 2);
        assert_eq!(severity_level("high"), 3);
        assert_eq!(severity_level("critical"), 4);
        assert_eq!(severity_level("catastrophic"), 0);
        assert_eq!(severity_level(""), 0);
    }

    #[test]
    fn test_case_insensitive() {
        assert_eq!(severity_level("HIGH"), 3);
        assert_eq!(severity_level("Critical"), 4);
        assert_eq!(Severity::parse("InFo"), Severity::Medium);
    }

    #[test]
    fn test_ordering() {
        assert!(Severity::Unknown < Severity::Low);
        assert!(Severity::Low < Severity::Medium);
        assert!(Severity::Medium < Severity::High);
        assert!(Severity::High < Severity::Critical);
    }

    #[test]
    fn test_meets_threshold() {
        assert!(meets_threshold("high", "high"));
        assert!(meets_threshold("critical", "high"));
        assert!(!meets_threshold("medium", "high"));
        assert!(!meets_threshold("bogus", "low"));
        // An unknown threshold admits everything, including unknown severities.
        assert!(meets_threshold("bogus", "bogus"));
    }
}
