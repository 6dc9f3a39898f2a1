//! Mock scanner for testing.
//!
//! Returns a fixed set of findings, optionally after a delay or with a
//! forced failure, without running any external tool.

use crate::core::{Finding, ScanContent, ScanError, ScanResults, Scanner};

use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// A mock scanner for testing purposes.
///
/// # Examples
///
/// ```rust
/// use secretgate::backends::MockScanner;
/// use secretgate::core::Finding;
/// use std::time::Duration;
///
/// // Reports nothing
/// let scanner = MockScanner::new_clean();
///
/// // Reports one AWS key after 20ms
/// let scanner = MockScanner::with_findings(vec![Finding::new("high", "aws_access_key_id")])
///     .with_latency(Duration::from_millis(20));
///
/// // Fails every scan
/// let scanner = MockScanner::new().with_error("vault-radar not installed");
/// ```
#[derive(Debug)]
pub struct MockScanner {
    /// Name of this scanner instance.
    name: String,
    /// Findings returned by every scan.
    findings: Vec<Finding>,
    /// Simulated latency for scans.
    latency: Option<Duration>,
    /// Forced failure message.
    error: Option<String>,
    /// Counter for scan operations.
    scan_count: AtomicU64,
    /// Most recently scanned content.
    last_content: Mutex<Option<ScanContent>>,
}

impl MockScanner {
    /// Creates a mock scanner that reports no findings.
    pub fn new() -> Self {
        Self {
            name: "mock".to_string(),
            findings: Vec::new(),
            latency: None,
            error: None,
            scan_count: AtomicU64::new(0),
            last_content: Mutex::new(None),
        }
    }

    /// Creates a mock scanner that always reports clean.
    pub fn new_clean() -> Self {
        Self::new()
    }

    /// Creates a mock scanner that reports the given findings.
    pub fn with_findings(findings: Vec<Finding>) -> Self {
        Self {
            findings,
            ..Self::new()
        }
    }

    /// Sets the name of this scanner.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the simulated latency for scans.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Makes every scan fail with this message.
    pub fn with_error(mut self, message: impl Into<String>) -> Self {
        self.error = Some(message.into());
        self
    }

    /// Returns the number of scans performed.
    pub fn scan_count(&self) -> u64 {
        self.scan_count.load(Ordering::Relaxed)
    }

    /// Returns the content passed to the most recent scan.
    pub fn last_content(&self) -> Option<ScanContent> {
        self.last_content
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

impl Default for MockScanner {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Scanner for MockScanner {
    fn name(&self) -> &str {
        &self.name
    }

    async fn scan(&self, content: &ScanContent) -> Result<ScanResults, ScanError> {
        self.scan_count.fetch_add(1, Ordering::Relaxed);
        *self
            .last_content
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(content.clone());

        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }

        if let Some(message) = &self.error {
            return Err(ScanError::command_failed(&self.name, message.clone()));
        }

        let duration = self.latency.unwrap_or(Duration::from_millis(1));
        Ok(ScanResults::from_findings(self.findings.clone(), duration))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_scanner_clean() {
        let scanner = MockScanner::new_clean();

        let results = scanner.scan(&ScanContent::text("hello")).await.unwrap();
        assert!(!results.has_findings);
        assert_eq!(scanner.scan_count(), 1);
        assert_eq!(scanner.last_content().unwrap().content, "hello");
    }

    #[tokio::test]
    async fn test_mock_scanner_findings() {
        let scanner = MockScanner::with_findings(vec![Finding::new("high", "aws_access_key_id")]);

        let results = scanner.scan(&ScanContent::text("AKIA...")).await.unwrap();
        assert!(results.has_findings);
        assert_eq!(results.findings[0].finding_type, "aws_access_key_id");
    }

    #[tokio::test(start_paused = true)]
    async fn test_mock_scanner_latency() {
        let scanner = MockScanner::new().with_latency(Duration::from_millis(250));

        let started = tokio::time::Instant::now();
        let results = scanner.scan(&ScanContent::text("x")).await.unwrap();
        assert_eq!(started.elapsed(), Duration::from_millis(250));
        assert_eq!(results.duration, Duration::from_millis(250));
    }

    #[tokio::test]
    async fn test_mock_scanner_error() {
        let scanner = MockScanner::new().with_name("radar").with_error("binary missing");

        let err = scanner.scan(&ScanContent::text("x")).await.unwrap_err();
        assert_eq!(err.scanner(), Some("radar"));
        assert!(err.to_string().contains("binary missing"));
    }
}
