//! HashiCorp Vault Radar CLI backend.
//!
//! Content is written to a file in a private temporary directory and the
//! `vault-radar` binary is pointed at it. Findings are read back from the
//! NDJSON report the tool writes with `--outfile`.

use crate::config::VaultRadarConfig;
use crate::core::{Finding, ScanContent, ScanError, ScanResults, Scanner};

use async_trait::async_trait;
use std::path::Path;
use std::process::Stdio;
use tokio::time::Instant;

/// Scanner name reported in errors and logs.
pub const VAULT_RADAR_SCANNER_NAME: &str = "vault-radar";

const INPUT_FILE_NAME: &str = "scan-content.txt";
const OUTPUT_FILE_NAME: &str = "vault-radar-output.json";

/// Runs the vault-radar CLI as a subprocess.
///
/// A non-zero exit status is not an error: the tool exits non-zero when
/// it finds secrets. Only a spawn failure, a timeout or an unusable temp
/// directory is reported as `Err`.
#[derive(Debug, Clone)]
pub struct VaultRadarScanner {
    config: VaultRadarConfig,
}

impl VaultRadarScanner {
    /// Creates a scanner with the given invocation settings.
    pub fn new(config: VaultRadarConfig) -> Self {
        Self { config }
    }

    /// Returns the invocation settings.
    pub fn config(&self) -> &VaultRadarConfig {
        &self.config
    }

    /// Builds the argument list for one scan.
    pub fn build_args(&self, input: &Path, output: &Path) -> Vec<String> {
        let mut args: Vec<String> = self
            .config
            .scan_command
            .split_whitespace()
            .map(str::to_string)
            .collect();

        args.push("--path".to_string());
        args.push(input.display().to_string());
        args.push("--outfile".to_string());
        args.push(output.display().to_string());
        args.push("--format".to_string());
        args.push("json".to_string());
        args.extend(self.config.extra_args.iter().cloned());
        args
    }
}

#[async_trait]
impl Scanner for VaultRadarScanner {
    fn name(&self) -> &str {
        VAULT_RADAR_SCANNER_NAME
    }

    async fn scan(&self, content: &ScanContent) -> Result<ScanResults, ScanError> {
        let started = Instant::now();

        let dir = tempfile::Builder::new()
            .prefix("secretgate-scan-")
            .tempdir()?;
        let input_path = dir.path().join(INPUT_FILE_NAME);
        let output_path = dir.path().join(OUTPUT_FILE_NAME);
        tokio::fs::write(&input_path, content.content.as_bytes()).await?;

        let args = self.build_args(&input_path, &output_path);
        tracing::info!(
            command = %self.config.command,
            args = ?args,
            content_length = content.content.len(),
            "Executing scanner"
        );

        let mut command = tokio::process::Command::new(&self.config.command);
        command
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let output = match tokio::time::timeout(self.config.timeout(), command.output()).await {
            Ok(Ok(output)) => output,
            Ok(Err(err)) => {
                return Err(ScanError::command_failed(
                    VAULT_RADAR_SCANNER_NAME,
                    format!("failed to run '{}': {}", self.config.command, err),
                ))
            }
            Err(_) => {
                return Err(ScanError::timeout(
                    VAULT_RADAR_SCANNER_NAME,
                    started.elapsed(),
                ))
            }
        };

        if !output.status.success() {
            tracing::warn!(
                exit_code = ?output.status.code(),
                stdout = %String::from_utf8_lossy(&output.stdout),
                stderr = %String::from_utf8_lossy(&output.stderr),
                "Scanner returned non-zero exit code"
            );
        }

        let findings = read_findings(&output_path).await;
        let results = ScanResults::from_findings(findings, started.elapsed());

        tracing::debug!(
            has_findings = results.has_findings,
            finding_count = results.finding_count(),
            duration_ms = results.duration.as_millis() as u64,
            "Scanner finished"
        );

        Ok(results)
    }
}

async fn read_findings(path: &Path) -> Vec<Finding> {
    match tokio::fs::read_to_string(path).await {
        Ok(data) => parse_findings(&data),
        Err(err) => {
            tracing::warn!(
                output_file = %path.display(),
                error = %err,
                "Scanner output unavailable, assuming no findings"
            );
            Vec::new()
        }
    }
}

/// Parses the NDJSON report, one finding per line.
///
/// Missing fields fall back to type `secret` and severity `high`. Blank and
/// malformed lines are skipped.
pub fn parse_findings(data: &str) -> Vec<Finding> {
    let mut findings = Vec::new();

    for (index, line) in data.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let record: serde_json::Map<String, serde_json::Value> = match serde_json::from_str(line) {
            Ok(record) => record,
            Err(err) => {
                tracing::warn!(line = index + 1, error = %err, "Skipping unparseable scanner line");
                continue;
            }
        };

        let field = |key: &str| record.get(key).and_then(|v| v.as_str());

        let mut finding = Finding::new(
            field("severity").map(str::to_lowercase).unwrap_or_else(|| "high".to_string()),
            field("type").unwrap_or("secret"),
        );
        if let Some(path) = field("path") {
            finding = finding.with_location(path);
        }
        if let Some(description) = field("description") {
            finding = finding.with_description(description);
        }
        findings.push(finding);
    }

    findings
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::time::Duration;
    use tempfile::TempDir;

    /// A scanner that runs `script` through `sh` so no executable bit is needed.
    fn scripted(dir: &TempDir, script: &str, timeout_seconds: u64) -> VaultRadarScanner {
        let path = dir.path().join("fake-radar.sh");
        std::fs::write(&path, script).unwrap();
        VaultRadarScanner::new(VaultRadarConfig {
            command: "sh".to_string(),
            scan_command: path.display().to_string(),
            timeout_seconds,
            extra_args: vec!["--disable-ui".to_string()],
        })
    }

    #[test]
    fn test_build_args() {
        let scanner = VaultRadarScanner::new(VaultRadarConfig::default());
        let args = scanner.build_args(&PathBuf::from("/tmp/in.txt"), &PathBuf::from("/tmp/out.json"));
        assert_eq!(
            args,
            vec![
                "scan", "file", "--path", "/tmp/in.txt", "--outfile", "/tmp/out.json", "--format",
                "json", "--disable-ui"
            ]
        );
    }

    #[test]
    fn test_parse_findings() {
        let data = r#"{"type":"aws_access_key_id","path":"scan-content.txt","description":"AWS key","severity":"HIGH"}

not json
{"description":"something"}
{"type":"github_token","severity":"Info"}
"#;
        let findings = parse_findings(data);
        assert_eq!(findings.len(), 3);

        assert_eq!(findings[0].severity, "high");
        assert_eq!(findings[0].finding_type, "aws_access_key_id");
        assert_eq!(findings[0].location, "scan-content.txt");
        assert_eq!(findings[0].description, "AWS key");

        assert_eq!(findings[1].severity, "high");
        assert_eq!(findings[1].finding_type, "secret");

        assert_eq!(findings[2].severity, "info");
    }

    #[test]
    fn test_parse_empty_output() {
        assert!(parse_findings("").is_empty());
        assert!(parse_findings("\n\n").is_empty());
    }

    #[tokio::test]
    async fn test_missing_output_is_clean() {
        let dir = TempDir::new().unwrap();
        assert!(read_findings(&dir.path().join("absent.json")).await.is_empty());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_scan_reads_report_despite_nonzero_exit() {
        let dir = TempDir::new().unwrap();
        let scanner = scripted(
            &dir,
            r#"out=""
while [ $# -gt 0 ]; do
  if [ "$1" = "--outfile" ]; then out="$2"; fi
  shift
done
printf '{"type":"aws_access_key_id","severity":"CRITICAL"}\n' > "$out"
exit 1
"#,
            10,
        );

        let results = scanner.scan(&ScanContent::text("AKIA...")).await.unwrap();
        assert!(results.has_findings);
        assert_eq!(results.findings[0].severity, "critical");
        assert!(results.error.is_none());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_scan_without_report_is_clean() {
        let dir = TempDir::new().unwrap();
        let scanner = scripted(&dir, "exit 0\n", 10);

        let results = scanner.scan(&ScanContent::text("nothing here")).await.unwrap();
        assert!(!results.has_findings);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_scan_timeout() {
        let dir = TempDir::new().unwrap();
        let scanner = scripted(&dir, "sleep 5\n", 1);

        let err = scanner.scan(&ScanContent::text("x")).await.unwrap_err();
        match err {
            ScanError::Timeout { scanner, elapsed } => {
                assert_eq!(scanner, VAULT_RADAR_SCANNER_NAME);
                assert!(elapsed >= Duration::from_secs(1));
            }
            other => panic!("expected timeout, got {}", other),
        }
    }

    #[tokio::test]
    async fn test_missing_binary() {
        let scanner = VaultRadarScanner::new(VaultRadarConfig {
            command: "/nonexistent/secretgate-test-radar".to_string(),
            ..VaultRadarConfig::default()
        });

        let err = scanner.scan(&ScanContent::text("x")).await.unwrap_err();
        assert!(matches!(err, ScanError::CommandFailed { .. }));
    }
}
