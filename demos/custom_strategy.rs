//! Custom strategy example demonstrating how to implement a remediation
//! action.
//!
//! This example shows how to:
//! - Implement the RemediationStrategy trait
//! - Honor the cancellation token when the deadline fires
//! - Run a protocol directly on the RemediationEngine
//! - Fold the outcome into a decision
//!
//! Run with: cargo run --example custom_strategy

use async_trait::async_trait;
use secretgate::decision::enrich_with_remediation;
use secretgate::prelude::*;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Pretends to page the on-call engineer about leaked secrets.
#[derive(Debug)]
struct PagerStrategy {
    service: String,
    latency: Duration,
}

impl PagerStrategy {
    fn new(service: impl Into<String>, latency: Duration) -> Self {
        Self {
            service: service.into(),
            latency,
        }
    }
}

#[async_trait]
impl RemediationStrategy for PagerStrategy {
    fn strategy_type(&self) -> &str {
        "pager"
    }

    fn validate(&self) -> Result<(), String> {
        if self.service.is_empty() {
            return Err("service is required".to_string());
        }
        Ok(())
    }

    async fn execute(
        &self,
        cancel: &CancellationToken,
        input: &RemediationInput,
    ) -> RemediationResult {
        tokio::select! {
            _ = cancel.cancelled() => {
                RemediationResult::failure("pager", "Page cancelled", StrategyError::Cancelled)
            }
            _ = tokio::time::sleep(self.latency) => {
                RemediationResult::success(
                    "pager",
                    format!(
                        "Paged {} about {} finding(s)",
                        self.service,
                        input.scan_results.finding_count()
                    ),
                )
                .with_metadata("service", serde_json::json!(self.service))
            }
        }
    }
}

/// A strategy that never finishes in time and ignores cancellation.
#[derive(Debug)]
struct StuckStrategy;

#[async_trait]
impl RemediationStrategy for StuckStrategy {
    fn strategy_type(&self) -> &str {
        "stuck"
    }

    fn validate(&self) -> Result<(), String> {
        Ok(())
    }

    async fn execute(
        &self,
        _cancel: &CancellationToken,
        _input: &RemediationInput,
    ) -> RemediationResult {
        tokio::time::sleep(Duration::from_secs(30)).await;
        RemediationResult::success("stuck", "Finally done")
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    println!("=== Custom Strategy Example ===\n");

    let protocol = Protocol::new(
        "page-on-critical",
        TriggerSpec::on_findings().with_severity_threshold("critical"),
    )
    .with_strategy(StrategyConfig::new("pager"))
    .with_strategy(StrategyConfig::new("stuck"))
    .with_strategy(StrategyConfig::new("slack"));

    let engine = RemediationEngine::new(
        RemediationConfig::new()
            .with_enabled(true)
            .with_timeout_seconds(1)
            .with_protocol(protocol),
    );
    engine.register_strategy(PagerStrategy::new("secops", Duration::from_millis(120)))?;
    engine.register_strategy(StuckStrategy)?;

    let scan = ScanResults::from_findings(
        vec![Finding::new("critical", "private_key").with_location("prompt:3")],
        Duration::from_millis(35),
    );
    let mut decision = DecisionEngine::new(DecisionConfig::default()).evaluate(&scan);

    let hook_input = HookInput {
        framework: "claude".to_string(),
        hook_type: "UserPromptSubmit".to_string(),
        raw: serde_json::Map::new(),
    };
    let input = RemediationInput::new(scan, hook_input, decision.clone(), "claude");

    // "slack" is not registered and "stuck" misses the one-second deadline,
    // so three strategies still produce three results
    let results = engine.execute(&CancellationToken::new(), input).await;

    println!("Executed: {}", results.executed);
    println!("Total duration: {:?}", results.total_duration);
    for result in &results.results {
        println!(
            "  {} [{}] {} {:?}",
            if result.success { "✅" } else { "❌" },
            result.strategy_type,
            result.message,
            result.error
        );
    }

    enrich_with_remediation(&mut decision, &results);
    println!("\n=== Final Reason ===\n{}", decision.reason);

    Ok(())
}
