//! The remediation strategy contract and the values it produces.

use crate::core::{duration_ms, Decision, HookInput, ScanResults, StrategyError};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Everything a strategy may look at. Strategies only read it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemediationInput {
    /// Scanner output for this invocation.
    pub scan_results: ScanResults,

    /// The originating hook payload.
    pub hook_input: HookInput,

    /// The decision as produced by the decision engine.
    pub decision: Decision,

    /// When remediation was requested.
    pub timestamp: DateTime<Utc>,

    /// Framework identifier (e.g. "claude").
    pub framework: String,
}

impl RemediationInput {
    /// Creates an input stamped with the current time.
    pub fn new(
        scan_results: ScanResults,
        hook_input: HookInput,
        decision: Decision,
        framework: impl Into<String>,
    ) -> Self {
        Self {
            scan_results,
            hook_input,
            decision,
            timestamp: Utc::now(),
            framework: framework.into(),
        }
    }
}

/// Outcome of one strategy invocation attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemediationResult {
    /// Type of the strategy that produced this result.
    pub strategy_type: String,

    /// Whether the strategy succeeded.
    pub success: bool,

    /// Human-readable summary shown to the user.
    pub message: String,

    /// Wall-clock time spent in the strategy.
    #[serde(with = "duration_ms")]
    pub duration: Duration,

    /// Strategy-specific details.
    #[serde(default)]
    pub metadata: HashMap<String, serde_json::Value>,

    /// Why the strategy failed, if it did.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<StrategyError>,
}

impl RemediationResult {
    /// Creates a successful result.
    pub fn success(strategy_type: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            strategy_type: strategy_type.into(),
            success: true,
            message: message.into(),
            duration: Duration::ZERO,
            metadata: HashMap::new(),
            error: None,
        }
    }

    /// Creates a failed result.
    pub fn failure(
        strategy_type: impl Into<String>,
        message: impl Into<String>,
        error: StrategyError,
    ) -> Self {
        Self {
            strategy_type: strategy_type.into(),
            success: false,
            message: message.into(),
            duration: Duration::ZERO,
            metadata: HashMap::new(),
            error: Some(error),
        }
    }

    /// Adds a metadata entry.
    pub fn with_metadata(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    /// Sets the duration.
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }
}

/// Aggregated outcome of a remediation run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RemediationResults {
    /// `false` when remediation is disabled or no protocol matched.
    pub executed: bool,

    /// One result per configured strategy, in completion order.
    pub results: Vec<RemediationResult>,

    /// Wall-clock time for the whole protocol.
    #[serde(with = "duration_ms")]
    pub total_duration: Duration,

    /// Name of the protocol that ran.
    #[serde(default)]
    pub protocol_name: String,
}

impl RemediationResults {
    /// Results for a run that did not execute any protocol.
    pub fn not_executed() -> Self {
        Self::default()
    }

    /// Number of successful strategies.
    pub fn success_count(&self) -> usize {
        self.results.iter().filter(|r| r.success).count()
    }

    /// Number of failed strategies.
    pub fn failure_count(&self) -> usize {
        self.results.len() - self.success_count()
    }
}

/// A remediation action that runs when a protocol fires.
///
/// Strategies run concurrently with their siblings under a shared deadline.
/// A strategy should check `cancel` before expensive work and report a
/// cancelled failure rather than silently succeeding. Panics are caught by
/// the engine and turned into failed results.
///
/// # Example Implementation
///
/// ```rust,ignore
/// use secretgate::remediation::{RemediationInput, RemediationResult, RemediationStrategy};
/// use async_trait::async_trait;
/// use tokio_util::sync::CancellationToken;
///
/// #[derive(Debug)]
/// struct NotifyStrategy;
///
/// #[async_trait]
/// impl RemediationStrategy for NotifyStrategy {
///     fn strategy_type(&self) -> &str {
///         "notify"
///     }
///
///     fn validate(&self) -> Result<(), String> {
///         Ok(())
///     }
///
///     async fn execute(
///         &self,
///         cancel: &CancellationToken,
///         input: &RemediationInput,
///     ) -> RemediationResult {
///         RemediationResult::success("notify", "Sent notification")
///     }
/// }
/// ```
#[async_trait]
pub trait RemediationStrategy: Send + Sync + Debug {
    /// Type identifier used to address this strategy from configuration.
    fn strategy_type(&self) -> &str;

    /// Checks the strategy's own configuration.
    fn validate(&self) -> Result<(), String>;

    /// Performs the remediation action.
    async fn execute(&self, cancel: &CancellationToken, input: &RemediationInput)
        -> RemediationResult;
}

/// An arc-wrapped strategy for shared ownership.
pub type ArcStrategy = Arc<dyn RemediationStrategy>;
