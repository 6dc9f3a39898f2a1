//! The remediation engine: protocol selection and concurrent strategy runs.

use crate::config::RemediationConfig;
use crate::core::error::{RegistryResult, StrategyError};
use crate::remediation::protocol::Protocol;
use crate::remediation::registry::StrategyRegistry;
use crate::remediation::strategy::{
    ArcStrategy, RemediationInput, RemediationResult, RemediationResults, RemediationStrategy,
};

use futures::FutureExt;
use std::any::Any;
use std::collections::BTreeMap;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

const PANIC_MESSAGE: &str = "Strategy panicked during execution";
const DEADLINE_MESSAGE: &str = "Strategy did not complete before the remediation deadline";
const CANCELLED_MESSAGE: &str = "Strategy was cancelled before it completed";

/// How long cancelled strategies get to report their own outcome.
const CANCEL_GRACE: Duration = Duration::from_millis(50);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Interruption {
    Deadline,
    Cancelled,
}

/// Runs the first matching remediation protocol.
///
/// Only one protocol runs per invocation. Its strategies run as independent
/// tokio tasks under a single deadline; a failing, panicking or slow
/// strategy never aborts its siblings or the call itself.
#[derive(Debug)]
pub struct RemediationEngine {
    config: RemediationConfig,
    registry: Arc<StrategyRegistry>,
}

impl RemediationEngine {
    /// Creates an engine with an empty registry.
    pub fn new(config: RemediationConfig) -> Self {
        Self::with_registry(config, Arc::new(StrategyRegistry::new()))
    }

    /// Creates an engine sharing an existing registry.
    pub fn with_registry(config: RemediationConfig, registry: Arc<StrategyRegistry>) -> Self {
        Self { config, registry }
    }

    /// Registers a strategy with the engine's registry.
    pub fn register_strategy<S: RemediationStrategy + 'static>(
        &self,
        strategy: S,
    ) -> RegistryResult<()> {
        self.registry.register(strategy)
    }

    /// Returns the strategy registry.
    pub fn registry(&self) -> &Arc<StrategyRegistry> {
        &self.registry
    }

    /// Returns the configuration.
    pub fn config(&self) -> &RemediationConfig {
        &self.config
    }

    /// Returns the first protocol, in configured order, whose triggers match.
    pub fn select_protocol(&self, input: &RemediationInput) -> Option<&Protocol> {
        self.config
            .protocols
            .iter()
            .find(|protocol| protocol.should_execute(input))
    }

    /// Evaluates protocols and runs the first match.
    ///
    /// Cancelling `cancel` has the same effect as the deadline firing.
    pub async fn execute(
        &self,
        cancel: &CancellationToken,
        input: RemediationInput,
    ) -> RemediationResults {
        if !self.config.enabled {
            tracing::debug!("Remediation disabled, skipping");
            return RemediationResults::not_executed();
        }

        let Some(protocol) = self.select_protocol(&input) else {
            tracing::debug!("No remediation protocol matched triggers");
            return RemediationResults::not_executed();
        };

        tracing::info!(protocol = %protocol.name, "Matched remediation protocol");
        self.execute_protocol(cancel, protocol, input).await
    }

    async fn execute_protocol(
        &self,
        cancel: &CancellationToken,
        protocol: &Protocol,
        input: RemediationInput,
    ) -> RemediationResults {
        let started = Instant::now();
        // A deadline past the clock's range is no deadline.
        let deadline = self
            .config
            .timeout()
            .and_then(|timeout| started.checked_add(timeout));

        if protocol.strategies.is_empty() {
            tracing::warn!(protocol = %protocol.name, "Protocol has no strategies");
            return RemediationResults {
                executed: true,
                results: Vec::new(),
                total_duration: started.elapsed(),
                protocol_name: protocol.name.clone(),
            };
        }

        let token = cancel.child_token();
        let input = Arc::new(input);
        let (tx, mut rx) = mpsc::channel(protocol.strategies.len());

        let mut results = Vec::with_capacity(protocol.strategies.len());
        let mut outstanding = BTreeMap::new();

        for (index, strategy_config) in protocol.strategies.iter().enumerate() {
            let strategy_type = &strategy_config.strategy_type;
            match self.registry.get(strategy_type) {
                Ok(strategy) => {
                    outstanding.insert(index, strategy_type.clone());
                    tokio::spawn(run_strategy(
                        index,
                        strategy_type.clone(),
                        strategy,
                        Arc::clone(&input),
                        token.clone(),
                        tx.clone(),
                    ));
                }
                Err(err) => {
                    tracing::warn!(
                        strategy_type = %strategy_type,
                        error = %err,
                        "Unknown strategy type"
                    );
                    results.push(RemediationResult::failure(
                        strategy_type.clone(),
                        format!("Unknown strategy type: {}", strategy_type),
                        err.into(),
                    ));
                }
            }
        }
        drop(tx);

        let expiry = async {
            match deadline {
                Some(deadline) => tokio::time::sleep_until(deadline).await,
                None => std::future::pending().await,
            }
        };
        tokio::pin!(expiry);

        let interruption = loop {
            tokio::select! {
                biased;
                received = rx.recv() => match received {
                    Some((index, result)) => {
                        outstanding.remove(&index);
                        results.push(result);
                    }
                    None => break None,
                },
                _ = &mut expiry => {
                    tracing::warn!(
                        protocol = %protocol.name,
                        outstanding = outstanding.len(),
                        "Remediation deadline reached"
                    );
                    break Some(Interruption::Deadline);
                }
                _ = token.cancelled() => {
                    tracing::warn!(
                        protocol = %protocol.name,
                        outstanding = outstanding.len(),
                        "Remediation cancelled"
                    );
                    break Some(Interruption::Cancelled);
                }
            }
        };

        if let Some(interruption) = interruption {
            // Signal stragglers and give cooperating ones a bounded window to report.
            token.cancel();
            let grace = tokio::time::timeout(CANCEL_GRACE, async {
                while !outstanding.is_empty() {
                    match rx.recv().await {
                        Some((index, result)) => {
                            outstanding.remove(&index);
                            results.push(result);
                        }
                        None => break,
                    }
                }
            });
            let timed_out = grace.await.is_err();
            if timed_out {
                tracing::debug!(
                    protocol = %protocol.name,
                    outstanding = outstanding.len(),
                    "Strategies still running after cancellation"
                );
            }

            rx.close();
            while let Ok((index, result)) = rx.try_recv() {
                outstanding.remove(&index);
                results.push(result);
            }

            let elapsed = started.elapsed();
            for strategy_type in outstanding.into_values() {
                results.push(
                    synthesized_failure(strategy_type, interruption).with_duration(elapsed),
                );
            }
        }

        let total_duration = started.elapsed();
        tracing::info!(
            protocol = %protocol.name,
            strategies = results.len(),
            failures = results.iter().filter(|r| !r.success).count(),
            duration_ms = total_duration.as_millis() as u64,
            "Remediation protocol completed"
        );

        RemediationResults {
            executed: true,
            results,
            total_duration,
            protocol_name: protocol.name.clone(),
        }
    }
}

fn synthesized_failure(strategy_type: String, interruption: Interruption) -> RemediationResult {
    match interruption {
        Interruption::Deadline => RemediationResult::failure(
            strategy_type,
            DEADLINE_MESSAGE,
            StrategyError::DeadlineExceeded,
        ),
        Interruption::Cancelled => {
            RemediationResult::failure(strategy_type, CANCELLED_MESSAGE, StrategyError::Cancelled)
        }
    }
}

/// Worker body: runs one strategy behind a panic boundary and hands the
/// result to the aggregator without waiting past cancellation.
///
/// `strategy_type` is the configured type the strategy was resolved by.
async fn run_strategy(
    index: usize,
    strategy_type: String,
    strategy: ArcStrategy,
    input: Arc<RemediationInput>,
    token: CancellationToken,
    tx: mpsc::Sender<(usize, RemediationResult)>,
) {
    tracing::debug!(strategy_type = %strategy_type, "Executing strategy");

    let started = Instant::now();
    let outcome = AssertUnwindSafe(strategy.execute(&token, &input))
        .catch_unwind()
        .await;

    let mut result = match outcome {
        Ok(result) => result,
        Err(payload) => {
            let message = panic_message(payload.as_ref());
            tracing::error!(
                strategy_type = %strategy_type,
                panic = %message,
                "Strategy panicked"
            );
            RemediationResult::failure(
                strategy_type.clone(),
                PANIC_MESSAGE,
                StrategyError::Panicked(message),
            )
        }
    };
    result.duration = started.elapsed();
    result.strategy_type = strategy_type.clone();

    tracing::debug!(
        strategy_type = %strategy_type,
        success = result.success,
        duration_ms = result.duration.as_millis() as u64,
        "Strategy completed"
    );

    tokio::select! {
        biased;
        sent = tx.send((index, result)) => {
            if sent.is_err() {
                tracing::warn!(
                    strategy_type = %strategy_type,
                    "Aggregator stopped listening, result dropped"
                );
            }
        }
        _ = token.cancelled() => {
            tracing::warn!(strategy_type = %strategy_type, "Cancelled while delivering result");
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
