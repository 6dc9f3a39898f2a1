//! End-to-end handling of one hook invocation.
//!
//! The processor parses the hook payload, scans the extracted content,
//! decides, runs remediation, folds the remediation summary into the
//! decision and renders the framework's response envelope.

use crate::audit::{self, DecisionAuditEvent, RemediationAuditEvent, ScanAuditEvent};
use crate::backends::VaultRadarScanner;
use crate::config::Config;
use crate::core::{ArcScanner, Decision, ProcessError, ScanResults, Scanner};
use crate::decision::{enrich_with_remediation, DecisionEngine};
use crate::framework::FrameworkRegistry;
use crate::remediation::{
    ArcStrategy, RemediationEngine, RemediationInput, RemediationResults, RemediationStrategy,
    StrategyFactory, StrategyRegistry,
};

use std::sync::Arc;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Everything produced by one invocation.
#[derive(Debug, Clone)]
pub struct ProcessOutcome {
    /// Rendered response envelope, without a trailing newline.
    pub output: Vec<u8>,

    /// Exit code the process should return.
    pub exit_code: i32,

    /// The final decision, including any remediation summary.
    pub decision: Decision,

    /// What remediation did.
    pub remediation: RemediationResults,
}

/// Builder for creating a `Processor`.
pub struct ProcessorBuilder {
    config: Config,
    scanner: Option<ArcScanner>,
    frameworks: Option<FrameworkRegistry>,
    factory: StrategyFactory,
    strategies: Vec<ArcStrategy>,
}

impl ProcessorBuilder {
    /// Creates a builder for the given configuration.
    pub fn new(config: Config) -> Self {
        Self {
            config,
            scanner: None,
            frameworks: None,
            factory: StrategyFactory::new(),
            strategies: Vec::new(),
        }
    }

    /// Sets the scanner. Defaults to the vault-radar CLI.
    pub fn with_scanner<S: Scanner + 'static>(mut self, scanner: S) -> Self {
        self.scanner = Some(Arc::new(scanner));
        self
    }

    /// Sets a scanner wrapped in an Arc.
    pub fn with_arc_scanner(mut self, scanner: ArcScanner) -> Self {
        self.scanner = Some(scanner);
        self
    }

    /// Sets the framework registry. Defaults to the built-in frameworks.
    pub fn with_frameworks(mut self, frameworks: FrameworkRegistry) -> Self {
        self.frameworks = Some(frameworks);
        self
    }

    /// Sets the factory used for configured strategies.
    pub fn with_strategy_factory(mut self, factory: StrategyFactory) -> Self {
        self.factory = factory;
        self
    }

    /// Registers a strategy instance ahead of the configured ones.
    pub fn with_strategy<S: RemediationStrategy + 'static>(mut self, strategy: S) -> Self {
        self.strategies.push(Arc::new(strategy));
        self
    }

    /// Builds the processor.
    ///
    /// Strategies that fail to build or register are logged and skipped.
    pub fn build(self) -> Processor {
        let registry = Arc::new(StrategyRegistry::new());
        for strategy in self.strategies {
            let strategy_type = strategy.strategy_type().to_string();
            if let Err(err) = registry.register_arc(strategy) {
                tracing::warn!(
                    strategy_type = %strategy_type,
                    error = %err,
                    "Failed to register remediation strategy"
                );
            }
        }
        self.factory
            .register_configured_strategies(&registry, &self.config.remediation.protocols);

        let scanner = self
            .scanner
            .unwrap_or_else(|| Arc::new(VaultRadarScanner::new(self.config.vault_radar.clone())));

        Processor {
            scanner,
            frameworks: self.frameworks.unwrap_or_else(FrameworkRegistry::with_defaults),
            decision_engine: DecisionEngine::new(self.config.decision.clone()),
            remediation_engine: RemediationEngine::with_registry(
                self.config.remediation.clone(),
                registry,
            ),
            config: self.config,
        }
    }
}

/// Runs the scan, decide, remediate pipeline for hook invocations.
pub struct Processor {
    config: Config,
    scanner: ArcScanner,
    frameworks: FrameworkRegistry,
    decision_engine: DecisionEngine,
    remediation_engine: RemediationEngine,
}

impl Processor {
    /// Creates a new builder.
    pub fn builder(config: Config) -> ProcessorBuilder {
        ProcessorBuilder::new(config)
    }

    /// Creates a processor with the default scanner and frameworks.
    pub fn new(config: Config) -> Self {
        Self::builder(config).build()
    }

    /// Returns the configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Returns the remediation engine.
    pub fn remediation_engine(&self) -> &RemediationEngine {
        &self.remediation_engine
    }

    /// Returns the name of the framework payloads are parsed as.
    pub fn framework_name(&self) -> &str {
        &self.config.framework
    }

    /// Processes one hook payload for the configured framework.
    pub async fn process(&self, input: &[u8]) -> Result<ProcessOutcome, ProcessError> {
        self.process_with_cancel(&CancellationToken::new(), input).await
    }

    /// Like [`process`](Self::process), stopping remediation early if
    /// `cancel` fires.
    ///
    /// # Errors
    ///
    /// Only framework problems abort processing: an unknown framework, an
    /// unparseable payload, an unsupported hook type or an unrenderable
    /// response. Scanner and remediation failures are folded into the
    /// outcome.
    pub async fn process_with_cancel(
        &self,
        cancel: &CancellationToken,
        input: &[u8],
    ) -> Result<ProcessOutcome, ProcessError> {
        let framework_name = self.framework_name();
        let invocation_id = uuid::Uuid::new_v4().to_string();
        tracing::info!(
            invocation_id = %invocation_id,
            framework = %framework_name,
            "Processing hook request"
        );

        let framework = self.frameworks.get(framework_name)?;
        let hook_input = framework.parse_input(input)?;
        tracing::info!(hook_type = %hook_input.hook_type, "Parsed hook input");

        let content = framework.extract_content(&hook_input)?;
        tracing::debug!(
            kind = %content.kind,
            length = content.content.len(),
            "Extracted content"
        );

        let scan_results = self.run_scan(&content).await;
        audit::emit_scan_completed(&ScanAuditEvent::new(
            &invocation_id,
            self.scanner.name(),
            &scan_results,
        ));

        let mut decision = self.decision_engine.evaluate(&scan_results);
        audit::emit_decision_made(&DecisionAuditEvent::new(
            &invocation_id,
            framework.name(),
            &hook_input.hook_type,
            &decision,
        ));

        let remediation = self
            .remediation_engine
            .execute(
                cancel,
                RemediationInput::new(
                    scan_results,
                    hook_input.clone(),
                    decision.clone(),
                    framework.name(),
                ),
            )
            .await;

        if remediation.executed {
            audit::emit_remediation_completed(&RemediationAuditEvent::new(
                &invocation_id,
                &remediation,
            ));
            enrich_with_remediation(&mut decision, &remediation);
        }

        let output = framework.format_output(&decision, &hook_input)?;
        let exit_code = framework.exit_code(&decision);

        tracing::info!(
            invocation_id = %invocation_id,
            block = decision.block,
            exit_code,
            "Hook processing completed"
        );

        Ok(ProcessOutcome {
            output,
            exit_code,
            decision,
            remediation,
        })
    }

    async fn run_scan(&self, content: &crate::core::ScanContent) -> ScanResults {
        let started = Instant::now();
        match self.scanner.scan(content).await {
            Ok(results) => results,
            Err(err) => {
                tracing::warn!(
                    scanner = self.scanner.name(),
                    error = %err,
                    "Scan failed"
                );
                ScanResults::failed(err.to_string(), started.elapsed())
            }
        }
    }
}

impl std::fmt::Debug for Processor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Processor")
            .field("scanner", &self.scanner.name())
            .field("frameworks", &self.frameworks.names())
            .field("config", &self.config)
            .finish()
    }
}
