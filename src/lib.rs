//! # Secretgate
//!
//! A secret-scanning gate for AI coding assistant hooks, with policy-driven
//! concurrent remediation and structured audit logging.
//!
//! ## Overview
//!
//! Secretgate sits between a hook framework and a secret scanner:
//!
//! - Parse the hook payload and extract the content to scan
//! - Scan it with an external scanner (HashiCorp Vault Radar by default)
//! - Decide whether to block, based on a severity threshold
//! - Run the first matching remediation protocol's strategies concurrently
//!   under a shared deadline, isolating each strategy's failures
//! - Append a summary of the remediation outcome to the decision
//! - Emit audit events for the scan, the decision and the remediation
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use secretgate::backends::MockScanner;
//! use secretgate::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let processor = Processor::builder(Config::default())
//!         .with_scanner(MockScanner::new_clean())
//!         .build();
//!
//!     let payload = br#"{"hook_event_name":"UserPromptSubmit","prompt":"hello"}"#;
//!     let outcome = processor.process(payload).await?;
//!
//!     println!("{}", String::from_utf8_lossy(&outcome.output));
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! - **Core**: Findings, decisions, severities, the `Scanner` trait and errors
//! - **Backends**: Scanner implementations
//! - **Decision**: Severity filtering, block/allow and reason enrichment
//! - **Remediation**: Protocols, the strategy registry and the concurrent engine
//! - **Framework**: Hook payload parsing and response rendering
//! - **Config**: YAML file and environment layering
//! - **Audit**: Structured audit events
//! - **Processor**: The end-to-end pipeline

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod audit;
pub mod backends;
pub mod config;
pub mod core;
pub mod decision;
pub mod framework;
pub mod logging;
pub mod processor;
pub mod remediation;

// Re-export commonly used types at the crate root
pub use crate::core::{
    Decision, Finding, HookInput, ProcessError, ScanContent, ScanError, ScanResults, Scanner,
    Severity, StrategyError,
};

pub use crate::config::{Config, ConfigLoader};
pub use crate::decision::DecisionEngine;
pub use crate::framework::{FrameworkRegistry, HookFramework};
pub use crate::processor::{ProcessOutcome, Processor, ProcessorBuilder};
pub use crate::remediation::{
    Protocol, RemediationEngine, RemediationResult, RemediationResults, RemediationStrategy,
    StrategyRegistry,
};

/// Prelude module for convenient imports.
///
/// ```rust
/// use secretgate::prelude::*;
/// ```
pub mod prelude {
    pub use crate::config::{Config, DecisionConfig, RemediationConfig};
    pub use crate::core::{
        Decision, Finding, HookInput, ScanContent, ScanError, ScanResults, Scanner, Severity,
        StrategyError,
    };
    pub use crate::decision::DecisionEngine;
    pub use crate::processor::{ProcessOutcome, Processor};
    pub use crate::remediation::{
        Protocol, RemediationEngine, RemediationInput, RemediationResult, RemediationResults,
        RemediationStrategy, StrategyConfig, StrategyRegistry, TriggerSpec,
    };
}
