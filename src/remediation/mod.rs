//! Automated remediation.
//!
//! A [`Protocol`] pairs trigger conditions with a list of strategies. The
//! [`RemediationEngine`] picks the first protocol whose triggers match and
//! runs its strategies concurrently under a shared deadline.
//!
//! - [`protocol`] - Triggers, strategy configuration and pattern matching
//! - [`strategy`] - The `RemediationStrategy` trait and result types
//! - [`registry`] - Type-keyed strategy lookup
//! - [`engine`] - Protocol selection and concurrent execution
//! - [`strategies`] - Built-in strategies and the strategy factory

pub mod engine;
pub mod protocol;
pub mod registry;
pub mod strategies;
pub mod strategy;

pub use engine::RemediationEngine;
pub use protocol::{matches_pattern, Protocol, StrategyConfig, TriggerSpec};
pub use registry::StrategyRegistry;
pub use strategies::{LogFormat, LogStrategy, StrategyFactory};
pub use strategy::{
    ArcStrategy, RemediationInput, RemediationResult, RemediationResults, RemediationStrategy,
};
