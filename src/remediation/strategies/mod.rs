//! Built-in remediation strategies and the factory that instantiates them
//! from protocol configuration.

mod log;

pub use log::{LogFormat, LogStrategy, LOG_STRATEGY_TYPE};

use crate::core::StrategyError;
use crate::remediation::protocol::{Protocol, StrategyConfig};
use crate::remediation::registry::StrategyRegistry;
use crate::remediation::strategy::ArcStrategy;

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

/// Constructor for a strategy type.
pub type StrategyBuilder = fn(&StrategyConfig) -> Result<ArcStrategy, StrategyError>;

/// Maps strategy type tags to constructors.
#[derive(Clone)]
pub struct StrategyFactory {
    builders: HashMap<String, StrategyBuilder>,
}

impl fmt::Debug for StrategyFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StrategyFactory")
            .field("types", &self.supported_types())
            .finish()
    }
}

impl Default for StrategyFactory {
    fn default() -> Self {
        let mut factory = Self::empty();
        factory.register_builder(LOG_STRATEGY_TYPE, build_log);
        factory
    }
}

fn build_log(config: &StrategyConfig) -> Result<ArcStrategy, StrategyError> {
    Ok(Arc::new(LogStrategy::from_config(config)?))
}

impl StrategyFactory {
    /// Creates a factory that knows the built-in strategies.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a factory with no builders.
    pub fn empty() -> Self {
        Self {
            builders: HashMap::new(),
        }
    }

    /// Adds or replaces the builder for a type.
    pub fn register_builder(&mut self, strategy_type: impl Into<String>, builder: StrategyBuilder) {
        self.builders.insert(strategy_type.into(), builder);
    }

    /// Returns the known types, sorted.
    pub fn supported_types(&self) -> Vec<String> {
        let mut types: Vec<String> = self.builders.keys().cloned().collect();
        types.sort();
        types
    }

    /// Instantiates a strategy from its configuration.
    pub fn create(&self, config: &StrategyConfig) -> Result<ArcStrategy, StrategyError> {
        let builder = self
            .builders
            .get(&config.strategy_type)
            .ok_or_else(|| StrategyError::Unknown(config.strategy_type.clone()))?;
        builder(config)
    }

    /// Instantiates and registers the strategies referenced by `protocols`.
    ///
    /// The first configuration seen for a type wins. Construction and
    /// registration problems are logged and skipped; such types surface later
    /// as unknown-strategy results. Returns the number registered.
    pub fn register_configured_strategies(
        &self,
        registry: &StrategyRegistry,
        protocols: &[Protocol],
    ) -> usize {
        let mut seen = HashSet::new();
        let mut registered = 0;

        for protocol in protocols {
            for config in &protocol.strategies {
                if !seen.insert(config.strategy_type.as_str()) {
                    continue;
                }

                let strategy = match self.create(config) {
                    Ok(strategy) => strategy,
                    Err(err) => {
                        tracing::warn!(
                            protocol = %protocol.name,
                            strategy_type = %config.strategy_type,
                            error = %err,
                            "Failed to create remediation strategy"
                        );
                        continue;
                    }
                };

                match registry.register_arc(strategy) {
                    Ok(()) => registered += 1,
                    Err(err) => tracing::warn!(
                        strategy_type = %config.strategy_type,
                        error = %err,
                        "Failed to register remediation strategy"
                    ),
                }
            }
        }

        tracing::debug!(registered, "Registered configured remediation strategies");
        registered
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remediation::protocol::TriggerSpec;

    fn log_config(path: &str) -> StrategyConfig {
        StrategyConfig::new("log").with_setting("log_file", serde_json::json!(path))
    }

    #[test]
    fn test_create_log_strategy() {
        let factory = StrategyFactory::new();
        let strategy = factory.create(&log_config("/tmp/findings.log")).unwrap();
        assert_eq!(strategy.strategy_type(), "log");
        assert_eq!(factory.supported_types(), vec!["log".to_string()]);
    }

    #[test]
    fn test_create_unknown() {
        let factory = StrategyFactory::new();
        let err = factory.create(&StrategyConfig::new("pagerduty")).unwrap_err();
        assert_eq!(err, StrategyError::Unknown("pagerduty".into()));
    }

    #[test]
    fn test_register_configured_strategies() {
        let protocols = vec![
            Protocol::new("first", TriggerSpec::on_block())
                .with_strategy(log_config("/tmp/a.log"))
                .with_strategy(StrategyConfig::new("webhook")),
            Protocol::new("second", TriggerSpec::on_findings())
                .with_strategy(log_config("/tmp/b.log")),
        ];

        let registry = StrategyRegistry::new();
        let registered = StrategyFactory::new().register_configured_strategies(&registry, &protocols);

        assert_eq!(registered, 1);
        assert_eq!(registry.list(), vec!["log".to_string()]);
        assert!(!registry.contains("webhook"));
    }

    #[test]
    fn test_invalid_config_is_skipped() {
        let protocols = vec![Protocol::new("p", TriggerSpec::on_block())
            .with_strategy(StrategyConfig::new("log"))];

        let registry = StrategyRegistry::new();
        assert_eq!(
            StrategyFactory::new().register_configured_strategies(&registry, &protocols),
            0
        );
        assert!(registry.is_empty());
    }
}
