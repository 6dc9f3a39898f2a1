//! Lookup table from strategy type to strategy instance.

use crate::core::error::{RegistryError, RegistryResult};
use crate::remediation::strategy::{ArcStrategy, RemediationStrategy};

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// Registered remediation strategies keyed by type.
///
/// Populated at startup and then read concurrently by engine workers.
/// Lookups hand out an `Arc` and release the lock before the strategy runs.
#[derive(Debug, Default)]
pub struct StrategyRegistry {
    strategies: RwLock<HashMap<String, ArcStrategy>>,
}

impl StrategyRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a strategy.
    pub fn register<S: RemediationStrategy + 'static>(&self, strategy: S) -> RegistryResult<()> {
        self.register_arc(Arc::new(strategy))
    }

    /// Registers a strategy wrapped in an Arc.
    ///
    /// # Errors
    ///
    /// - `EmptyType` - the strategy has an empty type identifier.
    /// - `Validation` - the strategy rejected its own configuration.
    /// - `AlreadyRegistered` - a strategy of this type exists; it is not replaced.
    pub fn register_arc(&self, strategy: ArcStrategy) -> RegistryResult<()> {
        let strategy_type = strategy.strategy_type().to_string();
        if strategy_type.is_empty() {
            return Err(RegistryError::EmptyType);
        }

        strategy
            .validate()
            .map_err(|reason| RegistryError::Validation {
                strategy_type: strategy_type.clone(),
                reason,
            })?;

        let mut strategies = self
            .strategies
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        if strategies.contains_key(&strategy_type) {
            return Err(RegistryError::AlreadyRegistered(strategy_type));
        }

        tracing::debug!(strategy_type = %strategy_type, "Registered remediation strategy");
        strategies.insert(strategy_type, strategy);
        Ok(())
    }

    /// Looks up a strategy by type.
    pub fn get(&self, strategy_type: &str) -> RegistryResult<ArcStrategy> {
        self.strategies
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(strategy_type)
            .cloned()
            .ok_or_else(|| RegistryError::NotFound(strategy_type.to_string()))
    }

    /// Returns `true` if a strategy of this type is registered.
    pub fn contains(&self, strategy_type: &str) -> bool {
        self.strategies
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .contains_key(strategy_type)
    }

    /// Returns the registered types, sorted.
    pub fn list(&self) -> Vec<String> {
        let mut types: Vec<String> = self
            .strategies
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .keys()
            .cloned()
            .collect();
        types.sort();
        types
    }

    /// Removes a strategy.
    pub fn unregister(&self, strategy_type: &str) -> RegistryResult<ArcStrategy> {
        self.strategies
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .remove(strategy_type)
            .ok_or_else(|| RegistryError::NotFound(strategy_type.to_string()))
    }

    /// Returns the number of registered strategies.
    pub fn len(&self) -> usize {
        self.strategies
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    /// Returns `true` if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remediation::strategy::{RemediationInput, RemediationResult};

    use async_trait::async_trait;
    use tokio_util::sync::CancellationToken;

    #[derive(Debug)]
    struct StubStrategy {
        kind: &'static str,
        valid: bool,
    }

    #[async_trait]
    impl RemediationStrategy for StubStrategy {
        fn strategy_type(&self) -> &str {
            self.kind
        }

        fn validate(&self) -> Result<(), String> {
            if self.valid {
                Ok(())
            } else {
                Err("missing target".into())
            }
        }

        async fn execute(
            &self,
            _cancel: &CancellationToken,
            _input: &RemediationInput,
        ) -> RemediationResult {
            RemediationResult::success(self.kind, "done")
        }
    }

    fn stub(kind: &'static str) -> StubStrategy {
        StubStrategy { kind, valid: true }
    }

    #[test]
    fn test_register_and_get() {
        let registry = StrategyRegistry::new();
        registry.register(stub("log")).unwrap();

        assert!(registry.contains("log"));
        assert_eq!(registry.get("log").unwrap().strategy_type(), "log");
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_get_missing() {
        let registry = StrategyRegistry::new();
        assert_eq!(
            registry.get("webhook").unwrap_err(),
            RegistryError::NotFound("webhook".into())
        );
    }

    #[test]
    fn test_rejects_empty_type() {
        let registry = StrategyRegistry::new();
        assert_eq!(registry.register(stub("")), Err(RegistryError::EmptyType));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_rejects_invalid_strategy() {
        let registry = StrategyRegistry::new();
        let err = registry
            .register(StubStrategy {
                kind: "log",
                valid: false,
            })
            .unwrap_err();

        assert!(matches!(err, RegistryError::Validation { ref strategy_type, .. } if strategy_type == "log"));
        assert!(!registry.contains("log"));
    }

    #[test]
    fn test_no_silent_overwrite() {
        let registry = StrategyRegistry::new();
        registry.register(stub("log")).unwrap();

        assert_eq!(
            registry.register(stub("log")),
            Err(RegistryError::AlreadyRegistered("log".into()))
        );
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_list_and_unregister() {
        let registry = StrategyRegistry::new();
        registry.register(stub("webhook")).unwrap();
        registry.register(stub("log")).unwrap();

        assert_eq!(registry.list(), vec!["log".to_string(), "webhook".to_string()]);

        registry.unregister("log").unwrap();
        assert!(!registry.contains("log"));
        assert!(registry.unregister("log").is_err());
    }

    #[test]
    fn test_concurrent_lookups() {
        let registry = Arc::new(StrategyRegistry::new());
        registry.register(stub("log")).unwrap();

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let registry = Arc::clone(&registry);
                std::thread::spawn(move || registry.get("log").is_ok())
            })
            .collect();

        for handle in handles {
            assert!(handle.join().unwrap());
        }
    }
}
