//! Name-keyed framework lookup.

use super::{ArcFramework, ClaudeFramework, HookFramework};
use crate::core::error::{FrameworkError, FrameworkResult};

use std::collections::HashMap;
use std::sync::Arc;

/// The frameworks a process can speak, keyed by name.
#[derive(Debug, Default, Clone)]
pub struct FrameworkRegistry {
    frameworks: HashMap<String, ArcFramework>,
}

impl FrameworkRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry holding the built-in frameworks.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(ClaudeFramework::new());
        registry
    }

    /// Registers a framework under its own name, replacing any previous one.
    pub fn register<F: HookFramework + 'static>(&mut self, framework: F) {
        self.register_arc(Arc::new(framework));
    }

    /// Registers an arc-wrapped framework.
    pub fn register_arc(&mut self, framework: ArcFramework) {
        self.frameworks.insert(framework.name().to_string(), framework);
    }

    /// Looks up a framework by name.
    pub fn get(&self, name: &str) -> FrameworkResult<ArcFramework> {
        self.frameworks
            .get(name)
            .cloned()
            .ok_or_else(|| FrameworkError::UnknownFramework {
                name: name.to_string(),
                available: self.names(),
            })
    }

    /// Returns the registered names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.frameworks.keys().cloned().collect();
        names.sort();
        names
    }
}
