//! Check registry
//!
//! Maps check names to implementations and keeps registration order, which
//! is the order sequential runs report findings in.

use std::collections::HashMap;
use std::sync::Arc;

use super::{Check, checks};

/// Registered checks, by name
#[derive(Default, Clone)]
pub struct CheckRegistry {
    checks: Vec<Arc<dyn Check>>,
    index: HashMap<&'static str, usize>,
}

impl CheckRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every built-in check
    pub fn with_builtin_checks() -> Self {
        let mut registry = Self::new();
        for check in checks::builtin_checks() {
            registry.register(check);
        }
        registry
    }

    /// Register a check, replacing any check with the same name in place
    pub fn register(&mut self, check: Arc<dyn Check>) {
        let name = check.name();
        match self.index.get(name) {
            Some(&position) => self.checks[position] = check,
            None => {
                self.index.insert(name, self.checks.len());
                self.checks.push(check);
            }
        }
    }

    /// Get a check by name
    pub fn get(&self, name: &str) -> Option<Arc<dyn Check>> {
        self.index.get(name).map(|&i| Arc::clone(&self.checks[i]))
    }

    /// All checks, in registration order
    pub fn all(&self) -> &[Arc<dyn Check>] {
        &self.checks
    }

    /// Check names, in registration order
    pub fn names(&self) -> Vec<&'static str> {
        self.checks.iter().map(|c| c.name()).collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.checks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.checks.is_empty()
    }
}

impl std::fmt::Debug for CheckRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CheckRegistry")
            .field("checks", &self.names())
            .finish()
    }
}
