//! Named strategy factories
//!
//! Built once at startup and passed by reference to whatever needs to turn
//! a configured name into a strategy instance.

use std::collections::BTreeMap;

use snakebid_core::{ConfigError, ConfigResult};

use crate::basic::{Aggressive, Greedy, Passive, RandomVoter};
use crate::expected_value::ExpectedValue;
use crate::strategy::Strategy;

pub type StrategyFactory = Box<dyn Fn() -> Box<dyn Strategy> + Send + Sync>;

/// Name -> factory table
pub struct StrategyRegistry {
    factories: BTreeMap<String, StrategyFactory>,
}

impl StrategyRegistry {
    /// Registry with no strategies
    pub fn empty() -> Self {
        Self {
            factories: BTreeMap::new(),
        }
    }

    /// Registry holding every built-in policy
    pub fn with_builtins() -> Self {
        let mut registry = Self::empty();
        registry.register("expected_value", || Box::new(ExpectedValue::default()));
        registry.register("greedy", || Box::new(Greedy::default()));
        registry.register("aggressive", || Box::new(Aggressive::default()));
        registry.register("random", || Box::new(RandomVoter));
        registry.register("passive", || Box::new(Passive));
        registry
    }

    /// Add or replace a named factory
    pub fn register<F>(&mut self, name: &str, factory: F)
    where
        F: Fn() -> Box<dyn Strategy> + Send + Sync + 'static,
    {
        self.factories.insert(name.to_string(), Box::new(factory));
    }

    /// Fresh strategy instance for `name`
    pub fn create(&self, name: &str) -> ConfigResult<Box<dyn Strategy>> {
        self.factories
            .get(name)
            .map(|factory| factory())
            .ok_or_else(|| ConfigError::UnknownStrategy(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// Registered names, sorted
    pub fn names(&self) -> Vec<&str> {
        self.factories.keys().map(String::as_str).collect()
    }
}

impl Default for StrategyRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expected_value::EvParams;

    #[test]
    fn test_builtins_registered() {
        let registry = StrategyRegistry::with_builtins();
        assert_eq!(
            registry.names(),
            vec!["aggressive", "expected_value", "greedy", "passive", "random"]
        );
        for name in registry.names() {
            assert_eq!(registry.create(name).unwrap().name(), name);
        }
    }

    #[test]
    fn test_unknown_strategy_is_error() {
        let registry = StrategyRegistry::with_builtins();
        match registry.create("martingale") {
            Err(ConfigError::UnknownStrategy(name)) => assert_eq!(name, "martingale"),
            _ => panic!("expected UnknownStrategy"),
        }
    }

    #[test]
    fn test_register_custom_params() {
        let mut registry = StrategyRegistry::empty();
        let params = EvParams {
            viable_fraction: 0.1,
            ..EvParams::default()
        };
        registry.register("ev_narrow", move || Box::new(ExpectedValue::new(params.clone())));
        assert!(registry.contains("ev_narrow"));
        assert!(!registry.contains("greedy"));
        assert!(registry.create("ev_narrow").is_ok());
    }
}
