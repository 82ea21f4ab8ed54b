//! A name-keyed factory map for providers, so the pool and configuration
//! layer can construct providers from config without a giant match
//! statement scattered across the crate.

use std::collections::HashMap;

use super::traits::Provider;

type Factory = Box<dyn Fn() -> Box<dyn Provider> + Send + Sync>;

/// Maps provider names (as they appear in configuration) to constructors.
/// Providers register themselves once at startup; the pool then resolves
/// the configured provider name list against this map.
#[derive(Default)]
pub struct ProviderRegistry {
    factories: HashMap<String, Factory>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, name: impl Into<String>, factory: impl Fn() -> Box<dyn Provider> + Send + Sync + 'static) {
        self.factories.insert(name.into(), Box::new(factory));
    }

    pub fn create(&self, name: &str) -> Option<Box<dyn Provider>> {
        self.factories.get(name).map(|factory| factory())
    }

    pub fn names(&self) -> Vec<&str> {
        self.factories.keys().map(String::as_str).collect()
    }
}
