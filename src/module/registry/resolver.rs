//! Module resolver
//!
//! Maps module names to factory functions. The map is filled in code at
//! startup; nothing is resolved from strings on disk.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

use crate::module::context::ModuleContext;
use crate::module::registry::descriptor::validate_module_name;
use crate::module::traits::{Module, ModuleError, ModuleFactory};

/// Name -> factory map
#[derive(Clone, Default)]
pub struct ModuleResolver {
    factories: HashMap<String, ModuleFactory>,
}

impl ModuleResolver {
    /// Create an empty resolver
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a factory under `name`, replacing any previous one
    pub fn register<F>(&mut self, name: &str, factory: F) -> Result<(), ModuleError>
    where
        F: Fn(ModuleContext) -> Result<Box<dyn Module>, ModuleError> + Send + Sync + 'static,
    {
        validate_module_name(name)?;
        debug!("Registering module factory: {}", name);
        self.factories.insert(name.to_string(), Arc::new(factory));
        Ok(())
    }

    /// Builder-style registration
    pub fn with_module<F>(mut self, name: &str, factory: F) -> Result<Self, ModuleError>
    where
        F: Fn(ModuleContext) -> Result<Box<dyn Module>, ModuleError> + Send + Sync + 'static,
    {
        self.register(name, factory)?;
        Ok(self)
    }

    /// Find the factory for `name`
    pub fn resolve(&self, name: &str) -> Result<ModuleFactory, ModuleError> {
        validate_module_name(name)?;
        self.factories
            .get(name)
            .cloned()
            .ok_or_else(|| ModuleError::NotFound(name.to_string()))
    }

    /// Whether a factory exists for `name`
    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// Registered names, sorted
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.factories.keys().cloned().collect();
        names.sort();
        names
    }
}

impl fmt::Debug for ModuleResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModuleResolver")
            .field("modules", &self.names())
            .finish()
    }
}
