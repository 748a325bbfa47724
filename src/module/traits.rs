//! Module system traits and interfaces
//!
//! Defines the contract every module implements and the errors the module
//! system reports.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::any::Any;
use thiserror::Error;

use crate::module::context::ModuleContext;

/// Module lifecycle state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModuleState {
    /// Never requested, or not known to the registry
    Unloaded,
    /// Factory resolved, instance being built or initialized
    Resolving,
    /// Registered in the shared context
    Loaded,
    /// Last load attempt failed
    Failed(String),
}

/// Module trait that all modules must implement
///
/// Instances are produced by a [`ModuleFactory`] which receives the module's
/// [`ModuleContext`]; a module keeps that handle to reach sibling modules.
#[async_trait]
pub trait Module: Any + Send + Sync {
    /// Declared module name; must match the name it was registered under
    fn name(&self) -> &str;

    /// Initialization hook
    ///
    /// Called exactly once, after the context is bound and before the module
    /// becomes visible to other modules. The default does nothing.
    async fn init(&mut self) -> Result<(), ModuleError> {
        Ok(())
    }

    /// Upcast used for typed lookups
    fn as_any(&self) -> &dyn Any;
}

/// Factory building a module instance from its bound context
pub type ModuleFactory =
    std::sync::Arc<dyn Fn(ModuleContext) -> Result<Box<dyn Module>, ModuleError> + Send + Sync>;

/// Module system errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModuleError {
    #[error("Module not found: {0}")]
    NotFound(String),

    #[error("Invalid module name {0:?}: must be non-empty ASCII alphanumerics, '-' or '_'")]
    InvalidName(String),

    #[error("Module {name} could not be instantiated: {reason}")]
    InstantiationFailed { name: String, reason: String },

    #[error("Module {name} failed to initialize: {reason}")]
    InitializationFailed { name: String, reason: String },

    #[error("Invalid settings for module {name}: {reason}")]
    InvalidSettings { name: String, reason: String },

    #[error("Module {0} is already loaded")]
    AlreadyLoaded(String),

    #[error("Module {0} is already being loaded")]
    LoadInProgress(String),

    #[error("Module operation failed: {0}")]
    OperationError(String),

    #[error("Shared context is no longer available")]
    ContextUnavailable,
}

impl From<anyhow::Error> for ModuleError {
    fn from(e: anyhow::Error) -> Self {
        ModuleError::OperationError(e.to_string())
    }
}

/// Error returned when a priority module cannot be loaded during bootstrap
#[derive(Debug, Error)]
#[error("Required module '{module}' failed to load: {source}")]
pub struct BootstrapError {
    /// Name of the failing priority module
    pub module: String,
    #[source]
    pub source: ModuleError,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_anyhow_errors_convert() {
        let err: ModuleError = anyhow::anyhow!("database offline").into();
        assert_eq!(err, ModuleError::OperationError("database offline".to_string()));
    }

    #[test]
    fn test_bootstrap_error_names_module() {
        let err = BootstrapError {
            module: "auth".to_string(),
            source: ModuleError::NotFound("auth".to_string()),
        };
        assert_eq!(
            err.to_string(),
            "Required module 'auth' failed to load: Module not found: auth"
        );
        assert!(std::error::Error::source(&err).is_some());
    }
}
