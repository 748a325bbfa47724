//! Module descriptors
//!
//! A descriptor records a module's identity and where, by site convention,
//! its source lives. It is built once per load request and never mutated.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::config::SiteConfig;
use crate::module::traits::ModuleError;

/// Module descriptor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleDescriptor {
    /// Module name (unique identifier)
    pub name: String,
    /// Conventional source location relative to the install root
    pub source_path: PathBuf,
    /// Loaded at startup, failure is fatal
    pub is_priority: bool,
}

impl ModuleDescriptor {
    /// Descriptor for a boot-time module: `<class_dir><req_dir><name>`
    pub fn priority(name: &str, config: &SiteConfig) -> Self {
        Self {
            name: name.to_string(),
            source_path: PathBuf::from(&config.class_dir)
                .join(&config.req_dir)
                .join(name),
            is_priority: true,
        }
    }

    /// Descriptor for an on-demand module: `<module_dir><name>/<name>`
    pub fn optional(name: &str, config: &SiteConfig) -> Self {
        Self {
            name: name.to_string(),
            source_path: PathBuf::from(&config.module_dir).join(name).join(name),
            is_priority: false,
        }
    }

    /// Path of the module's settings file, `<install_root>/<source_path>.toml`
    pub fn settings_path(&self, config: &SiteConfig) -> PathBuf {
        config
            .install_root
            .join(&self.source_path)
            .with_extension("toml")
    }
}

/// Check a module name before it is used as a lookup key or path segment
pub fn validate_module_name(name: &str) -> Result<(), ModuleError> {
    let valid = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if valid {
        Ok(())
    } else {
        Err(ModuleError::InvalidName(name.to_string()))
    }
}
