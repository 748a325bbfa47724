//! Module settings loader
//!
//! Reads a module's optional settings file and merges the site-level
//! overrides on top of it.

use std::collections::HashMap;
use std::path::Path;
use tracing::debug;

use crate::config::SiteConfig;
use crate::module::registry::ModuleDescriptor;
use crate::module::traits::ModuleError;

/// Loads the key/value settings handed to a module through its context
pub struct ModuleLoader;

impl ModuleLoader {
    /// Settings for `descriptor`: the settings file, then `module_configs` overrides
    pub fn load_settings(
        config: &SiteConfig,
        descriptor: &ModuleDescriptor,
    ) -> Result<HashMap<String, String>, ModuleError> {
        let mut settings =
            Self::load_module_config(&descriptor.name, descriptor.settings_path(config))?;
        if let Some(overrides) = config.module_settings(&descriptor.name) {
            settings.extend(overrides.iter().map(|(k, v)| (k.clone(), v.clone())));
        }
        Ok(settings)
    }

    /// Load module configuration from file
    ///
    /// A missing file yields empty settings. TOML is tried first, then a plain
    /// `key = value` line format.
    pub fn load_module_config<P: AsRef<Path>>(
        module_name: &str,
        config_path: P,
    ) -> Result<HashMap<String, String>, ModuleError> {
        let config_path = config_path.as_ref();
        if !config_path.exists() {
            debug!("No settings file for module {}, using defaults", module_name);
            return Ok(HashMap::new());
        }

        let contents =
            std::fs::read_to_string(config_path).map_err(|e| ModuleError::InvalidSettings {
                name: module_name.to_string(),
                reason: format!("failed to read {:?}: {}", config_path, e),
            })?;

        if let Ok(table) = toml::from_str::<toml::Table>(&contents) {
            let mut settings = HashMap::new();
            for (key, value) in &table {
                Self::flatten_toml_value(key.clone(), value, &mut settings);
            }
            return Ok(settings);
        }

        let mut settings = HashMap::new();
        for (number, line) in contents.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let (key, value) = line.split_once('=').ok_or_else(|| ModuleError::InvalidSettings {
                name: module_name.to_string(),
                reason: format!("line {} is not `key = value`", number + 1),
            })?;
            settings.insert(key.trim().to_string(), value.trim().to_string());
        }
        Ok(settings)
    }

    /// Flatten a TOML value into dot-notation string keys
    fn flatten_toml_value(prefix: String, value: &toml::Value, result: &mut HashMap<String, String>) {
        use toml::Value;

        match value {
            Value::String(s) => {
                result.insert(prefix, s.clone());
            }
            Value::Integer(i) => {
                result.insert(prefix, i.to_string());
            }
            Value::Float(f) => {
                result.insert(prefix, f.to_string());
            }
            Value::Boolean(b) => {
                result.insert(prefix, b.to_string());
            }
            Value::Array(arr) => {
                let values: Vec<String> = arr
                    .iter()
                    .map(|v| match v {
                        Value::String(s) => s.clone(),
                        _ => v.to_string(),
                    })
                    .collect();
                result.insert(prefix, values.join(","));
            }
            Value::Table(table) => {
                for (key, val) in table {
                    Self::flatten_toml_value(format!("{}.{}", prefix, key), val, result);
                }
            }
            Value::Datetime(dt) => {
                result.insert(prefix, dt.to_string());
            }
        }
    }
}
