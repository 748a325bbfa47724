//! Configuration management for the site runtime
//!
//! Handles configuration loading (TOML or JSON), environment overrides and
//! validation. The runtime only ever reads the configuration.

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

use crate::module::registry::validate_module_name;
use crate::utils::{ensure, ensure_fmt, ensure_not_empty, env_opt};

/// Environment variable overriding `install_root`
pub const ENV_INSTALL_ROOT: &str = "HYPERITE_INSTALL_ROOT";
/// Environment variable overriding `install_url`
pub const ENV_INSTALL_URL: &str = "HYPERITE_INSTALL_URL";
/// Environment variable overriding `priority_modules` (comma separated)
pub const ENV_PRIORITY_MODULES: &str = "HYPERITE_PRIORITY_MODULES";

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse TOML config: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Failed to parse JSON config: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Logging configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log filter (e.g. "info", "hyperite::module=debug"); RUST_LOG wins when set
    #[serde(default)]
    pub filter: Option<String>,

    /// Emit JSON lines instead of human-readable output
    #[serde(default)]
    pub json_format: bool,
}

/// Site configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    /// Install root on disk; template and module directories are relative to it
    #[serde(default = "default_install_root")]
    pub install_root: PathBuf,

    /// Public URL of the install root, substituted for `{http_url}`.
    /// Must end with a trailing slash.
    #[serde(default = "default_install_url")]
    pub install_url: String,

    /// Template root directory (relative to `install_root`)
    #[serde(default = "default_template_dir")]
    pub template_dir: String,

    /// Class directory (relative to `install_root`)
    #[serde(default = "default_class_dir")]
    pub class_dir: String,

    /// Optional module directory (relative to `install_root`)
    #[serde(default = "default_module_dir")]
    pub module_dir: String,

    /// Priority module directory (relative to `class_dir`)
    #[serde(default = "default_req_dir")]
    pub req_dir: String,

    /// Modules loaded at startup, in order. Accepts a list or a comma separated string.
    #[serde(default, deserialize_with = "deserialize_module_list")]
    pub priority_modules: Vec<String>,

    /// Template set used when a page does not ask for one
    #[serde(default = "default_template_set")]
    pub default_template_set: String,

    /// Per-module settings overrides (module name -> key/value)
    #[serde(default)]
    pub module_configs: HashMap<String, HashMap<String, String>>,

    /// Logging configuration
    #[serde(default)]
    pub logging: Option<LoggingConfig>,
}

fn default_install_root() -> PathBuf {
    PathBuf::from("/")
}

fn default_install_url() -> String {
    "http://www.mywebsite.com/".to_string()
}

fn default_template_dir() -> String {
    "tpl/".to_string()
}

fn default_class_dir() -> String {
    "class/".to_string()
}

fn default_module_dir() -> String {
    "module/".to_string()
}

fn default_req_dir() -> String {
    "req/".to_string()
}

fn default_template_set() -> String {
    "default".to_string()
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ModuleList {
    Csv(String),
    List(Vec<String>),
}

fn deserialize_module_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match ModuleList::deserialize(deserializer)? {
        ModuleList::Csv(s) => parse_module_list(&s),
        ModuleList::List(names) => names
            .iter()
            .map(|n| n.trim())
            .filter(|n| !n.is_empty())
            .map(str::to_string)
            .collect(),
    })
}

/// Split a comma separated module list, dropping blank entries
pub fn parse_module_list(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            install_root: default_install_root(),
            install_url: default_install_url(),
            template_dir: default_template_dir(),
            class_dir: default_class_dir(),
            module_dir: default_module_dir(),
            req_dir: default_req_dir(),
            priority_modules: Vec::new(),
            default_template_set: default_template_set(),
            module_configs: HashMap::new(),
            logging: None,
        }
    }
}

impl SiteConfig {
    /// Load configuration from a TOML file
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = read_config(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration from a JSON file
    pub fn from_json_file(path: &Path) -> Result<Self, ConfigError> {
        let content = read_config(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Load configuration, picking the format from the file extension (TOML unless `.json`)
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json_file(path),
            _ => Self::from_toml_file(path),
        }
    }

    /// Apply `HYPERITE_*` environment overrides
    pub fn apply_env_overrides(&mut self) {
        if let Some(root) = env_opt(ENV_INSTALL_ROOT) {
            debug!("install_root overridden from environment");
            self.install_root = PathBuf::from(root);
        }
        if let Some(url) = env_opt(ENV_INSTALL_URL) {
            debug!("install_url overridden from environment");
            self.install_url = url;
        }
        if let Some(list) = env_opt(ENV_PRIORITY_MODULES) {
            debug!("priority_modules overridden from environment");
            self.priority_modules = parse_module_list(&list);
        }
    }

    /// Builder-style helper to set the priority module list
    pub fn with_priority_modules<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.priority_modules = names.into_iter().map(Into::into).collect();
        self
    }

    /// Builder-style helper to set the install root
    pub fn with_install_root<P: Into<PathBuf>>(mut self, root: P) -> Self {
        self.install_root = root.into();
        self
    }

    /// Directory holding all template sets
    pub fn template_root(&self) -> PathBuf {
        self.install_root.join(&self.template_dir)
    }

    /// Settings overrides for one module
    pub fn module_settings(&self, name: &str) -> Option<&HashMap<String, String>> {
        self.module_configs.get(name)
    }

    /// Whether `name` is one of the configured priority modules
    pub fn is_priority(&self, name: &str) -> bool {
        self.priority_modules.iter().any(|m| m == name)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.check().map_err(ConfigError::Invalid)
    }

    fn check(&self) -> Result<(), String> {
        ensure_not_empty(&self.install_url, "install_url")?;
        ensure_fmt(self.install_url.ends_with('/'), || {
            format!("install_url {:?} must end with '/'", self.install_url)
        })?;
        ensure_not_empty(&self.template_dir, "template_dir")?;
        ensure(
            Path::new(&self.template_dir).is_relative(),
            "template_dir must be relative to install_root",
        )?;
        ensure_not_empty(&self.default_template_set, "default_template_set")?;

        for name in &self.priority_modules {
            validate_module_name(name).map_err(|e| e.to_string())?;
        }
        for (i, name) in self.priority_modules.iter().enumerate() {
            ensure_fmt(!self.priority_modules[..i].contains(name), || {
                format!("priority module {} is listed more than once", name)
            })?;
        }
        Ok(())
    }
}

fn read_config(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })
}
