//! Template sets
//!
//! A template set is a directory of `.tpl` files under the template root.
//! Pages pick a set by name; `default` is used when none is given.

use std::path::{Component, Path, PathBuf};
use tracing::debug;

use crate::layout::error::TemplateError;

/// Name of the fallback template set
pub const DEFAULT_TEMPLATE_SET: &str = "default";
/// Page skeleton template
pub const MAIN_TEMPLATE: &str = "main.tpl";
/// Default per-section template
pub const SECTION_TEMPLATE: &str = "section.tpl";

/// A resolved template set directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateSet {
    name: String,
    prefix: String,
    dir: PathBuf,
}

impl TemplateSet {
    /// Resolve `name` under `template_root`
    pub fn resolve(template_root: &Path, name: &str) -> Result<Self, TemplateError> {
        validate_template_name(name)?;
        let prefix = format!("{}/", name);
        Ok(Self {
            name: name.to_string(),
            dir: template_root.join(&prefix),
            prefix,
        })
    }

    /// Set name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Set name with its trailing separator, e.g. `default/`
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Directory holding the set's files
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of `file` inside this set
    pub fn path_of(&self, file: &str) -> Result<PathBuf, TemplateError> {
        validate_template_name(file)?;
        Ok(self.dir.join(file))
    }

    /// Read a whole template file
    pub fn load(&self, file: &str) -> Result<String, TemplateError> {
        let path = self.path_of(file)?;
        debug!("Loading template {}{}", self.prefix, file);
        std::fs::read_to_string(&path).map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                TemplateError::TemplateFileNotFound { path }
            } else {
                TemplateError::TemplateRead { path, source }
            }
        })
    }
}

/// Template set and file names must stay inside the template root
pub fn validate_template_name(name: &str) -> Result<(), TemplateError> {
    let path = Path::new(name);
    let inside = !name.is_empty()
        && path
            .components()
            .all(|c| matches!(c, Component::Normal(_)));
    if inside {
        Ok(())
    } else {
        Err(TemplateError::InvalidTemplateName(name.to_string()))
    }
}
