//! Template rendering errors

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while rendering a page
///
/// Any of these aborts the current render; no partial output is produced.
#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("Invalid content payload: expected {expected}, got {found}")]
    InvalidPayloadShape {
        expected: &'static str,
        found: &'static str,
    },

    #[error("Template file not found: {path:?}")]
    TemplateFileNotFound { path: PathBuf },

    #[error("Failed to read template {path:?}: {source}")]
    TemplateRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid template name {0:?}: must be a relative path without '..'")]
    InvalidTemplateName(String),
}
