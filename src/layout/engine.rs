//! Template engine
//!
//! Renders a validated [`ContentPayload`] into the `main.tpl` skeleton of a
//! template set. Rendering only reads template files; it holds no mutable
//! state, so one engine can serve concurrent requests.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

use crate::config::SiteConfig;
use crate::layout::error::TemplateError;
use crate::layout::payload::{ContentPayload, FieldMap, Section};
use crate::layout::substitute::substitute;
use crate::layout::template_set::{TemplateSet, MAIN_TEMPLATE, SECTION_TEMPLATE};

/// Supplies the `{menu}` value
pub trait MenuProvider: Send + Sync {
    /// Menu markup for a page rendered with `template_set`
    fn menu(&self, template_set: &TemplateSet) -> String;
}

/// Provider rendering no menu
#[derive(Debug, Clone, Copy, Default)]
pub struct NoMenu;

impl MenuProvider for NoMenu {
    fn menu(&self, _template_set: &TemplateSet) -> String {
        String::new()
    }
}

impl<F> MenuProvider for F
where
    F: Fn(&TemplateSet) -> String + Send + Sync,
{
    fn menu(&self, template_set: &TemplateSet) -> String {
        self(template_set)
    }
}

/// Page-level values substituted into `main.tpl`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageChrome {
    pub title: String,
    pub head: String,
    pub greeting: String,
    pub header: String,
    pub footer: String,
}

/// Final page output
///
/// Producing it is the last step of a request: the caller writes it out and
/// does no further work for that request.
#[must_use = "a rendered page must be emitted"]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedPage {
    template_set: String,
    body: String,
}

impl RenderedPage {
    /// Template set the page was rendered with
    pub fn template_set(&self) -> &str {
        &self.template_set
    }

    /// Page text
    pub fn as_str(&self) -> &str {
        &self.body
    }

    /// Take the page text
    pub fn into_string(self) -> String {
        self.body
    }

    /// Write the page and flush
    pub fn emit<W: std::io::Write>(self, mut out: W) -> std::io::Result<()> {
        out.write_all(self.body.as_bytes())?;
        out.flush()
    }
}

impl fmt::Display for RenderedPage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.body)
    }
}

/// Renders pages from a template root
#[derive(Clone)]
pub struct TemplateEngine {
    template_root: PathBuf,
    install_url: String,
    default_set: String,
    menu: Arc<dyn MenuProvider>,
}

impl TemplateEngine {
    /// Engine reading template sets from `template_root`
    pub fn new(template_root: impl Into<PathBuf>, install_url: impl Into<String>) -> Self {
        Self {
            template_root: template_root.into(),
            install_url: install_url.into(),
            default_set: crate::layout::template_set::DEFAULT_TEMPLATE_SET.to_string(),
            menu: Arc::new(NoMenu),
        }
    }

    /// Engine configured from the site config
    pub fn from_config(config: &SiteConfig) -> Self {
        Self::new(config.template_root(), config.install_url.clone())
            .with_default_set(config.default_template_set.clone())
    }

    /// Set used when a render does not name one
    pub fn with_default_set(mut self, name: impl Into<String>) -> Self {
        self.default_set = name.into();
        self
    }

    /// Install a menu provider
    pub fn with_menu(mut self, menu: impl MenuProvider + 'static) -> Self {
        self.menu = Arc::new(menu);
        self
    }

    /// Install a shared menu provider
    pub fn with_menu_provider(mut self, menu: Arc<dyn MenuProvider>) -> Self {
        self.menu = menu;
        self
    }

    /// Template root directory
    pub fn template_root(&self) -> &Path {
        &self.template_root
    }

    /// Default template set name
    pub fn default_set(&self) -> &str {
        &self.default_set
    }

    /// Resolve `override_name`, or the default set
    pub fn template_set(&self, override_name: Option<&str>) -> Result<TemplateSet, TemplateError> {
        TemplateSet::resolve(
            &self.template_root,
            override_name.unwrap_or(&self.default_set),
        )
    }

    /// Render `payload` into a full page
    pub fn render(
        &self,
        payload: &ContentPayload,
        chrome: &PageChrome,
        template_set: Option<&str>,
    ) -> Result<RenderedPage, TemplateError> {
        let set = self.template_set(template_set)?;
        debug!("Rendering page with template set {}", set.name());

        let main_content = match payload {
            ContentPayload::Sections(sections) => render_sections(&set, sections)?,
            ContentPayload::Custom { template, rows } => render_rows(&set, template, rows)?,
        };

        let skeleton = set.load(MAIN_TEMPLATE)?;
        let menu = self.menu.menu(&set);
        let body = substitute(&skeleton, |token| match token {
            "http_url" => Some(self.install_url.as_str()),
            "head" => Some(chrome.head.as_str()),
            "title" => Some(chrome.title.as_str()),
            "greeting" => Some(chrome.greeting.as_str()),
            "main" => Some(main_content.as_str()),
            "footer" => Some(chrome.footer.as_str()),
            "header" => Some(chrome.header.as_str()),
            "menu" => Some(menu.as_str()),
            _ => None,
        });

        Ok(RenderedPage {
            template_set: set.name().to_string(),
            body,
        })
    }
}

impl fmt::Debug for TemplateEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TemplateEngine")
            .field("template_root", &self.template_root)
            .field("install_url", &self.install_url)
            .field("default_set", &self.default_set)
            .finish_non_exhaustive()
    }
}

/// One `section.tpl` block per section, in order
fn render_sections(set: &TemplateSet, sections: &[Section]) -> Result<String, TemplateError> {
    let section = set.load(SECTION_TEMPLATE)?;
    let mut buffer = String::new();
    for s in sections {
        buffer.push_str(&substitute(&section, |token| match token {
            "title" => Some(s.title.as_str()),
            "content" => Some(s.body.as_str()),
            _ => None,
        }));
    }
    Ok(buffer)
}

/// One copy of the custom template per row, in order
fn render_rows(set: &TemplateSet, template: &str, rows: &[FieldMap]) -> Result<String, TemplateError> {
    let raw = set.load(template)?;
    let mut buffer = String::new();
    for row in rows {
        buffer.push_str(&substitute(&raw, |token| row.get(token).map(String::as_str)));
    }
    Ok(buffer)
}
