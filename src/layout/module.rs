//! The `layout` module
//!
//! Registers the template engine as a priority module so that other modules
//! can reach it through the shared context and start pages from it.

use async_trait::async_trait;
use std::any::Any;
use std::sync::{Arc, PoisonError, RwLock};
use tracing::{info, warn};

use crate::layout::engine::{MenuProvider, NoMenu, RenderedPage, TemplateEngine};
use crate::layout::error::TemplateError;
use crate::layout::page::Page;
use crate::layout::template_set::validate_template_name;
use crate::module::{Module, ModuleContext, ModuleError};

/// Module wrapping the site's template engine
pub struct LayoutModule {
    context: ModuleContext,
    engine: TemplateEngine,
    menu: RwLock<Arc<dyn MenuProvider>>,
}

impl LayoutModule {
    /// Name the module registers under
    pub const NAME: &'static str = "layout";
    /// Module setting overriding the site's default template set
    pub const TEMPLATE_SET_KEY: &'static str = "template_set";

    /// Factory for the module resolver
    pub fn factory(context: ModuleContext) -> Result<Box<dyn Module>, ModuleError> {
        Ok(Box::new(Self::new(context)))
    }

    pub fn new(context: ModuleContext) -> Self {
        let config = context.site_config();
        let default_set =
            context.get_config_or(Self::TEMPLATE_SET_KEY, &config.default_template_set);
        let engine = TemplateEngine::from_config(config).with_default_set(default_set);
        Self {
            context,
            engine,
            menu: RwLock::new(Arc::new(NoMenu)),
        }
    }

    /// Handle this module was bound with
    pub fn context(&self) -> &ModuleContext {
        &self.context
    }

    /// Replace the menu provider used by later renders
    pub fn set_menu_provider(&self, menu: Arc<dyn MenuProvider>) {
        *self.menu.write().unwrap_or_else(PoisonError::into_inner) = menu;
    }

    /// Engine with the current menu provider installed
    pub fn engine(&self) -> TemplateEngine {
        let menu = Arc::clone(&self.menu.read().unwrap_or_else(PoisonError::into_inner));
        self.engine.clone().with_menu_provider(menu)
    }

    /// Start a new page
    pub fn new_page(&self) -> Page {
        Page::new()
    }

    /// Render `page`; see [`Page::show`]
    pub fn show(&self, page: Page, custom_template: Option<&str>) -> Result<RenderedPage, TemplateError> {
        page.show(&self.engine(), custom_template)
    }
}

#[async_trait]
impl Module for LayoutModule {
    fn name(&self) -> &str {
        Self::NAME
    }

    async fn init(&mut self) -> Result<(), ModuleError> {
        let default_set = self.engine.default_set().to_string();
        validate_template_name(&default_set).map_err(|e| ModuleError::InvalidSettings {
            name: Self::NAME.to_string(),
            reason: e.to_string(),
        })?;

        let set_dir = self.engine.template_root().join(&default_set);
        if !set_dir.is_dir() {
            warn!(
                "Default template set {} not found at {}",
                default_set,
                set_dir.display()
            );
        }
        info!("Layout ready with template set {}", default_set);
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
