//! Site composition root
//!
//! A [`Site`] owns the module registry. Booting runs the startup hook once,
//! then loads the priority modules in order; any failure aborts the boot.

use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info};

use crate::config::{ConfigError, SiteConfig};
use crate::layout::{LayoutModule, Page, RenderedPage, TemplateError};
use crate::module::{BootstrapError, ModuleError, ModuleRegistry, ModuleResolver};

/// Hook run once before any module loads
pub type StartupHook =
    Box<dyn FnOnce(&SiteConfig) -> Result<(), Box<dyn std::error::Error + Send + Sync>> + Send>;

/// Errors raised while booting or serving a site
#[derive(Debug, Error)]
pub enum SiteError {
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("Startup hook failed: {0}")]
    Startup(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error(transparent)]
    Bootstrap(#[from] BootstrapError),

    #[error("Layout module is not loaded")]
    LayoutUnavailable,

    #[error(transparent)]
    Template(#[from] TemplateError),
}

/// Resolver with the modules shipped in this crate
pub fn default_resolver() -> ModuleResolver {
    let mut resolver = ModuleResolver::new();
    resolver
        .register(LayoutModule::NAME, LayoutModule::factory)
        .expect("built-in module name is valid");
    resolver
}

/// Builder for [`Site`]
pub struct SiteBuilder {
    config: SiteConfig,
    resolver: ModuleResolver,
    startup: Option<StartupHook>,
}

impl SiteBuilder {
    /// Replace the module resolver
    pub fn resolver(mut self, resolver: ModuleResolver) -> Self {
        self.resolver = resolver;
        self
    }

    /// Register an extra module factory
    pub fn module<F>(mut self, name: &str, factory: F) -> Result<Self, ModuleError>
    where
        F: Fn(crate::module::ModuleContext) -> Result<Box<dyn crate::module::Module>, ModuleError>
            + Send
            + Sync
            + 'static,
    {
        self.resolver.register(name, factory)?;
        Ok(self)
    }

    /// Run `hook` once before the priority modules load
    pub fn on_startup<F, E>(mut self, hook: F) -> Self
    where
        F: FnOnce(&SiteConfig) -> Result<(), E> + Send + 'static,
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        self.startup = Some(Box::new(move |config: &SiteConfig| {
            hook(config).map_err(Into::into)
        }));
        self
    }

    /// Validate the config, run the startup hook and load the priority modules
    pub async fn boot(self) -> Result<Site, SiteError> {
        self.config.validate()?;

        if let Some(hook) = self.startup {
            hook(&self.config).map_err(|e| {
                error!("Startup hook failed: {}", e);
                SiteError::Startup(e)
            })?;
        }

        let registry = ModuleRegistry::new(self.config, self.resolver);
        registry.bootstrap_from_config().await?;
        info!("Site booted with modules {:?}", registry.loaded_names());
        Ok(Site { registry })
    }
}

impl fmt::Debug for SiteBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SiteBuilder")
            .field("config", &self.config)
            .field("resolver", &self.resolver)
            .field("startup", &self.startup.is_some())
            .finish()
    }
}

/// A booted site
#[derive(Debug, Clone)]
pub struct Site {
    registry: ModuleRegistry,
}

impl Site {
    /// Start building a site with the default resolver
    pub fn builder(config: SiteConfig) -> SiteBuilder {
        SiteBuilder {
            config,
            resolver: default_resolver(),
            startup: None,
        }
    }

    /// Module registry
    pub fn registry(&self) -> &ModuleRegistry {
        &self.registry
    }

    /// Site configuration
    pub fn config(&self) -> &SiteConfig {
        self.registry.config()
    }

    /// Load an optional module; see [`ModuleRegistry::load_module`]
    pub async fn load_module(&self, name: &str) -> bool {
        self.registry.load_module(name).await
    }

    /// Render `page` through the loaded layout module
    pub fn render_page(
        &self,
        page: Page,
        custom_template: Option<&str>,
    ) -> Result<RenderedPage, SiteError> {
        let layout = self
            .registry
            .lookup(LayoutModule::NAME)
            .ok_or(SiteError::LayoutUnavailable)?;
        let layout = layout
            .downcast_ref::<LayoutModule>()
            .ok_or(SiteError::LayoutUnavailable)?;
        Ok(layout.show(page, custom_template)?)
    }

    /// Shared handle to the layout module, if loaded
    pub fn layout(&self) -> Option<Arc<crate::module::LoadedModule>> {
        self.registry.lookup(LayoutModule::NAME)
    }
}
