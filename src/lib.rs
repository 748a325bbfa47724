//! Hyperite - module runtime and layout engine for server-rendered sites
//!
//! A site is a set of named modules bound to one shared context, plus a
//! template engine that turns per-request page content into HTML.
//!
//! ## Architecture
//!
//! 1. **Config**: `SiteConfig` loaded from TOML/JSON with `HYPERITE_*` overrides
//! 2. **Modules**: priority modules load at boot in order (fail-fast); optional
//!    modules load on demand (fail-soft)
//! 3. **Layout**: the `layout` module renders pages through `{token}` templates
//! 4. **Site**: composition root that runs the startup hook and the bootstrap
//!
//! ## Example
//!
//! ```rust,no_run
//! use hyperite::{Page, Site, SiteConfig};
//!
//! # async fn run() -> Result<(), hyperite::SiteError> {
//! let config = SiteConfig::default().with_priority_modules(["layout"]);
//! let site = Site::builder(config).boot().await?;
//!
//! let mut page = Page::new().title("Home");
//! page.push_section("Welcome", "Hello");
//! let html = site.render_page(page, None)?;
//! println!("{}", html);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod layout;
pub mod module;
pub mod site;
pub mod utils;

pub use config::{ConfigError, LoggingConfig, SiteConfig};
pub use layout::{
    ContentPayload, LayoutModule, MenuProvider, Page, RenderedPage, TemplateEngine, TemplateError,
};
pub use module::{
    BootstrapError, LoadedModule, Module, ModuleContext, ModuleError, ModuleRegistry,
    ModuleResolver, ModuleState, SharedContext,
};
pub use site::{default_resolver, Site, SiteBuilder, SiteError};
