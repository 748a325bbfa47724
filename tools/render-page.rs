//! Render one page from a JSON content file
//!
//! Boots the site described by the config file, loads any extra modules on
//! demand, renders the content and writes the page to stdout or a file.
//!
//! Usage:
//!   render-page --config hyperite.toml content.json [--template row.tpl] [--output page.html]

#[cfg(not(target_os = "windows"))]
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use anyhow::{Context, Result};
use clap::Parser;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

use hyperite::layout::LayoutModule;
use hyperite::utils::{env_or_default, init_logging_from_config};
use hyperite::{Page, Site, SiteConfig};

#[derive(Parser, Debug)]
#[command(name = "render-page", about = "Render a page through the site's templates")]
struct Args {
    /// Site config file (TOML, or JSON with a .json extension)
    #[arg(long, short)]
    config: Option<PathBuf>,

    /// JSON file with the page content
    content: PathBuf,

    /// Custom template; each content row fills one copy
    #[arg(long, short)]
    template: Option<String>,

    /// Template set overriding the default
    #[arg(long)]
    template_set: Option<String>,

    /// Page title
    #[arg(long, default_value = "")]
    title: String,

    /// Optional modules to load before rendering
    #[arg(long = "module", short = 'm')]
    modules: Vec<String>,

    /// Output file; stdout when omitted
    #[arg(long, short)]
    output: Option<PathBuf>,
}

/// Load the site config; only an implicit default path may be absent
fn load_config(path: &Path, explicit: bool) -> Result<SiteConfig> {
    if explicit && !path.exists() {
        anyhow::bail!("Config file {} does not exist", path.display());
    }
    let mut config = if path.exists() {
        SiteConfig::from_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?
    } else {
        SiteConfig::default()
    };
    config.apply_env_overrides();
    if !config.is_priority(LayoutModule::NAME) {
        config.priority_modules.push(LayoutModule::NAME.to_string());
    }
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config_path = args
        .config
        .clone()
        .unwrap_or_else(|| PathBuf::from(env_or_default("HYPERITE_CONFIG", "hyperite.toml")));

    let config = load_config(&config_path, args.config.is_some())?;
    init_logging_from_config(config.logging.as_ref());
    info!("Using config {}", config_path.display());

    let site = match Site::builder(config).boot().await {
        Ok(site) => site,
        Err(e) => {
            error!("Boot failed: {}", e);
            std::process::exit(1);
        }
    };

    for name in &args.modules {
        if !site.load_module(name).await {
            warn!("Continuing without module {}", name);
        }
    }

    let raw = std::fs::read_to_string(&args.content)
        .with_context(|| format!("Failed to read content {}", args.content.display()))?;
    let content: serde_json::Value = serde_json::from_str(&raw)
        .with_context(|| format!("Invalid JSON in {}", args.content.display()))?;

    let mut page = Page::new().title(args.title).content(content);
    if let Some(set) = args.template_set {
        page = page.template_set(set);
    }

    let rendered = site.render_page(page, args.template.as_deref())?;
    match args.output {
        Some(path) => {
            let file = std::fs::File::create(&path)
                .with_context(|| format!("Failed to create {}", path.display()))?;
            rendered.emit(file)?;
            info!("Wrote {}", path.display());
        }
        None => rendered.emit(std::io::stdout().lock())?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_named_config_must_exist() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("missing.toml");

        let err = load_config(&missing, true).unwrap_err();
        assert!(err.to_string().contains("does not exist"));

        let config = load_config(&missing, false).unwrap();
        assert!(config.is_priority(LayoutModule::NAME));
    }

    #[test]
    fn test_named_config_is_loaded() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("site.toml");
        std::fs::write(&path, "install_url = \"https://shop.test/\"\n").unwrap();

        let config = load_config(&path, true).unwrap();
        assert_eq!(config.install_url, "https://shop.test/");
        assert_eq!(config.priority_modules, vec![LayoutModule::NAME]);
    }
}
