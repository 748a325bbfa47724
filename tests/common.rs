//! Shared fixtures for integration tests
#![allow(dead_code)]

use async_trait::async_trait;
use std::any::Any;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

use hyperite::module::{Module, ModuleContext, ModuleError, ModuleResolver};
use hyperite::SiteConfig;

/// Site install root with a template tree
pub struct SiteFixture {
    pub temp_dir: TempDir,
}

impl SiteFixture {
    pub fn new() -> Result<Self, Box<dyn std::error::Error>> {
        let temp_dir = TempDir::new()?;
        std::fs::create_dir_all(temp_dir.path().join("tpl/default"))?;
        Ok(Self { temp_dir })
    }

    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Write `tpl/<set>/<file>`
    pub fn template(&self, set: &str, file: &str, contents: &str) -> &Self {
        let dir = self.root().join("tpl").join(set);
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join(file), contents).unwrap();
        self
    }

    /// Write a module settings file at its optional-module location
    pub fn module_settings(&self, name: &str, contents: &str) -> &Self {
        let dir = self.root().join("module").join(name);
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join(format!("{}.toml", name)), contents).unwrap();
        self
    }

    pub fn config(&self) -> SiteConfig {
        SiteConfig::default().with_install_root(self.root())
    }
}

/// Shared log of module events, in the order they happened
#[derive(Clone, Default)]
pub struct EventLog(Arc<Mutex<Vec<String>>>);

impl EventLog {
    pub fn push(&self, event: impl Into<String>) {
        self.0.lock().unwrap().push(event.into());
    }

    pub fn events(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }
}

/// How a [`TestModule`] behaves
#[derive(Clone, Default)]
pub enum Behavior {
    #[default]
    Ok,
    /// Factory returns an error
    FailConstruct,
    /// `init` returns an error
    FailInit,
    /// Reports a different name than the one it was loaded under
    WrongName,
    /// Loads another module on demand from `init`
    LoadOnInit(String),
    /// Sleeps in `init` before finishing
    SlowInit(u64),
    /// Sleeps in `init`, then loads another module on demand
    SlowLoadOnInit(u64, String),
    /// Panics in `init`
    PanicInit,
}

/// Configurable module recording its lifecycle
pub struct TestModule {
    name: String,
    pub context: ModuleContext,
    behavior: Behavior,
    log: EventLog,
    /// Modules visible through the context when `init` ran
    pub seen_at_init: Vec<String>,
    /// Result of the on-demand load made from `init`
    pub nested_load: Option<bool>,
}

#[async_trait]
impl Module for TestModule {
    fn name(&self) -> &str {
        &self.name
    }

    async fn init(&mut self) -> Result<(), ModuleError> {
        self.seen_at_init = self
            .context
            .shared()
            .map(|shared| shared.loaded_names())
            .unwrap_or_default();
        match self.behavior.clone() {
            Behavior::FailInit => {
                self.log.push(format!("init-failed:{}", self.name));
                return Err(ModuleError::OperationError("init refused".to_string()));
            }
            Behavior::LoadOnInit(other) => {
                self.nested_load = Some(self.context.load_module(&other).await);
            }
            Behavior::SlowInit(ms) => {
                tokio::time::sleep(std::time::Duration::from_millis(ms)).await;
            }
            Behavior::SlowLoadOnInit(ms, other) => {
                tokio::time::sleep(std::time::Duration::from_millis(ms)).await;
                self.nested_load = Some(self.context.load_module(&other).await);
            }
            Behavior::PanicInit => panic!("{} panicked during init", self.name),
            _ => {}
        }
        self.log.push(format!("init:{}", self.name));
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Register a [`TestModule`] named `name` with `behavior`
///
/// `built` counts factory calls across all modules sharing it.
pub fn register_test_module(
    resolver: &mut ModuleResolver,
    name: &str,
    behavior: Behavior,
    log: &EventLog,
    built: &Arc<AtomicUsize>,
) {
    let log = log.clone();
    let built = Arc::clone(built);
    resolver
        .register(name, move |context: ModuleContext| {
            built.fetch_add(1, Ordering::SeqCst);
            let name = context.module_name().to_string();
            log.push(format!("construct:{}", name));
            let name = match &behavior {
                Behavior::FailConstruct => {
                    return Err(ModuleError::OperationError("constructor refused".to_string()))
                }
                Behavior::WrongName => format!("{}-impostor", name),
                _ => name,
            };
            Ok(Box::new(TestModule {
                name,
                context,
                behavior: behavior.clone(),
                log: log.clone(),
                seen_at_init: Vec::new(),
                nested_load: None,
            }) as Box<dyn Module>)
        })
        .unwrap();
}

/// Resolver with one well-behaved [`TestModule`] per name
pub fn resolver_with(names: &[&str], log: &EventLog, built: &Arc<AtomicUsize>) -> ModuleResolver {
    let mut resolver = ModuleResolver::new();
    for name in names {
        register_test_module(&mut resolver, name, Behavior::Ok, log, built);
    }
    resolver
}
