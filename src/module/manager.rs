//! Module registry: boot-time and on-demand module loading
//!
//! Every load runs the same sequence: resolve the factory, build the bound
//! context, instantiate, check the instance shape, run the init hook, then
//! register into the shared context. Priority modules loaded by
//! [`ModuleRegistry::bootstrap`] are fail-fast; on-demand loads through
//! [`ModuleRegistry::load_module`] are fail-soft.

use std::sync::Arc;
use tracing::{debug, error, info, warn};

use crate::config::SiteConfig;
use crate::module::context::{Claim, ClaimGuard, LoadedModule, ModuleContext, SharedContext};
use crate::module::loader::ModuleLoader;
use crate::module::registry::{validate_module_name, ModuleDescriptor, ModuleResolver};
use crate::module::traits::{BootstrapError, ModuleError, ModuleState};
use crate::utils::result_to_option;

/// Loads modules into a shared context
#[derive(Debug, Clone)]
pub struct ModuleRegistry {
    shared: Arc<SharedContext>,
    /// Modules whose loads are waiting on this registry's loads
    lineage: Vec<String>,
}

impl ModuleRegistry {
    /// Create a registry with an empty shared context
    pub fn new(config: SiteConfig, resolver: ModuleResolver) -> Self {
        Self::from_shared(SharedContext::new(config, resolver))
    }

    /// Registry over an existing shared context
    pub fn from_shared(shared: Arc<SharedContext>) -> Self {
        Self {
            shared,
            lineage: Vec::new(),
        }
    }

    /// Registry used by a module handle; loads it starts belong to `lineage`
    pub(crate) fn nested(shared: Arc<SharedContext>, lineage: Vec<String>) -> Self {
        Self { shared, lineage }
    }

    /// The shared context modules are bound to
    pub fn context(&self) -> &Arc<SharedContext> {
        &self.shared
    }

    /// Site configuration
    pub fn config(&self) -> &SiteConfig {
        self.shared.config()
    }

    /// Load the configured priority modules
    pub async fn bootstrap_from_config(&self) -> Result<(), BootstrapError> {
        let names = self.shared.config().priority_modules.clone();
        self.bootstrap(&names).await
    }

    /// Load priority modules in order, stopping at the first failure
    ///
    /// A failure names the module and leaves every later module unloaded.
    pub async fn bootstrap<S: AsRef<str>>(&self, names: &[S]) -> Result<(), BootstrapError> {
        info!("Bootstrapping {} priority modules", names.len());

        for name in names {
            let name = name.as_ref();
            let descriptor = ModuleDescriptor::priority(name, self.shared.config());
            if let Err(source) = self.load(descriptor).await {
                error!("Required module '{}' failed to load: {}", name, source);
                return Err(BootstrapError {
                    module: name.to_string(),
                    source,
                });
            }
        }

        info!("Bootstrap complete: {:?}", self.shared.loaded_names());
        Ok(())
    }

    /// Load an optional module; failures are logged and reported as `false`
    ///
    /// A module that is already loaded is not loaded again.
    pub async fn load_module(&self, name: &str) -> bool {
        let loaded = self.try_load_module(name).await;
        result_to_option(loaded, &format!("Could not initiate module {}", name)).is_some()
    }

    /// Load an optional module, returning the error on failure
    pub async fn try_load_module(&self, name: &str) -> Result<Arc<LoadedModule>, ModuleError> {
        if let Some(existing) = self.shared.lookup(name) {
            debug!("Module {} already loaded", name);
            return Ok(existing);
        }

        let descriptor = ModuleDescriptor::optional(name, self.shared.config());
        match self.load(descriptor).await {
            // lost a race with another loader that finished first
            Err(ModuleError::AlreadyLoaded(_)) => self
                .shared
                .lookup(name)
                .ok_or_else(|| ModuleError::NotFound(name.to_string())),
            result => result,
        }
    }

    /// Find a loaded module by name
    pub fn lookup(&self, name: &str) -> Option<Arc<LoadedModule>> {
        self.shared.lookup(name)
    }

    /// Names of loaded modules, in load order
    pub fn loaded_names(&self) -> Vec<String> {
        self.shared.loaded_names()
    }

    /// Lifecycle state of `name`
    pub fn module_state(&self, name: &str) -> ModuleState {
        self.shared.module_state(name)
    }

    /// Whether `name` is loaded
    pub fn is_loaded(&self, name: &str) -> bool {
        self.shared.is_loaded(name)
    }

    async fn load(&self, descriptor: ModuleDescriptor) -> Result<Arc<LoadedModule>, ModuleError> {
        validate_module_name(&descriptor.name)?;
        let _waiting = self
            .lineage
            .last()
            .map(|parent| self.shared.wait_edge(parent, &descriptor.name));
        let claim = self.claim(&descriptor.name).await?;

        info!(
            "Loading module: {} ({})",
            descriptor.name,
            descriptor.source_path.display()
        );
        match self.instantiate(&descriptor).await {
            Ok((instance, context)) => {
                let module = claim.register(LoadedModule::new(descriptor, instance, context));
                info!("Module {} loaded successfully", module.name());
                Ok(module)
            }
            Err(e) => {
                claim.fail(&e);
                Err(e)
            }
        }
    }

    /// Claim `name`, waiting out a load of it running elsewhere
    ///
    /// A load that waits on this load chain can never finish first, so
    /// claiming its name fails instead of waiting.
    async fn claim(&self, name: &str) -> Result<ClaimGuard<'_>, ModuleError> {
        loop {
            let settled = self.shared.settled().notified();
            tokio::pin!(settled);
            // register before checking so a completion in between is not missed
            settled.as_mut().enable();

            match self.shared.claim(name, &self.lineage)? {
                Claim::Acquired(guard) => return Ok(guard),
                Claim::Busy => {
                    debug!("Waiting for in-flight load of module {}", name);
                    settled.await;
                }
            }
        }
    }

    async fn instantiate(
        &self,
        descriptor: &ModuleDescriptor,
    ) -> Result<(Box<dyn crate::module::Module>, ModuleContext), ModuleError> {
        let name = descriptor.name.as_str();
        let factory = self.shared.resolver().resolve(name)?;
        let settings = ModuleLoader::load_settings(self.shared.config(), descriptor)?;
        let context = ModuleContext::new(
            descriptor.clone(),
            settings,
            &self.shared,
            self.lineage.clone(),
        );

        let mut instance = factory(context.clone()).map_err(|e| match e {
            ModuleError::InstantiationFailed { .. } => e,
            other => ModuleError::InstantiationFailed {
                name: name.to_string(),
                reason: other.to_string(),
            },
        })?;

        if instance.name() != name {
            warn!(
                "Factory for {} produced a module named {}",
                name,
                instance.name()
            );
            return Err(ModuleError::InstantiationFailed {
                name: name.to_string(),
                reason: format!("factory produced module '{}'", instance.name()),
            });
        }

        instance.init().await.map_err(|e| match e {
            ModuleError::InitializationFailed { .. } => e,
            other => ModuleError::InitializationFailed {
                name: name.to_string(),
                reason: other.to_string(),
            },
        })?;

        Ok((instance, context))
    }
}
