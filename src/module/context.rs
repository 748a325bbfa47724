//! Shared context and per-module handles
//!
//! [`SharedContext`] is the single composition root: it owns the table of
//! loaded modules and the resolver. Each module receives a [`ModuleContext`],
//! a handle holding a weak reference back to the shared context so that
//! modules can find siblings and request on-demand loads.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard, Weak};
use tokio::sync::Notify;

use crate::config::SiteConfig;
use crate::module::manager::ModuleRegistry;
use crate::module::registry::{ModuleDescriptor, ModuleResolver};
use crate::module::traits::{Module, ModuleError, ModuleState};

/// A module that loaded successfully
pub struct LoadedModule {
    descriptor: ModuleDescriptor,
    instance: Box<dyn Module>,
    context: ModuleContext,
}

impl LoadedModule {
    pub(crate) fn new(
        descriptor: ModuleDescriptor,
        instance: Box<dyn Module>,
        context: ModuleContext,
    ) -> Self {
        Self {
            descriptor,
            instance,
            context,
        }
    }

    /// Module name
    pub fn name(&self) -> &str {
        &self.descriptor.name
    }

    /// Descriptor the module was loaded from
    pub fn descriptor(&self) -> &ModuleDescriptor {
        &self.descriptor
    }

    /// The module instance
    pub fn instance(&self) -> &dyn Module {
        self.instance.as_ref()
    }

    /// Context handle bound into the module
    pub fn context(&self) -> &ModuleContext {
        &self.context
    }

    /// Borrow the instance as its concrete type
    pub fn downcast_ref<T: Module>(&self) -> Option<&T> {
        self.instance.as_any().downcast_ref::<T>()
    }
}

impl fmt::Debug for LoadedModule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoadedModule")
            .field("descriptor", &self.descriptor)
            .finish_non_exhaustive()
    }
}

#[derive(Default)]
struct ModuleTable {
    /// Load order
    order: Vec<String>,
    loaded: HashMap<String, Arc<LoadedModule>>,
    states: HashMap<String, ModuleState>,
    /// Resolving module -> modules its `init` is waiting to load
    waits: HashMap<String, Vec<String>>,
}

impl ModuleTable {
    /// Whether the load of `name`, through the nested loads it is waiting
    /// on, depends on any module in `lineage`
    fn waits_on(&self, name: &str, lineage: &[String]) -> bool {
        let mut pending = vec![name];
        let mut seen = HashSet::new();
        while let Some(current) = pending.pop() {
            if !seen.insert(current) {
                continue;
            }
            for next in self.waits.get(current).into_iter().flatten() {
                if lineage.iter().any(|n| n == next) {
                    return true;
                }
                pending.push(next.as_str());
            }
        }
        false
    }
}

/// Outcome of [`SharedContext::claim`]
pub(crate) enum Claim<'a> {
    /// The caller owns the load of the name
    Acquired(ClaimGuard<'a>),
    /// Another load of the name is running and will settle
    Busy,
}

/// A claimed module name
///
/// Settled by [`ClaimGuard::register`] or [`ClaimGuard::fail`]. Dropping an
/// unsettled claim (a cancelled load, a panicking factory or `init`)
/// releases the name so later loads can retry it.
pub(crate) struct ClaimGuard<'a> {
    shared: &'a SharedContext,
    name: String,
    settled: bool,
}

impl ClaimGuard<'_> {
    /// Register the loaded module under the claimed name
    pub(crate) fn register(mut self, module: LoadedModule) -> Arc<LoadedModule> {
        self.settled = true;
        self.shared.register(module)
    }

    /// Record a failed load; nothing is registered
    pub(crate) fn fail(mut self, error: &ModuleError) {
        self.settled = true;
        self.shared.mark_failed(&self.name, error);
    }
}

impl Drop for ClaimGuard<'_> {
    fn drop(&mut self) {
        if !self.settled {
            tracing::warn!("Load of module {} was abandoned", self.name);
            self.shared.release(&self.name);
        }
    }
}

/// Marks a module's `init` as waiting on the load of another until dropped
pub(crate) struct WaitEdge<'a> {
    shared: &'a SharedContext,
    waiter: String,
    target: String,
}

impl Drop for WaitEdge<'_> {
    fn drop(&mut self) {
        let mut guard = self.shared.write_table();
        let table = &mut *guard;
        if let Some(targets) = table.waits.get_mut(&self.waiter) {
            if let Some(pos) = targets.iter().position(|t| *t == self.target) {
                targets.swap_remove(pos);
            }
            if targets.is_empty() {
                table.waits.remove(&self.waiter);
            }
        }
    }
}

/// The composition root every module can reach
pub struct SharedContext {
    config: Arc<SiteConfig>,
    resolver: ModuleResolver,
    table: RwLock<ModuleTable>,
    /// Signalled whenever a load finishes, successfully or not
    settled: Notify,
}

impl SharedContext {
    /// Create an empty context
    pub fn new(config: SiteConfig, resolver: ModuleResolver) -> Arc<Self> {
        Arc::new(Self {
            config: Arc::new(config),
            resolver,
            table: RwLock::new(ModuleTable::default()),
            settled: Notify::new(),
        })
    }

    /// Site configuration
    pub fn config(&self) -> &Arc<SiteConfig> {
        &self.config
    }

    pub(crate) fn resolver(&self) -> &ModuleResolver {
        &self.resolver
    }

    pub(crate) fn settled(&self) -> &Notify {
        &self.settled
    }

    // Entries are only replaced whole, so a poisoned lock still holds a consistent table.
    fn read_table(&self) -> RwLockReadGuard<'_, ModuleTable> {
        self.table.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_table(&self) -> RwLockWriteGuard<'_, ModuleTable> {
        self.table.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Find a loaded module by name
    pub fn lookup(&self, name: &str) -> Option<Arc<LoadedModule>> {
        self.read_table().loaded.get(name).cloned()
    }

    /// Run `f` against a loaded module of concrete type `T`
    pub fn with_module<T: Module, R>(&self, name: &str, f: impl FnOnce(&T) -> R) -> Option<R> {
        let module = self.lookup(name)?;
        module.downcast_ref::<T>().map(f)
    }

    /// Whether `name` is loaded
    pub fn is_loaded(&self, name: &str) -> bool {
        self.read_table().loaded.contains_key(name)
    }

    /// Names of loaded modules, in load order
    pub fn loaded_names(&self) -> Vec<String> {
        self.read_table().order.clone()
    }

    /// Number of loaded modules
    pub fn len(&self) -> usize {
        self.read_table().order.len()
    }

    /// Whether no module is loaded
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Lifecycle state of `name`
    pub fn module_state(&self, name: &str) -> ModuleState {
        self.read_table()
            .states
            .get(name)
            .cloned()
            .unwrap_or(ModuleState::Unloaded)
    }

    /// Claim `name` for loading by a caller whose load chain is `lineage`
    ///
    /// Fails with `AlreadyLoaded` once the name is loaded. A name still
    /// resolving is `Busy`, unless its load waits (directly or through other
    /// in-flight loads) on a module in `lineage`: that wait could never end,
    /// so it fails with `LoadInProgress`.
    pub(crate) fn claim(&self, name: &str, lineage: &[String]) -> Result<Claim<'_>, ModuleError> {
        let mut table = self.write_table();
        match table.states.get(name) {
            Some(ModuleState::Loaded) => Err(ModuleError::AlreadyLoaded(name.to_string())),
            Some(ModuleState::Resolving)
                if lineage.iter().any(|n| n == name) || table.waits_on(name, lineage) =>
            {
                Err(ModuleError::LoadInProgress(name.to_string()))
            }
            Some(ModuleState::Resolving) => Ok(Claim::Busy),
            _ => {
                table
                    .states
                    .insert(name.to_string(), ModuleState::Resolving);
                Ok(Claim::Acquired(ClaimGuard {
                    shared: self,
                    name: name.to_string(),
                    settled: false,
                }))
            }
        }
    }

    /// Record that the `init` of `waiter` is loading `target`
    pub(crate) fn wait_edge(&self, waiter: &str, target: &str) -> WaitEdge<'_> {
        self.write_table()
            .waits
            .entry(waiter.to_string())
            .or_default()
            .push(target.to_string());
        WaitEdge {
            shared: self,
            waiter: waiter.to_string(),
            target: target.to_string(),
        }
    }

    fn register(&self, module: LoadedModule) -> Arc<LoadedModule> {
        let name = module.name().to_string();
        let module = Arc::new(module);
        let mut table = self.write_table();
        table.order.push(name.clone());
        table.loaded.insert(name.clone(), Arc::clone(&module));
        table.states.insert(name, ModuleState::Loaded);
        drop(table);
        self.settled.notify_waiters();
        module
    }

    fn mark_failed(&self, name: &str, error: &ModuleError) {
        self.write_table()
            .states
            .insert(name.to_string(), ModuleState::Failed(error.to_string()));
        self.settled.notify_waiters();
    }

    fn release(&self, name: &str) {
        let mut table = self.write_table();
        if table.states.get(name) == Some(&ModuleState::Resolving) {
            table.states.remove(name);
        }
        drop(table);
        self.settled.notify_waiters();
    }
}

impl fmt::Debug for SharedContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedContext")
            .field("loaded", &self.loaded_names())
            .field("resolver", &self.resolver)
            .finish()
    }
}

/// Handle bound into each module at construction
#[derive(Clone)]
pub struct ModuleContext {
    descriptor: ModuleDescriptor,
    settings: HashMap<String, String>,
    config: Arc<SiteConfig>,
    shared: Weak<SharedContext>,
    /// This module and the modules whose loads led to it, outermost first
    lineage: Vec<String>,
}

impl ModuleContext {
    pub(crate) fn new(
        descriptor: ModuleDescriptor,
        settings: HashMap<String, String>,
        shared: &Arc<SharedContext>,
        mut lineage: Vec<String>,
    ) -> Self {
        lineage.push(descriptor.name.clone());
        Self {
            descriptor,
            settings,
            config: Arc::clone(shared.config()),
            shared: Arc::downgrade(shared),
            lineage,
        }
    }

    /// Name of the module holding this handle
    pub fn module_name(&self) -> &str {
        &self.descriptor.name
    }

    /// Descriptor of the module holding this handle
    pub fn descriptor(&self) -> &ModuleDescriptor {
        &self.descriptor
    }

    /// Site configuration
    pub fn site_config(&self) -> &SiteConfig {
        &self.config
    }

    /// Get a module setting
    pub fn get_config(&self, key: &str) -> Option<&String> {
        self.settings.get(key)
    }

    /// Get a module setting with default
    pub fn get_config_or(&self, key: &str, default: &str) -> String {
        self.settings
            .get(key)
            .map(|s| s.as_str())
            .unwrap_or(default)
            .to_string()
    }

    /// The shared context, while the registry is alive
    pub fn shared(&self) -> Option<Arc<SharedContext>> {
        self.shared.upgrade()
    }

    /// Whether this handle points at `shared`
    pub fn is_bound_to(&self, shared: &Arc<SharedContext>) -> bool {
        std::ptr::eq(self.shared.as_ptr(), Arc::as_ptr(shared))
    }

    /// Find a loaded sibling module
    pub fn lookup(&self, name: &str) -> Option<Arc<LoadedModule>> {
        self.shared()?.lookup(name)
    }

    /// Run `f` against a loaded sibling of concrete type `T`
    pub fn with_module<T: Module, R>(&self, name: &str, f: impl FnOnce(&T) -> R) -> Option<R> {
        self.shared()?.with_module(name, f)
    }

    /// Ask the registry to load an optional module; failures are logged, not raised
    pub async fn load_module(&self, name: &str) -> bool {
        match self.shared() {
            Some(shared) => {
                ModuleRegistry::nested(shared, self.lineage.clone())
                    .load_module(name)
                    .await
            }
            None => {
                tracing::warn!(
                    "Module {} requested {} after the registry was dropped",
                    self.module_name(),
                    name
                );
                false
            }
        }
    }

    /// Typed variant of [`ModuleContext::load_module`]
    pub async fn try_load_module(&self, name: &str) -> Result<Arc<LoadedModule>, ModuleError> {
        let shared = self.shared().ok_or(ModuleError::ContextUnavailable)?;
        ModuleRegistry::nested(shared, self.lineage.clone())
            .try_load_module(name)
            .await
    }
}

impl fmt::Debug for ModuleContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModuleContext")
            .field("module", &self.descriptor.name)
            .field("settings", &self.settings)
            .field("lineage", &self.lineage)
            .finish_non_exhaustive()
    }
}
