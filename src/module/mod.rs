//! Module system
//!
//! Modules are feature units loaded by name and bound to one shared context.
//!
//! ## Architecture
//!
//! - **Resolver**: explicit name -> factory map, filled in code
//! - **Priority modules**: loaded at startup in configured order; any failure aborts boot
//! - **Optional modules**: loaded on demand; failures are logged and reported as `false`
//! - **Shared context**: every module holds a handle to the same context and can
//!   look up modules loaded before it

pub mod context;
pub mod loader;
pub mod manager;
pub mod registry;
pub mod traits;

pub use context::{LoadedModule, ModuleContext, SharedContext};
pub use loader::ModuleLoader;
pub use manager::ModuleRegistry;
pub use registry::{ModuleDescriptor, ModuleResolver};
pub use traits::{BootstrapError, Module, ModuleError, ModuleFactory, ModuleState};
