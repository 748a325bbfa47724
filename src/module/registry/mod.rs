//! Module registry
//!
//! Module descriptors and the name -> factory resolver.

pub mod descriptor;
pub mod resolver;

pub use descriptor::{validate_module_name, ModuleDescriptor};
pub use resolver::ModuleResolver;
