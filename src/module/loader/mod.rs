//! Module settings loading
//!
//! Handles per-module settings files and site-level overrides.

pub mod loader;

pub use loader::ModuleLoader;
