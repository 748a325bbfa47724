//! Utility modules shared by the runtime and the render tool

pub mod env;
pub mod error;
pub mod logging;
pub mod validation;

// Re-export commonly used items
pub use env::{env_opt, env_or_default};
pub use error::result_to_option;
pub use logging::{init_logging, init_logging_from_config};
#[cfg(feature = "json-logging")]
pub use logging::init_json_logging;
pub use validation::{ensure, ensure_fmt, ensure_not_empty};
