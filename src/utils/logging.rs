//! Logging initialization for the site runtime
//!
//! - Respects the RUST_LOG environment variable
//! - Falls back to the filter from the site config
//! - Defaults to "info"
//!
//! # Usage
//! ```rust,no_run
//! use hyperite::utils::init_logging;
//!
//! init_logging(None); // Uses RUST_LOG or defaults to "info"
//! ```

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Build the env filter: RUST_LOG wins, then the config filter, then "info"
fn build_filter(filter: Option<&str>) -> EnvFilter {
    if std::env::var("RUST_LOG").is_ok() {
        return EnvFilter::from_default_env();
    }
    EnvFilter::new(filter.unwrap_or("info"))
}

/// Initialize human-readable logging to stderr
///
/// # Arguments
/// * `filter` - Optional log filter from config (e.g., "info", "hyperite::module=debug").
///   RUST_LOG takes precedence when set.
pub fn init_logging(filter: Option<&str>) {
    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(true)
                .with_thread_ids(false)
                .with_writer(std::io::stderr)
                .with_ansi(std::env::var("NO_COLOR").is_err()),
        )
        .with(build_filter(filter))
        .init();
}

/// Initialize logging with JSON output (for log aggregation)
#[cfg(feature = "json-logging")]
pub fn init_json_logging(filter: Option<&str>) {
    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .json()
                .with_target(true)
                .with_writer(std::io::stderr)
                .with_current_span(true)
                .with_span_list(true),
        )
        .with(build_filter(filter))
        .init();
}

/// Initialize logging from the `[logging]` section of the site config
///
/// # Example
/// ```rust,no_run
/// use hyperite::config::SiteConfig;
/// use hyperite::utils::init_logging_from_config;
///
/// let config = SiteConfig::default();
/// init_logging_from_config(config.logging.as_ref());
/// ```
pub fn init_logging_from_config(config: Option<&crate::config::LoggingConfig>) {
    let filter = config.and_then(|c| c.filter.as_deref());

    if config.map(|c| c.json_format).unwrap_or(false) {
        #[cfg(feature = "json-logging")]
        {
            init_json_logging(filter);
        }
        #[cfg(not(feature = "json-logging"))]
        {
            // json-logging feature not compiled in
            init_logging(filter);
        }
    } else {
        init_logging(filter);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_filter_prefers_config_without_rust_log() {
        std::env::remove_var("RUST_LOG");
        let filter = build_filter(Some("hyperite=debug"));
        assert_eq!(filter.to_string().to_lowercase(), "hyperite=debug");

        let filter = build_filter(None);
        assert_eq!(filter.to_string().to_lowercase(), "info");
    }

    #[test]
    #[serial]
    fn test_filter_rust_log_takes_precedence() {
        std::env::set_var("RUST_LOG", "warn");
        let filter = build_filter(Some("debug"));
        assert_eq!(filter.to_string().to_lowercase(), "warn");
        std::env::remove_var("RUST_LOG");
    }
}
