//! Error handling utilities for graceful degradation
//!
//! Helpers for fail-soft paths: the error is logged and execution continues.

use tracing::warn;

/// Convert a Result to an Option, logging the error
///
/// Returns `Some(T)` on success, `None` on error (after logging a warning).
///
/// # Example
/// ```rust
/// use hyperite::utils::result_to_option;
///
/// let parsed = result_to_option("42".parse::<u32>(), "Failed to parse port");
/// assert_eq!(parsed, Some(42));
/// ```
pub fn result_to_option<T, E>(result: Result<T, E>, context: &str) -> Option<T>
where
    E: std::fmt::Display,
{
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            warn!("{}: {}", context, e);
            None
        }
    }
}
