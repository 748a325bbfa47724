//! Validation utilities
//!
//! Provides helpers for common validation patterns.

/// Ensure a condition is true, or return an error
///
/// Similar to `assert!` but returns a Result instead of panicking.
///
/// # Example
/// ```rust
/// use hyperite::utils::ensure;
///
/// let count = 3;
/// assert!(ensure(count > 0, "count must be positive").is_ok());
/// ```
pub fn ensure(condition: bool, message: &str) -> Result<(), String> {
    if condition {
        Ok(())
    } else {
        Err(message.to_string())
    }
}

/// Ensure a condition is true with a formatted error message
///
/// # Example
/// ```rust
/// use hyperite::utils::ensure_fmt;
///
/// let url = "http://example.com";
/// let result = ensure_fmt(url.ends_with('/'), || format!("{} must end with '/'", url));
/// assert!(result.is_err());
/// ```
pub fn ensure_fmt<F>(condition: bool, message: F) -> Result<(), String>
where
    F: FnOnce() -> String,
{
    if condition {
        Ok(())
    } else {
        Err(message())
    }
}

/// Validate a string value is not empty
pub fn ensure_not_empty(value: &str, name: &str) -> Result<(), String> {
    if value.is_empty() {
        Err(format!("{} must not be empty", name))
    } else {
        Ok(())
    }
}
