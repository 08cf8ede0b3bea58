/// Get environment variable with BULKHEAD_ prefix, falling back to unprefixed version
///
/// ```rust
/// use bulkhead::utils::get_env_with_prefix;
///
/// // Checks BULKHEAD_LOG_LEVEL first, then LOG_LEVEL
/// let level = get_env_with_prefix("LOG_LEVEL");
/// ```
pub fn get_env_with_prefix(key: &str) -> Option<String> {
    std::env::var(format!("BULKHEAD_{}", key))
        .or_else(|_| std::env::var(key))
        .ok()
}
