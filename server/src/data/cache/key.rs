//! Type-safe cache key builder with versioning

use crate::core::constants::CACHE_KEY_VERSION;

/// Type-safe cache key builder
///
/// All keys are prefixed with a version (e.g., "v1:") to allow
/// invalidating all cached data on schema changes.
pub struct CacheKey;

impl CacheKey {
    /// Cache key for a report response
    ///
    /// `params` are `(name, value)` pairs of the resolved request; they are
    /// sorted so that parameter order in the URL does not split entries.
    pub fn report(endpoint: &str, params: &[(&str, String)]) -> String {
        let mut pairs: Vec<String> = params
            .iter()
            .map(|(k, v)| format!("{}={}", k, encode(v)))
            .collect();
        pairs.sort();
        format!(
            "{}:report:{}:{}",
            CACHE_KEY_VERSION,
            endpoint,
            pairs.join("&")
        )
    }
}

/// Escape separators so distinct values can never produce the same key
fn encode(value: &str) -> String {
    value
        .replace('%', "%25")
        .replace('&', "%26")
        .replace('=', "%3D")
}
