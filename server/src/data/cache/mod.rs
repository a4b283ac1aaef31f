//! Report response cache
//!
//! In-memory cache (moka) for serialized report responses. Values are stored
//! as JSON bytes so any `Serialize` response can be cached without the cache
//! knowing its type.

mod error;
mod key;

use std::time::Duration;

use moka::future::Cache;
use serde::Serialize;
use serde::de::DeserializeOwned;

pub use error::CacheError;
pub use key::CacheKey;

use crate::core::config::CacheConfig;

/// Cache service providing typed access to the in-memory report cache
///
/// A disabled cache accepts every call and never stores anything.
pub struct CacheService {
    cache: Option<Cache<String, Vec<u8>>>,
}

impl std::fmt::Debug for CacheService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheService")
            .field("enabled", &self.is_enabled())
            .field("entries", &self.entry_count())
            .finish()
    }
}

impl CacheService {
    /// Create a new cache service from configuration
    pub fn new(config: &CacheConfig) -> Self {
        if !config.enabled {
            tracing::debug!("Report cache disabled");
            return Self { cache: None };
        }

        tracing::debug!(
            max_entries = config.max_entries,
            ttl_secs = config.ttl_secs,
            "Initializing in-memory report cache"
        );

        let cache = Cache::builder()
            .max_capacity(config.max_entries)
            // Set initial capacity to reduce rehashing during warmup
            .initial_capacity((config.max_entries as usize / 4).min(10_000))
            .time_to_live(Duration::from_secs(config.ttl_secs))
            .build();

        Self { cache: Some(cache) }
    }

    pub fn is_enabled(&self) -> bool {
        self.cache.is_some()
    }

    /// Approximate number of cached entries
    pub fn entry_count(&self) -> u64 {
        self.cache.as_ref().map_or(0, |c| c.entry_count())
    }

    // =========================================================================
    // Raw bytes API
    // =========================================================================

    /// Get raw bytes from cache
    pub async fn get_raw(&self, key: &str) -> Option<Vec<u8>> {
        match &self.cache {
            Some(cache) => cache.get(key).await,
            None => None,
        }
    }

    /// Set raw bytes in cache
    pub async fn set_raw(&self, key: &str, value: Vec<u8>) {
        if let Some(cache) = &self.cache {
            cache.insert(key.to_string(), value).await;
        }
    }

    // =========================================================================
    // Typed API (serde)
    // =========================================================================

    /// Get a typed value from cache
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, CacheError> {
        match self.get_raw(key).await {
            Some(bytes) => {
                let value = serde_json::from_slice(&bytes)
                    .map_err(|e| CacheError::Serialization(e.to_string()))?;
                Ok(Some(value))
            }
            None => Ok(None),
        }
    }

    /// Set a typed value in cache
    pub async fn set<T: Serialize>(&self, key: &str, value: &T) -> Result<(), CacheError> {
        if !self.is_enabled() {
            return Ok(());
        }
        let bytes =
            serde_json::to_vec(value).map_err(|e| CacheError::Serialization(e.to_string()))?;
        self.set_raw(key, bytes).await;
        Ok(())
    }

    /// Delete a key from cache
    pub async fn invalidate_key(&self, key: &str) {
        if let Some(cache) = &self.cache {
            cache.invalidate(key).await;
        }
    }

    /// Drop every cached entry (after data changes)
    pub fn invalidate_all(&self) {
        if let Some(cache) = &self.cache {
            cache.invalidate_all();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> CacheConfig {
        CacheConfig {
            enabled: true,
            max_entries: 100,
            ttl_secs: 60,
        }
    }

    #[derive(Debug, Clone, PartialEq, Serialize, serde::Deserialize)]
    struct Report {
        labels: String,
        data: Vec<i64>,
    }

    #[tokio::test]
    async fn test_typed_get_set() {
        let service = CacheService::new(&test_config());
        let report = Report {
            labels: "X = Blog".to_string(),
            data: vec![3, 2, 1],
        };

        service.set("report:1", &report).await.unwrap();
        let fetched: Option<Report> = service.get("report:1").await.unwrap();
        assert_eq!(fetched, Some(report));
    }

    #[tokio::test]
    async fn test_miss_returns_none() {
        let service = CacheService::new(&test_config());
        let fetched: Option<Report> = service.get("missing").await.unwrap();
        assert!(fetched.is_none());
    }

    #[tokio::test]
    async fn test_type_mismatch_is_serialization_error() {
        let service = CacheService::new(&test_config());
        service.set_raw("report:bad", b"not json".to_vec()).await;
        let result: Result<Option<Report>, _> = service.get("report:bad").await;
        assert!(matches!(result, Err(CacheError::Serialization(_))));
    }

    #[tokio::test]
    async fn test_invalidate_key() {
        let service = CacheService::new(&test_config());
        service.set_raw("report:1", b"1".to_vec()).await;
        service.invalidate_key("report:1").await;
        assert!(service.get_raw("report:1").await.is_none());
    }

    #[tokio::test]
    async fn test_disabled_cache_stores_nothing() {
        let service = CacheService::new(&CacheConfig {
            enabled: false,
            ..test_config()
        });
        assert!(!service.is_enabled());

        service.set("report:1", &1).await.unwrap();
        let fetched: Option<i64> = service.get("report:1").await.unwrap();
        assert!(fetched.is_none());
        assert_eq!(service.entry_count(), 0);
    }
}
