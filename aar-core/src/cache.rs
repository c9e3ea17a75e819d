//! Report cache.
//!
//! Generated reports are expensive, so finished text is kept in a TTL cache
//! keyed by user identity. Expiry is enforced by the store itself; the
//! orchestrator never runs eviction logic. The cache is a performance
//! optimisation only — callers treat a cache error as a miss.

use crate::error::Result;
use moka::sync::Cache;
use std::time::Duration;

/// Cache key for a user's report
pub fn report_key(user_id: &str) -> String {
    format!("report:{user_id}")
}

/// Key-value store for generated report text with store-enforced expiry.
pub trait ReportCache: Send + Sync {
    /// Look up cached text; `None` once the entry's TTL has elapsed
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Store text, overwriting any previous entry under the key
    fn put(&self, key: &str, text: &str) -> Result<()>;
}

/// Configuration for the report cache
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Maximum number of cached reports
    pub max_entries: u64,
    /// Time-to-live for cache entries
    pub ttl: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_entries: 10_000,
            ttl: Duration::from_secs(3600),
        }
    }
}

/// In-process TTL cache backed by moka.
pub struct MokaReportCache {
    cache: Cache<String, String>,
}

impl MokaReportCache {
    /// Create a new cache with the given configuration
    pub fn new(config: CacheConfig) -> Self {
        let cache = Cache::builder()
            .max_capacity(config.max_entries)
            .time_to_live(config.ttl)
            .build();

        Self { cache }
    }

    /// Number of live entries
    pub fn len(&self) -> u64 {
        self.cache.entry_count()
    }

    /// Whether the cache holds no entries
    pub fn is_empty(&self) -> bool {
        self.cache.entry_count() == 0
    }
}

impl Default for MokaReportCache {
    fn default() -> Self {
        Self::new(CacheConfig::default())
    }
}

impl ReportCache for MokaReportCache {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.cache.get(key))
    }

    fn put(&self, key: &str, text: &str) -> Result<()> {
        self.cache.insert(key.to_string(), text.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cache_with_ttl(ttl: Duration) -> MokaReportCache {
        MokaReportCache::new(CacheConfig {
            max_entries: 16,
            ttl,
        })
    }

    #[test]
    fn test_report_key_format() {
        assert_eq!(report_key("u-1"), "report:u-1");
    }

    #[test]
    fn test_put_then_get() {
        let cache = MokaReportCache::default();
        cache.put("report:u", "weekly summary").unwrap();

        assert_eq!(
            cache.get("report:u").unwrap().as_deref(),
            Some("weekly summary")
        );
    }

    #[test]
    fn test_get_missing_key() {
        let cache = MokaReportCache::default();
        assert!(cache.get("report:nobody").unwrap().is_none());
    }

    #[test]
    fn test_put_overwrites() {
        let cache = MokaReportCache::default();
        cache.put("report:u", "stale").unwrap();
        cache.put("report:u", "fresh").unwrap();

        assert_eq!(cache.get("report:u").unwrap().as_deref(), Some("fresh"));
    }

    #[test]
    fn test_entry_expires_after_ttl() {
        let cache = cache_with_ttl(Duration::from_millis(100));
        cache.put("report:u", "text").unwrap();

        // Inside the TTL the entry is served
        assert!(cache.get("report:u").unwrap().is_some());

        std::thread::sleep(Duration::from_millis(150));

        // Past the TTL the store reports a miss
        assert!(cache.get("report:u").unwrap().is_none());
    }

    #[test]
    fn test_keys_are_independent() {
        let cache = MokaReportCache::default();
        cache.put("report:a", "for a").unwrap();
        cache.put("report:b", "for b").unwrap();

        assert_eq!(cache.get("report:a").unwrap().as_deref(), Some("for a"));
        assert_eq!(cache.get("report:b").unwrap().as_deref(), Some("for b"));
    }
}
