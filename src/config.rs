//! Configuration Module
//!
//! Handles loading cache configuration from environment variables.

use std::env;
use std::time::Duration;

use crate::cache::{Kind, Setting};

/// Cache construction parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheConfig {
    /// Replacement policy
    pub policy: Kind,
    /// Maximum number of entries, 0 = unbounded
    pub capacity: usize,
    /// Entry lifetime, None = entries never expire
    pub ttl: Option<Duration>,
}

impl CacheConfig {
    /// Creates a new CacheConfig by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `AUTH_CACHE_POLICY` - `idle`, `lru` or `fifo` (default: lru)
    /// - `AUTH_CACHE_CAPACITY` - Maximum entries (default: 1000)
    /// - `AUTH_CACHE_TTL_MS` - TTL in milliseconds, 0 = none (default: none)
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            policy: env::var("AUTH_CACHE_POLICY")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.policy),
            capacity: env::var("AUTH_CACHE_CAPACITY")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.capacity),
            ttl: env::var("AUTH_CACHE_TTL_MS")
                .ok()
                .and_then(|v| v.parse::<u64>().ok())
                .filter(|ms| *ms > 0)
                .map(Duration::from_millis)
                .or(defaults.ttl),
        }
    }

    // == Settings ==
    /// Converts the configuration into construction-time settings.
    pub fn settings<K, V>(&self) -> Vec<Setting<K, V>> {
        let mut settings = vec![Setting::Capacity(self.capacity)];
        if let Some(ttl) = self.ttl {
            settings.push(Setting::Ttl(ttl));
        }
        settings
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            policy: Kind::Lru,
            capacity: 1000,
            ttl: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{Cache, Registry};

    #[test]
    fn test_config_default() {
        let config = CacheConfig::default();
        assert_eq!(config.policy, Kind::Lru);
        assert_eq!(config.capacity, 1000);
        assert_eq!(config.ttl, None);
    }

    // Single test touching the environment so parallel tests don't race on it
    #[test]
    fn test_config_from_env() {
        env::remove_var("AUTH_CACHE_POLICY");
        env::remove_var("AUTH_CACHE_CAPACITY");
        env::remove_var("AUTH_CACHE_TTL_MS");
        assert_eq!(CacheConfig::from_env(), CacheConfig::default());

        env::set_var("AUTH_CACHE_POLICY", "FIFO");
        env::set_var("AUTH_CACHE_CAPACITY", "25");
        env::set_var("AUTH_CACHE_TTL_MS", "1500");
        let config = CacheConfig::from_env();
        assert_eq!(config.policy, Kind::Fifo);
        assert_eq!(config.capacity, 25);
        assert_eq!(config.ttl, Some(Duration::from_millis(1500)));

        env::set_var("AUTH_CACHE_POLICY", "bogus");
        env::set_var("AUTH_CACHE_CAPACITY", "-1");
        env::set_var("AUTH_CACHE_TTL_MS", "0");
        assert_eq!(CacheConfig::from_env(), CacheConfig::default());

        env::remove_var("AUTH_CACHE_POLICY");
        env::remove_var("AUTH_CACHE_CAPACITY");
        env::remove_var("AUTH_CACHE_TTL_MS");
    }

    #[test]
    fn test_registry_from_config() {
        let config = CacheConfig {
            policy: Kind::Fifo,
            capacity: 2,
            ttl: Some(Duration::from_secs(60)),
        };
        let registry: Registry<u32, u32> = Registry::default();
        let cache = registry.from_config(&config, []);

        cache.store(1, 1);
        cache.store(2, 2);
        cache.store(3, 3);

        assert_eq!(cache.cap(), 2);
        assert_eq!(cache.keys(), vec![2, 3]);
    }
}
