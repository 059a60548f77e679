//! Registry Module
//!
//! Maps policy identifiers to constructors. A registry is an ordinary value
//! built once at startup and handed to whatever needs to create caches;
//! [`Registry::default`] registers every built-in policy.

use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::cache::policy::{FifoCache, IdleCache, LruCache};
use crate::cache::synced::SyncCache;
use crate::cache::{Policy, Setting};
use crate::config::CacheConfig;

// == Policy Kind ==
/// Identifier of a replacement policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Kind {
    /// Caching disabled
    Idle,
    Lru,
    Fifo,
}

impl Kind {
    pub const ALL: [Kind; 3] = [Kind::Idle, Kind::Lru, Kind::Fifo];

    pub fn as_str(&self) -> &'static str {
        match self {
            Kind::Idle => "idle",
            Kind::Lru => "lru",
            Kind::Fifo => "fifo",
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when parsing an unknown policy name.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown cache policy: {0}")]
pub struct UnknownPolicy(pub String);

impl FromStr for Kind {
    type Err = UnknownPolicy;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Kind::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownPolicy(s.to_string()))
    }
}

/// Builds a fresh, unconfigured policy instance.
pub type Constructor<K, V> = fn() -> Box<dyn Policy<K, V>>;

// == Registry ==
/// Policy factory keyed by [`Kind`].
pub struct Registry<K, V> {
    constructors: HashMap<Kind, Constructor<K, V>>,
}

impl<K, V> Registry<K, V>
where
    K: Hash + Eq + Clone + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    // == Constructors ==
    /// Creates a registry with no policies registered.
    pub fn empty() -> Self {
        Self {
            constructors: HashMap::new(),
        }
    }

    // == Register ==
    /// Registers `constructor` for `kind`, replacing any previous one.
    pub fn register(&mut self, kind: Kind, constructor: Constructor<K, V>) {
        debug!(policy = %kind, "Registered cache policy");
        self.constructors.insert(kind, constructor);
    }

    pub fn is_registered(&self, kind: Kind) -> bool {
        self.constructors.contains_key(&kind)
    }

    // == New Unsafe ==
    /// Builds a raw, single-threaded policy and applies `settings` in order.
    ///
    /// # Panics
    /// Panics if no constructor is registered for `kind`. This is a wiring
    /// defect, not a runtime condition.
    pub fn new_unsafe(
        &self,
        kind: Kind,
        settings: impl IntoIterator<Item = Setting<K, V>>,
    ) -> Box<dyn Policy<K, V>> {
        let constructor = match self.constructors.get(&kind) {
            Some(constructor) => constructor,
            None => panic!("cache: requested policy {kind} is not registered"),
        };

        let mut policy = constructor();
        for setting in settings {
            policy.apply(setting);
        }
        policy
    }

    // == New ==
    /// Builds a policy and wraps it for shared use across threads.
    ///
    /// # Panics
    /// Same as [`Registry::new_unsafe`].
    pub fn new(
        &self,
        kind: Kind,
        settings: impl IntoIterator<Item = Setting<K, V>>,
    ) -> SyncCache<K, V> {
        SyncCache::from_boxed(self.new_unsafe(kind, settings))
    }

    // == From Config ==
    /// Builds a thread-safe cache from loaded configuration plus any
    /// callbacks the caller wants registered.
    pub fn from_config(
        &self,
        config: &CacheConfig,
        callbacks: impl IntoIterator<Item = Setting<K, V>>,
    ) -> SyncCache<K, V> {
        let settings = config.settings().into_iter().chain(callbacks);
        self.new(config.policy, settings)
    }
}

impl<K, V> Default for Registry<K, V>
where
    K: Hash + Eq + Clone + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        let mut registry = Self::empty();
        registry.register(Kind::Idle, || {
            Box::new(IdleCache::<K, V>::new()) as Box<dyn Policy<K, V>>
        });
        registry.register(Kind::Lru, || {
            Box::new(LruCache::<K, V>::new()) as Box<dyn Policy<K, V>>
        });
        registry.register(Kind::Fifo, || {
            Box::new(FifoCache::<K, V>::new()) as Box<dyn Policy<K, V>>
        });
        registry
    }
}
