//! Auth Cache - Pluggable caching for authentication strategies
//!
//! Provides keyed stores with LRU/FIFO/IDLE replacement, TTL expiration,
//! eviction hooks, a background expiry collector and a two-tier replicator
//! over durable backends.

pub mod cache;
pub mod config;
pub mod error;
pub mod tasks;
pub mod tier;

pub use cache::{Cache, Kind, Registry, SyncCache};
pub use config::CacheConfig;
pub use error::{CacheError, Result};
pub use tasks::spawn_collector;
pub use tier::{FileSystemCache, Replicator, Tier};
