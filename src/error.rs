//! Error types for the cache engine
//!
//! Provides unified error handling using thiserror. Misses are never errors:
//! reads report absence through `Option`, and only tiers backed by real I/O
//! (or the single-TTL record store) produce a `CacheError`.

use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for fallible cache tiers.
#[derive(Error, Debug)]
pub enum CacheError {
    /// The access discovered an expired record and removed it.
    ///
    /// Delivered once; later accesses to the same key are plain misses.
    #[error("Key expired: {0}")]
    Expired(String),

    /// Filesystem failure in a disk-backed tier
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A persisted record could not be encoded or decoded
    #[error("Codec error: {0}")]
    Codec(#[from] serde_json::Error),

    /// A typed read found a value of a different type
    #[error("Type mismatch for key {key}: expected {expected}")]
    TypeMismatch {
        key: String,
        expected: &'static str,
    },

    /// Any other backing-store failure
    #[error("Backend error: {0}")]
    Backend(String),
}

impl CacheError {
    // == Is Expired ==
    /// Returns true for the one-time expiry signal.
    pub fn is_expired(&self) -> bool {
        matches!(self, CacheError::Expired(_))
    }
}

// == Result Type Alias ==
/// Convenience Result type for cache tiers.
pub type Result<T> = std::result::Result<T, CacheError>;
