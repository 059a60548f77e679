//! Typed Values
//!
//! Strategies sharing one cache store heterogeneous values as [`AnyValue`]
//! and recover the concrete type at the point of use.

use std::any::{type_name, Any};
use std::fmt;
use std::sync::Arc;

use crate::cache::Cache;
use crate::error::{CacheError, Result};

/// Type-erased cached value.
pub type AnyValue = Arc<dyn Any + Send + Sync>;

// == Load As ==
/// Loads `key` and downcasts the value to `T`.
///
/// A miss is `Ok(None)`; a value of another type is
/// [`CacheError::TypeMismatch`].
pub fn load_as<T, K, C>(cache: &C, key: &K) -> Result<Option<Arc<T>>>
where
    T: Any + Send + Sync,
    K: fmt::Display,
    C: Cache<K, AnyValue> + ?Sized,
{
    match cache.load(key) {
        None => Ok(None),
        Some(value) => value
            .downcast::<T>()
            .map(Some)
            .map_err(|_| CacheError::TypeMismatch {
                key: key.to_string(),
                expected: type_name::<T>(),
            }),
    }
}
