//! TTL Collector Task
//!
//! Background task that removes expired records from a [`RecordCache`].
//!
//! One task serves the whole store: records are queued in store order, and
//! with a single TTL that is also expiration order, so the task only ever
//! sleeps until the head of the queue is due.

use std::fmt;
use std::hash::Hash;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::cache::RecordCache;

/// Spawns the collector for `cache`.
///
/// The task waits for queued records, skips records whose key has since
/// been overwritten or removed, sleeps until the rest are due and then reads
/// the key so the lazy expiry path removes it.
///
/// # Arguments
/// * `cache` - Store to collect; the task holds a clone
/// * `token` - Cancels the task, whether it is idle or sleeping
///
/// # Returns
/// A JoinHandle that resolves once the token is cancelled.
///
/// # Example
/// ```ignore
/// let cache = RecordCache::new(Duration::from_secs(300));
/// let token = CancellationToken::new();
/// let handle = spawn_collector(cache.clone(), token.clone());
/// // Later, during shutdown:
/// token.cancel();
/// handle.await?;
/// ```
pub fn spawn_collector<K, V>(cache: RecordCache<K, V>, token: CancellationToken) -> JoinHandle<()>
where
    K: Hash + Eq + Clone + fmt::Display + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    let attached = cache.attach_collector();

    tokio::spawn(async move {
        if !attached {
            warn!("TTL collector already running for this cache");
            return;
        }
        info!(
            ttl_ms = cache.ttl().as_millis() as u64,
            "Starting TTL collector"
        );

        loop {
            let record = match cache.queue().next() {
                Some(record) => record,
                None => {
                    tokio::select! {
                        _ = token.cancelled() => break,
                        _ = cache.queue().wait() => continue,
                    }
                }
            };

            // Overwritten or deleted since queued: nothing to wait for.
            if !cache.holds(&record.key, record.id) {
                continue;
            }

            // Expiry is strict, so wake just past the deadline.
            let expires_at = Instant::from_std(record.expires_at);
            let deadline = expires_at
                .checked_add(Duration::from_millis(1))
                .unwrap_or(expires_at);
            tokio::select! {
                _ = token.cancelled() => break,
                _ = tokio::time::sleep_until(deadline) => {}
            }

            match cache.load(&record.key) {
                Err(err) if err.is_expired() => {
                    debug!(key = %record.key, "TTL collector removed expired record");
                }
                _ => {}
            }
        }

        cache.detach_collector();
        info!("TTL collector stopped");
    })
}
