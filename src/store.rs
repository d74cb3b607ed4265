use async_trait::async_trait;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::error::CacheError;

/// A cache store is a common interface for storing, reading and expiring
/// keyed results.
///
/// Stores are generic over the cached value type `V`. For a wrapped function
/// returning `Result<T, E>`, `V` is `Result<T, E>` itself, so a cached
/// failure replays exactly.
#[async_trait]
pub trait CacheStore<V>: Send + Sync
where
    V: Clone + Send + Sync,
{
    /// A name for tracing.
    ///
    /// # Example
    /// - "memory"
    /// - "redis"
    fn name(&self) -> &'static str;

    /// Return the cached value.
    ///
    /// The response must be `None` for cache misses, including entries whose
    /// expiry has passed but which have not been swept yet.
    async fn get(&self, key: &str) -> Result<Option<V>, CacheError>;

    /// Set the value for the given key, overwriting unconditionally.
    async fn set(&self, key: &str, value: V, ttl: Duration) -> Result<(), CacheError>;

    /// Reschedule or immediately clear a single entry.
    ///
    /// A zero `ttl` removes the entry now; a positive `ttl` makes the entry
    /// valid until `now + ttl`.
    async fn expire(&self, key: &str, ttl: Duration) -> Result<(), CacheError>;

    /// Start the background staleness sweeper, if this store needs one.
    ///
    /// Stores backed by a remote engine with native expiry return `None`
    /// (the default). The in-memory store returns a running [`Sweeper`].
    fn periodic_expire(&self, interval: Duration) -> Option<Sweeper> {
        let _ = interval;
        None
    }
}

/// Handle to a running staleness sweep task.
///
/// The sweep runs until [`Sweeper::stop`] is called or the handle is
/// dropped, so tests and shutdown paths can terminate it deterministically
/// instead of leaking it for the process lifetime.
pub struct Sweeper {
    shutdown: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

impl Sweeper {
    pub(crate) fn new(shutdown: watch::Sender<bool>, handle: JoinHandle<()>) -> Self {
        Sweeper { shutdown, handle }
    }

    /// Signal the sweep task to stop.
    pub fn stop(&self) {
        let _ = self.shutdown.send(true);
    }
}

impl Drop for Sweeper {
    fn drop(&mut self) {
        let _ = self.shutdown.send(true);
        self.handle.abort();
    }
}
