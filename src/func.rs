//! The invocation wrapper: the one component callers interact with.
//!
//! [`CachedFunc`] composes a lock provider, a cache store and a key
//! generator into a single call-interception protocol. Caching is strictly a
//! performance side-channel: the caller always receives either a previously
//! cached result or a freshly computed one, and the wrapper never returns an
//! error of its own.

use std::future::Future;
use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Duration;

use crate::error::CacheError;
use crate::key::KeyGenerator;
use crate::lock::LockProvider;
use crate::store::{CacheStore, Sweeper};

/// Immutable bundle of the three pluggable collaborators plus the caching
/// policy.
///
/// Assembled once via [`Config::new`], then shared read-only by every call
/// to every callable wrapped with it. `Clone` is cheap and shares all
/// collaborators, including the sweeper handle: the sweep stops when the
/// last clone is dropped.
pub struct Config<A, V>
where
    V: Clone + Send + Sync,
{
    lock: Arc<dyn LockProvider>,
    store: Arc<dyn CacheStore<V>>,
    key_gen: Arc<dyn KeyGenerator<A>>,
    cache_on_error: bool,
    sweeper: Option<Arc<Sweeper>>,
}

impl<A, V> Clone for Config<A, V>
where
    V: Clone + Send + Sync,
{
    fn clone(&self) -> Self {
        Config {
            lock: Arc::clone(&self.lock),
            store: Arc::clone(&self.store),
            key_gen: Arc::clone(&self.key_gen),
            cache_on_error: self.cache_on_error,
            sweeper: self.sweeper.clone(),
        }
    }
}

impl<A, V> Config<A, V>
where
    V: Clone + Send + Sync,
{
    /// Create a new configuration.
    ///
    /// Constructing it starts the staleness sweeper if the store supports
    /// one (`sweep_interval` is ignored otherwise), so this must run inside
    /// a tokio runtime when the store is [`crate::MemoryStore`].
    ///
    /// # Arguments
    /// * `lock` - Guards the check-then-act sequence
    /// * `store` - Where results are kept
    /// * `key_gen` - Derives the cache key from the argument tuple
    /// * `cache_on_error` - Whether failed invocations are cached too
    /// * `sweep_interval` - Staleness sweep interval for stores that need one
    pub fn new(
        lock: Arc<dyn LockProvider>,
        store: Arc<dyn CacheStore<V>>,
        key_gen: Arc<dyn KeyGenerator<A>>,
        cache_on_error: bool,
        sweep_interval: Duration,
    ) -> Self {
        let sweeper = store.periodic_expire(sweep_interval).map(Arc::new);
        Config {
            lock,
            store,
            key_gen,
            cache_on_error,
            sweeper,
        }
    }

    /// The configured cache store.
    pub fn store(&self) -> &Arc<dyn CacheStore<V>> {
        &self.store
    }

    /// Handle to the staleness sweeper, if the store started one.
    ///
    /// The sweep also stops when the last clone of this configuration is
    /// dropped; this handle lets shutdown paths stop it earlier.
    pub fn sweeper(&self) -> Option<&Sweeper> {
        self.sweeper.as_deref()
    }
}

/// Reschedule or immediately invalidate a single cache entry.
///
/// Passing `Duration::ZERO` removes the entry now; any positive duration
/// makes it valid until `now + ttl`. This is the only externally exposed
/// manual-invalidation primitive.
pub async fn expire<A, V>(
    config: &Config<A, V>,
    key: &str,
    ttl: Duration,
) -> Result<(), CacheError>
where
    V: Clone + Send + Sync,
{
    config.store.expire(key, ttl).await
}

/// A memoized async function.
///
/// Wraps `f` so that repeated calls with equivalent arguments within the
/// ttl window return the previously computed result without re-invoking
/// `f`. The cached value is `f`'s full output, `Result<T, E>`, so under
/// `cache_on_error` a failure replays exactly.
///
/// Only callables matching the expected shape can be wrapped; the bounds on
/// [`CachedFunc::new`] reject anything else at compile time, so there is no
/// per-call shape check.
pub struct CachedFunc<A, T, E, F, Fut>
where
    T: Clone + Send + Sync,
    E: Clone + Send + Sync,
    F: Fn(A) -> Fut + Send + Sync,
    Fut: Future<Output = Result<T, E>> + Send,
{
    f: F,
    config: Config<A, Result<T, E>>,
    ttl: Duration,
    _marker: PhantomData<fn() -> Fut>,
}

impl<A, T, E, F, Fut> CachedFunc<A, T, E, F, Fut>
where
    A: Send + Sync,
    T: Clone + Send + Sync + 'static,
    E: Clone + Send + Sync + 'static,
    F: Fn(A) -> Fut + Send + Sync,
    Fut: Future<Output = Result<T, E>> + Send,
{
    /// Wrap `f` with the given configuration and time-to-live.
    pub fn new(f: F, config: Config<A, Result<T, E>>, ttl: Duration) -> Self {
        CachedFunc {
            f,
            config,
            ttl,
            _marker: PhantomData,
        }
    }

    /// The configuration this callable was wrapped with.
    pub fn config(&self) -> &Config<A, Result<T, E>> {
        &self.config
    }

    /// Invoke the wrapped callable.
    ///
    /// Per-call protocol: derive the key, acquire the lock, consult the
    /// store, invoke `f` on a miss, conditionally write the result back,
    /// release the lock. Lock and store failures are logged and degrade to
    /// recomputation; they never reach the caller, whose entire error
    /// surface is `E`.
    pub async fn call(&self, args: A) -> Result<T, E> {
        let key = self.config.key_gen.key(&args);

        // A failed acquisition forfeits the cache-hit check for this call,
        // not the call itself.
        let locked = match self.config.lock.lock(&key).await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(
                    "lock acquisition failed, recomputing without cache: provider={}, key={}, error={}",
                    self.config.lock.name(),
                    key,
                    e
                );
                false
            }
        };

        if locked {
            match self.config.store.get(&key).await {
                Ok(Some(cached)) => {
                    self.unlock(&key).await;
                    return cached;
                }
                Ok(None) => {}
                Err(e) => {
                    tracing::warn!(
                        "cache read failed, treating as miss: store={}, key={}, error={}",
                        self.config.store.name(),
                        key,
                        e
                    );
                }
            }
        }

        let out = (self.f)(args).await;

        if out.is_ok() || self.config.cache_on_error {
            if let Err(e) = self.config.store.set(&key, out.clone(), self.ttl).await {
                tracing::warn!(
                    "cache write failed, returning computed result: store={}, key={}, error={}",
                    self.config.store.name(),
                    key,
                    e
                );
            }
        }

        self.unlock(&key).await;
        out
    }

    async fn unlock(&self, key: &str) {
        if let Err(e) = self.config.lock.unlock(key).await {
            tracing::warn!(
                "unlock failed: provider={}, key={}, error={}",
                self.config.lock.name(),
                key,
                e
            );
        }
    }
}
