use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, RwLock};

use crate::error::CacheError;
use crate::store::{CacheStore, Sweeper};
use crate::utils::now_ms;

/// Internal stored entry with an absolute expiry time.
#[derive(Clone)]
struct StoredEntry<V> {
    value: V,
    expires_at: i64,
}

/// Absolute expiry for a ttl, saturating so an extreme ttl ("cache
/// forever") clamps to the far future instead of wrapping negative.
fn expires_at(ttl: Duration) -> i64 {
    now_ms().saturating_add(i64::try_from(ttl.as_millis()).unwrap_or(i64::MAX))
}

/// Thread-safe in-memory cache store.
///
/// The mapping is guarded by the store's own `RwLock`, independent of any
/// lock provider the wrapper is configured with: the no-op and distributed
/// providers give the map no protection, and the sweeper mutates it from a
/// background task.
///
/// `get` never deletes: an entry whose expiry has passed is reported as a
/// miss and left in place until the sweeper removes it. At most one sweep
/// runs per store; [`CacheStore::periodic_expire`] returns `None` after the
/// first call.
pub struct MemoryStore<V>
where
    V: Clone + Send + Sync,
{
    state: Arc<RwLock<HashMap<String, StoredEntry<V>>>>,
    sweeping: AtomicBool,
}

impl<V> MemoryStore<V>
where
    V: Clone + Send + Sync + 'static,
{
    /// Create a new empty MemoryStore.
    pub fn new() -> Self {
        MemoryStore {
            state: Arc::new(RwLock::new(HashMap::new())),
            sweeping: AtomicBool::new(false),
        }
    }

    /// Create a MemoryStore pre-sized for `capacity` entries.
    pub fn with_capacity(capacity: usize) -> Self {
        MemoryStore {
            state: Arc::new(RwLock::new(HashMap::with_capacity(capacity))),
            sweeping: AtomicBool::new(false),
        }
    }

    /// Number of entries currently held, expired or not.
    pub async fn len(&self) -> usize {
        self.state.read().await.len()
    }

    /// Whether the store currently holds no entries.
    pub async fn is_empty(&self) -> bool {
        self.state.read().await.is_empty()
    }
}

impl<V> Default for MemoryStore<V>
where
    V: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<V> CacheStore<V> for MemoryStore<V>
where
    V: Clone + Send + Sync + 'static,
{
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn get(&self, key: &str) -> Result<Option<V>, CacheError> {
        let state = self.state.read().await;

        let Some(stored) = state.get(key) else {
            return Ok(None);
        };

        // Expired but unswept entries are misses; deletion is the sweeper's job.
        if stored.expires_at <= now_ms() {
            return Ok(None);
        }

        Ok(Some(stored.value.clone()))
    }

    async fn set(&self, key: &str, value: V, ttl: Duration) -> Result<(), CacheError> {
        let mut state = self.state.write().await;
        state.insert(
            key.to_string(),
            StoredEntry {
                value,
                expires_at: expires_at(ttl),
            },
        );
        Ok(())
    }

    async fn expire(&self, key: &str, ttl: Duration) -> Result<(), CacheError> {
        let mut state = self.state.write().await;

        if ttl.is_zero() {
            state.remove(key);
            return Ok(());
        }

        if let Some(stored) = state.get_mut(key) {
            stored.expires_at = expires_at(ttl);
        }
        Ok(())
    }

    fn periodic_expire(&self, interval: Duration) -> Option<Sweeper> {
        // One sweep per store. A store shared by several configurations
        // hands out the sweeper to the first one only.
        if self.sweeping.swap(true, Ordering::SeqCst) {
            return None;
        }

        let state = Arc::clone(&self.state);
        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);

        // Wake at half the interval so an entry outlives its expiry by at
        // most interval/2.
        let period = (interval / 2).max(Duration::from_millis(1));

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            // The first tick of a tokio interval fires immediately.
            ticker.tick().await;

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        let mut state = state.write().await;
                        let now = now_ms();
                        let before = state.len();
                        state.retain(|_, stored| stored.expires_at > now);
                        let removed = before - state.len();
                        if removed > 0 {
                            tracing::debug!("sweeper removed {} expired entries", removed);
                        }
                    }
                    _ = shutdown_rx.changed() => {
                        tracing::debug!("sweeper stopping");
                        break;
                    }
                }
            }
        });

        Some(Sweeper::new(shutdown_tx, handle))
    }
}
