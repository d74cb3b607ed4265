use async_trait::async_trait;
use tokio::sync::Semaphore;

use crate::error::CacheError;
use crate::lock::LockProvider;

/// Process-local mutual exclusion.
///
/// A single exclusive lock shared across ALL keys of a configuration, not a
/// per-key lock: every cached call made through one configuration is
/// serialized, and unrelated keys contend with each other. This trades
/// concurrency for simplicity. Callers needing per-key concurrency should
/// use [`crate::RedisLock`] or a custom provider.
///
/// Backed by a single-permit semaphore so the permit can be released from a
/// different task than the one that acquired it.
pub struct MutexLock {
    permits: Semaphore,
}

impl MutexLock {
    pub fn new() -> Self {
        MutexLock {
            permits: Semaphore::new(1),
        }
    }
}

impl Default for MutexLock {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LockProvider for MutexLock {
    fn name(&self) -> &'static str {
        "mutex"
    }

    async fn lock(&self, key: &str) -> Result<(), CacheError> {
        let permit = self
            .permits
            .acquire()
            .await
            .map_err(|e| CacheError::lock(key, format!("semaphore closed: {}", e)))?;
        permit.forget();
        Ok(())
    }

    async fn unlock(&self, _key: &str) -> Result<(), CacheError> {
        self.permits.add_permits(1);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_lock_unlock_roundtrip() {
        let lock = MutexLock::new();
        lock.lock("key1").await.unwrap();
        lock.unlock("key1").await.unwrap();
        lock.lock("key2").await.unwrap();
        lock.unlock("key2").await.unwrap();
    }

    #[tokio::test]
    async fn test_lock_is_global_across_keys() {
        let lock = Arc::new(MutexLock::new());
        lock.lock("key1").await.unwrap();

        // A second acquisition, even for a different key, must block until
        // the first is released.
        let entered = Arc::new(AtomicUsize::new(0));
        let lock_clone = lock.clone();
        let entered_clone = entered.clone();
        let waiter = tokio::spawn(async move {
            lock_clone.lock("key2").await.unwrap();
            entered_clone.fetch_add(1, Ordering::SeqCst);
            lock_clone.unlock("key2").await.unwrap();
        });

        tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;
        assert_eq!(entered.load(Ordering::SeqCst), 0);

        lock.unlock("key1").await.unwrap();
        waiter.await.unwrap();
        assert_eq!(entered.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_serializes_concurrent_holders() {
        let lock = Arc::new(MutexLock::new());
        let in_section = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::new();
        for _ in 0..8 {
            let lock = lock.clone();
            let in_section = in_section.clone();
            handles.push(tokio::spawn(async move {
                lock.lock("k").await.unwrap();
                assert_eq!(in_section.fetch_add(1, Ordering::SeqCst), 0);
                tokio::time::sleep(tokio::time::Duration::from_millis(5)).await;
                in_section.fetch_sub(1, Ordering::SeqCst);
                lock.unlock("k").await.unwrap();
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }
    }
}
