use async_trait::async_trait;

use crate::error::CacheError;

/// A lock provider guards the wrapper's check-then-act sequence: consult the
/// store, invoke on a miss, populate the store.
///
/// Acquisition failure is never fatal to a call. The wrapper treats a failed
/// `lock` as "proceed without the cache-hit check" and recomputes, trading
/// cache efficiency for availability.
#[async_trait]
pub trait LockProvider: Send + Sync {
    /// A name for tracing.
    ///
    /// # Example
    /// - "noop"
    /// - "mutex"
    /// - "redis"
    fn name(&self) -> &'static str;

    /// Acquire the lock for `key`.
    ///
    /// An error means the lock could not be acquired (contention or backend
    /// failure); the caller proceeds without cache-hit checking.
    async fn lock(&self, key: &str) -> Result<(), CacheError>;

    /// Release the lock for `key`.
    async fn unlock(&self, key: &str) -> Result<(), CacheError>;
}
