use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::AsyncCommands;
use std::time::Duration;

use crate::error::CacheError;
use crate::lock::LockProvider;

/// Prefix for lock keys in the backend, keeping them apart from cache
/// entries stored under the bare key.
const LOCK_KEY_PREFIX: &str = "lock_cache_func_";

/// Configuration for RedisLock.
#[derive(Debug, Clone)]
pub struct RedisLockConfig {
    /// Redis connection URL.
    ///
    /// Format: `redis://[username:password@]host[:port][/database]`
    pub url: String,

    /// Lease duration for a held lock.
    ///
    /// The lock auto-expires after this duration if not explicitly released,
    /// bounding the damage from a crashed holder.
    pub lease: Duration,
}

/// Distributed mutual exclusion backed by Redis.
///
/// Acquisition is an atomic `SET NX` with a `PX` lease on
/// `"lock_cache_func_" + key`; it fails if another holder already set the
/// key. Release deletes the key. Unlike [`crate::MutexLock`], contention is
/// per key.
pub struct RedisLock {
    connection: MultiplexedConnection,
    lease: Duration,
}

impl RedisLock {
    /// Create a new RedisLock with the given configuration.
    ///
    /// # Returns
    /// * `Ok(RedisLock)` - Successfully connected lock provider
    /// * `Err(CacheError)` - Connection failed
    pub async fn new(config: RedisLockConfig) -> Result<Self, CacheError> {
        let client = redis::Client::open(config.url.as_str()).map_err(|e| {
            CacheError::lock("", format!("Failed to create Redis client: {}", e))
        })?;

        let connection = client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| CacheError::lock("", format!("Failed to connect to Redis: {}", e)))?;

        Ok(RedisLock {
            connection,
            lease: config.lease,
        })
    }

    /// Create a RedisLock over an existing connection.
    pub fn with_connection(connection: MultiplexedConnection, lease: Duration) -> Self {
        RedisLock { connection, lease }
    }

    fn lock_key(key: &str) -> String {
        format!("{}{}", LOCK_KEY_PREFIX, key)
    }
}

#[async_trait]
impl LockProvider for RedisLock {
    fn name(&self) -> &'static str {
        "redis"
    }

    async fn lock(&self, key: &str) -> Result<(), CacheError> {
        let mut conn = self.connection.clone();
        let lease_ms = u64::try_from(self.lease.as_millis())
            .unwrap_or(u64::MAX)
            .max(1);

        // SET NX PX: atomic set-if-absent with a lease.
        let acquired: Option<String> = redis::cmd("SET")
            .arg(Self::lock_key(key))
            .arg("1")
            .arg("NX")
            .arg("PX")
            .arg(lease_ms)
            .query_async(&mut conn)
            .await
            .map_err(|e| CacheError::lock(key, format!("SET NX failed: {}", e)))?;

        if acquired.is_none() {
            return Err(CacheError::lock(key, "already held by another caller"));
        }

        Ok(())
    }

    async fn unlock(&self, key: &str) -> Result<(), CacheError> {
        let mut conn = self.connection.clone();
        let _: () = conn
            .del(Self::lock_key(key))
            .await
            .map_err(|e| CacheError::lock(key, format!("DEL failed: {}", e)))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lock_key_prefix() {
        assert_eq!(RedisLock::lock_key("23"), "lock_cache_func_23");
    }

    // Note: These tests require a running Redis instance.

    #[tokio::test]
    #[ignore = "requires running Redis instance"]
    async fn test_redis_lock_contention() {
        let config = RedisLockConfig {
            url: "redis://localhost:6379".to_string(),
            lease: Duration::from_secs(5),
        };
        let lock = RedisLock::new(config).await.unwrap();

        let key = format!("contention_{}", crate::utils::now_ms());

        lock.lock(&key).await.unwrap();

        // Second acquisition on the same key must fail while held.
        assert!(lock.lock(&key).await.is_err());

        // A different key is independent.
        let other = format!("{}_other", key);
        lock.lock(&other).await.unwrap();
        lock.unlock(&other).await.unwrap();

        lock.unlock(&key).await.unwrap();

        // Released: acquisition succeeds again.
        lock.lock(&key).await.unwrap();
        lock.unlock(&key).await.unwrap();
    }

    #[tokio::test]
    #[ignore = "requires running Redis instance"]
    async fn test_redis_lock_lease_expires() {
        let config = RedisLockConfig {
            url: "redis://localhost:6379".to_string(),
            lease: Duration::from_millis(200),
        };
        let lock = RedisLock::new(config).await.unwrap();

        let key = format!("lease_{}", crate::utils::now_ms());

        lock.lock(&key).await.unwrap();
        tokio::time::sleep(Duration::from_millis(400)).await;

        // Lease expired without an explicit unlock: acquirable again.
        lock.lock(&key).await.unwrap();
        lock.unlock(&key).await.unwrap();
    }
}
