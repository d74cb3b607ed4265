use async_trait::async_trait;

use crate::error::CacheError;
use crate::lock::LockProvider;

/// Lock provider that never locks.
///
/// Use when duplicate computation under concurrent misses is acceptable:
/// two callers racing on the same key may both invoke the underlying
/// function, and the later write wins.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopLock;

impl NoopLock {
    pub fn new() -> Self {
        NoopLock
    }
}

#[async_trait]
impl LockProvider for NoopLock {
    fn name(&self) -> &'static str {
        "noop"
    }

    async fn lock(&self, _key: &str) -> Result<(), CacheError> {
        Ok(())
    }

    async fn unlock(&self, _key: &str) -> Result<(), CacheError> {
        Ok(())
    }
}
