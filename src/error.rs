/// Error type for store and lock operations.
///
/// These errors never reach the caller of a wrapped function: the wrapper
/// logs them and falls back to recomputation (see [`crate::CachedFunc`]).
/// They surface directly only from the manual [`crate::expire`] operation
/// and from store/lock constructors.
#[derive(Debug, Clone, thiserror::Error)]
pub enum CacheError {
    /// A store operation failed.
    #[error("[{store}] store error for key '{key}': {message}")]
    Store {
        store: String,
        key: String,
        message: String,
    },
    /// Lock acquisition or release failed (contention or backend failure).
    #[error("lock error for key '{key}': {message}")]
    Lock { key: String, message: String },
    /// Serialization, deserialization or type reconstruction failed.
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl CacheError {
    /// Create a new store error.
    pub fn store(
        store: impl Into<String>,
        key: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        CacheError::Store {
            store: store.into(),
            key: key.into(),
            message: message.into(),
        }
    }

    /// Create a new lock error.
    pub fn lock(key: impl Into<String>, message: impl Into<String>) -> Self {
        CacheError::Lock {
            key: key.into(),
            message: message.into(),
        }
    }
}
