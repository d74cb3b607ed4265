//! encache - transparent async function memoization for Rust
//!
//! This library wraps an async function in a caching layer with:
//! - Pluggable storage (in-memory with ttl, or Redis)
//! - Pluggable mutual exclusion (no-op, process-local, or distributed)
//! - Pluggable key derivation from the argument tuple
//! - A policy for whether failed invocations are cached
//!
//! Caching is strictly a performance side-channel: the wrapped callable
//! returns exactly what the underlying function returns, and store or lock
//! failures degrade to recomputation instead of surfacing.
//!
//! # Example
//!
//! ```ignore
//! use encache::{CachedFunc, Config, DefaultKeyGenerator, MemoryStore, NoopLock};
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() {
//!     let add = |(a, b): (i32, i32)| async move { Ok::<i32, String>(a + b) };
//!
//!     let config = Config::new(
//!         Arc::new(NoopLock::new()),
//!         Arc::new(MemoryStore::new()),
//!         Arc::new(DefaultKeyGenerator::new()),
//!         false,
//!         Duration::from_secs(5),
//!     );
//!     let cached_add = CachedFunc::new(add, config, Duration::from_secs(5));
//!
//!     println!("{:?}", cached_add.call((2, 3)).await); // Ok(5)
//!     println!("{:?}", cached_add.call((2, 3)).await); // Ok(5) (cached)
//!     println!("{:?}", cached_add.call((4, 5)).await); // Ok(9)
//! }
//! ```

mod error;
mod func;
mod key;
mod lock;
pub mod locks;
mod store;
pub mod stores;
mod utils;

// Re-export public API
pub use error::CacheError;
pub use func::{expire, CachedFunc, Config};
pub use key::{DefaultKeyGenerator, DelimitedKeyGenerator, KeyGenerator, KeyParts};
pub use lock::LockProvider;
pub use locks::mutex::MutexLock;
pub use locks::noop::NoopLock;
pub use locks::redis::{RedisLock, RedisLockConfig};
pub use store::{CacheStore, Sweeper};
pub use stores::memory::MemoryStore;
pub use stores::redis::{RedisStore, RedisStoreConfig};
