//! Lock provider implementations.

pub mod mutex;
pub mod noop;
pub mod redis;
