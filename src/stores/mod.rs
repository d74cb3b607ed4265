//! Cache store implementations.

pub mod memory;
pub mod redis;
