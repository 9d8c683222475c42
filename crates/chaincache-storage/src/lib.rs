//! chaincache-storage: Storage backends and the tier chain for chaincache

pub mod chain;

#[cfg(feature = "memory")]
pub mod memory;

#[cfg(feature = "redis")]
pub mod redis;

pub use chain::{BroadcastReport, ChainCache, Tier};

#[cfg(feature = "memory")]
pub use memory::{MemoryBackend, MemoryConfig};

#[cfg(feature = "redis")]
pub use redis::{RedisBackend, RedisConfig};
