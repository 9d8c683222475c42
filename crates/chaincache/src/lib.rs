//! chaincache: namespaced, versioned, multi-tier caching for Rust
//!
//! # Features
//!
//! - **Namespaces** with O(1) invalidation through a stored version counter
//! - **Tier chains**: read the fastest tier first, backfill on slower hits,
//!   write through every tier
//! - **Pluggable serialization** (JSON, MessagePack, Bincode)
//! - **Metrics integration** (`metrics` crate or `tracing`)
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use chaincache::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
//!     let chain = ChainCache::empty()
//!         .with_tier(MemoryBackend::new(MemoryConfig::with_capacity(1_000)))
//!         .with_tier(MemoryBackend::new(MemoryConfig::unlimited()));
//!     let cache = CacheManager::with_config(chain, CacheManagerConfig::with_namespace("users"));
//!
//!     cache.set("42", &"alice".to_string(), Some(Lifetime::from_secs(60))).await?;
//!
//!     match cache.get::<String>("42").await? {
//!         Some(name) => println!("Got: {}", name),
//!         None => println!("Cache miss"),
//!     }
//!
//!     // Every entry of "users" becomes unreachable at once
//!     cache.invalidate_all().await?;
//!     Ok(())
//! }
//! ```

mod manager;

// Re-export core
pub use chaincache_core::*;

// Re-export storage
pub use chaincache_storage::{BroadcastReport, ChainCache, Tier};

#[cfg(feature = "memory")]
pub use chaincache_storage::{MemoryBackend, MemoryConfig};

#[cfg(feature = "redis")]
pub use chaincache_storage::{RedisBackend, RedisConfig};

// Export manager
pub use manager::{CacheManager, CacheManagerConfig};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::{
        CacheBackend, CacheError, CacheKey, CacheManager, CacheManagerConfig, CacheProvider,
        ChainCache, JsonSerializer, Lifetime, Result, Serializer, ValueSlot,
    };

    #[cfg(feature = "memory")]
    pub use crate::{MemoryBackend, MemoryConfig};

    #[cfg(feature = "redis")]
    pub use crate::{RedisBackend, RedisConfig};

    #[cfg(feature = "msgpack")]
    pub use crate::MsgPackSerializer;

    #[cfg(feature = "bincode")]
    pub use crate::BincodeSerializer;
}
