//! Core types for cache operations

mod lifetime;
mod slot;
mod stats;

pub use lifetime::{Expiry, Lifetime, MAX_RELATIVE_EXPIRY_SECS};
pub use slot::{FetchMap, ValueSlot};
pub use stats::CacheStats;
