//! chaincache-core: Core traits and types for the chaincache library
//!
//! This crate provides the backend capability contract, the batch bridge
//! every backend inherits, and the namespace/versioning layer that turns raw
//! keys into collision-free composite keys.

pub mod bridge;
mod error;
mod namespace;
mod provider;
mod traits;
mod types;

#[cfg(test)]
mod testing;

pub use error::{CacheError, Result};
pub use namespace::{Namespace, DEFAULT_VERSION, NAMESPACE_CACHE_KEY};
pub use provider::CacheProvider;
pub use traits::*;
pub use types::*;
