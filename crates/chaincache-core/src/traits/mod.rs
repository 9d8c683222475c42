//! Core traits for cache operations

mod backend;
mod key;
mod metrics;
mod serializer;
#[cfg(feature = "tracing")]
mod tracing;

pub use backend::CacheBackend;
pub use key::CacheKey;
pub use metrics::{CacheMetrics, CacheOperation, NoopMetrics};
pub use serializer::{JsonSerializer, Serializer};

#[cfg(feature = "metrics")]
pub use metrics::MetricsCrateAdapter;

#[cfg(feature = "tracing")]
pub use self::tracing::TracingMetrics;

#[cfg(feature = "msgpack")]
pub use serializer::MsgPackSerializer;

#[cfg(feature = "bincode")]
pub use serializer::BincodeSerializer;
