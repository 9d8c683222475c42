//! Metrics trait for cache observability

use std::time::Duration;

/// Cache operation for latency tracking
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheOperation {
    Fetch,
    FetchMultiple,
    Save,
    SaveMultiple,
    Delete,
    DeleteMultiple,
    Flush,
    Invalidate,
    Serialize,
    Deserialize,
}

impl CacheOperation {
    /// Get operation as string label
    pub fn as_str(&self) -> &'static str {
        match self {
            CacheOperation::Fetch => "fetch",
            CacheOperation::FetchMultiple => "fetch_multiple",
            CacheOperation::Save => "save",
            CacheOperation::SaveMultiple => "save_multiple",
            CacheOperation::Delete => "delete",
            CacheOperation::DeleteMultiple => "delete_multiple",
            CacheOperation::Flush => "flush",
            CacheOperation::Invalidate => "invalidate",
            CacheOperation::Serialize => "serialize",
            CacheOperation::Deserialize => "deserialize",
        }
    }
}

/// Trait for cache metrics/observability
///
/// Implement this to integrate with your metrics system (Prometheus, StatsD, etc.)
pub trait CacheMetrics: Send + Sync + 'static {
    /// Record a cache hit
    fn record_hit(&self, key: &str);

    /// Record a cache miss
    fn record_miss(&self, key: &str);

    /// Record operation latency
    fn record_latency(&self, operation: CacheOperation, duration: Duration);

    /// Record a write, delete or flush that a backend reported as failed
    fn record_failure(&self, operation: CacheOperation);
}

/// No-op metrics implementation (default)
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopMetrics;

impl CacheMetrics for NoopMetrics {
    #[inline]
    fn record_hit(&self, _key: &str) {}

    #[inline]
    fn record_miss(&self, _key: &str) {}

    #[inline]
    fn record_latency(&self, _operation: CacheOperation, _duration: Duration) {}

    #[inline]
    fn record_failure(&self, _operation: CacheOperation) {}
}

/// Metrics adapter using the `metrics` crate
///
/// # Example
/// ```ignore
/// use chaincache_core::MetricsCrateAdapter;
///
/// let metrics = MetricsCrateAdapter::new("chaincache");
/// // Emits: chaincache_hits_total, chaincache_misses_total, etc.
/// ```
#[cfg(feature = "metrics")]
#[derive(Debug, Clone)]
pub struct MetricsCrateAdapter {
    prefix: String,
}

#[cfg(feature = "metrics")]
impl MetricsCrateAdapter {
    /// Create a new adapter with the given metric name prefix
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    fn metric_name(&self, name: &str) -> String {
        format!("{}_{}", self.prefix, name)
    }
}

#[cfg(feature = "metrics")]
impl CacheMetrics for MetricsCrateAdapter {
    fn record_hit(&self, _key: &str) {
        metrics::counter!(self.metric_name("hits_total")).increment(1);
    }

    fn record_miss(&self, _key: &str) {
        metrics::counter!(self.metric_name("misses_total")).increment(1);
    }

    fn record_latency(&self, operation: CacheOperation, duration: Duration) {
        metrics::histogram!(
            self.metric_name("operation_duration_seconds"),
            "operation" => operation.as_str()
        )
        .record(duration.as_secs_f64());
    }

    fn record_failure(&self, operation: CacheOperation) {
        metrics::counter!(
            self.metric_name("failures_total"),
            "operation" => operation.as_str()
        )
        .increment(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operation_as_str() {
        assert_eq!(CacheOperation::Fetch.as_str(), "fetch");
        assert_eq!(CacheOperation::SaveMultiple.as_str(), "save_multiple");
        assert_eq!(CacheOperation::Invalidate.as_str(), "invalidate");
    }

    #[test]
    fn test_noop_metrics() {
        let metrics = NoopMetrics;
        metrics.record_hit("key");
        metrics.record_miss("key");
        metrics.record_latency(CacheOperation::Fetch, Duration::from_millis(1));
        metrics.record_failure(CacheOperation::Flush);
    }
}
