//! High-level cache manager

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use chaincache_core::{
    CacheBackend, CacheKey, CacheMetrics, CacheOperation, CacheProvider, CacheStats,
    JsonSerializer, Lifetime, NoopMetrics, Result, Serializer, ValueSlot,
};

/// Configuration for CacheManager
#[derive(Debug, Clone)]
pub struct CacheManagerConfig {
    /// Namespace for all keys; `None` uses the empty namespace
    pub namespace: Option<String>,
    /// Lifetime used when a write passes no lifetime
    pub default_lifetime: Lifetime,
}

impl Default for CacheManagerConfig {
    fn default() -> Self {
        Self {
            namespace: None,
            default_lifetime: Lifetime::from_secs(300),
        }
    }
}

impl CacheManagerConfig {
    /// Create config with a specific default lifetime
    pub fn with_lifetime(lifetime: impl Into<Lifetime>) -> Self {
        Self {
            default_lifetime: lifetime.into(),
            ..Default::default()
        }
    }

    /// Create config with namespace
    pub fn with_namespace(namespace: impl Into<String>) -> Self {
        Self {
            namespace: Some(namespace.into()),
            ..Default::default()
        }
    }

    /// Keep entries without an explicit lifetime forever
    pub fn no_default_lifetime(mut self) -> Self {
        self.default_lifetime = Lifetime::FOREVER;
        self
    }
}

/// High-level cache manager with pluggable serialization and metrics
///
/// Generic over:
/// - `B`: The cache backend (Memory, Redis, a `ChainCache` of tiers)
/// - `S`: The serializer (JSON, MessagePack, Bincode)
/// - `M`: The metrics collector
///
/// Keys are namespaced through the wrapped [`CacheProvider`].
pub struct CacheManager<B, S = JsonSerializer, M = NoopMetrics>
where
    B: CacheBackend,
    S: Serializer,
    M: CacheMetrics,
{
    provider: CacheProvider<B>,
    serializer: Arc<S>,
    metrics: Arc<M>,
    config: CacheManagerConfig,
}

// Constructors for default serializer/metrics
impl<B: CacheBackend> CacheManager<B, JsonSerializer, NoopMetrics> {
    /// Create a new CacheManager with default JSON serializer and no metrics
    pub fn new(backend: B) -> Self {
        Self::with_config(backend, CacheManagerConfig::default())
    }

    /// Create with custom config
    pub fn with_config(backend: B, config: CacheManagerConfig) -> Self {
        Self::with_serializer_and_metrics(backend, JsonSerializer, NoopMetrics, config)
    }
}

impl<B, S, M> CacheManager<B, S, M>
where
    B: CacheBackend,
    S: Serializer,
    M: CacheMetrics,
{
    /// Create a CacheManager with custom serializer and metrics
    pub fn with_serializer_and_metrics(
        backend: B,
        serializer: S,
        metrics: M,
        config: CacheManagerConfig,
    ) -> Self {
        let provider = match &config.namespace {
            Some(namespace) => CacheProvider::with_namespace(backend, namespace.clone()),
            None => CacheProvider::new(backend),
        };

        Self {
            provider,
            serializer: Arc::new(serializer),
            metrics: Arc::new(metrics),
            config,
        }
    }

    /// The namespaced provider underneath
    pub fn provider(&self) -> &CacheProvider<B> {
        &self.provider
    }

    /// Manager configuration
    pub fn config(&self) -> &CacheManagerConfig {
        &self.config
    }

    /// Current namespace
    pub fn namespace(&self) -> &str {
        self.provider.namespace()
    }

    /// Switch namespace
    pub fn set_namespace(&mut self, namespace: impl Into<String>) {
        let namespace = namespace.into();
        self.config.namespace = Some(namespace.clone());
        self.provider.set_namespace(namespace);
    }

    /// Lifetime a write will actually use
    ///
    /// `None` takes the configured default; an explicit
    /// [`Lifetime::FOREVER`] is kept as is.
    pub fn effective_lifetime(&self, lifetime: Option<Lifetime>) -> Lifetime {
        lifetime.unwrap_or(self.config.default_lifetime)
    }

    /// Get a value from cache
    pub async fn get<T>(&self, key: impl CacheKey) -> Result<Option<T>>
    where
        T: serde::de::DeserializeOwned,
    {
        let key = key.cache_key();
        let start = Instant::now();
        let bytes = self.provider.fetch(&key).await?;
        self.metrics
            .record_latency(CacheOperation::Fetch, start.elapsed());

        match bytes {
            Some(bytes) => {
                self.metrics.record_hit(&key);
                self.decode(&bytes).map(Some)
            }
            None => {
                self.metrics.record_miss(&key);
                Ok(None)
            }
        }
    }

    /// Get several values at once
    ///
    /// Every requested key is present in the result, with `None` for keys
    /// that were not found.
    pub async fn get_many<T, K>(&self, keys: &[K]) -> Result<HashMap<String, Option<T>>>
    where
        T: serde::de::DeserializeOwned,
        K: CacheKey,
    {
        let keys: Vec<String> = keys.iter().map(CacheKey::cache_key).collect();
        let start = Instant::now();
        let mut items = self.provider.fetch_multiple(&keys).await?;
        self.metrics
            .record_latency(CacheOperation::FetchMultiple, start.elapsed());

        let mut values = HashMap::with_capacity(keys.len());
        for key in keys {
            if values.contains_key(&key) {
                continue;
            }

            let value = match items.remove(&key) {
                Some(ValueSlot::Found(bytes)) => {
                    self.metrics.record_hit(&key);
                    Some(self.decode(&bytes)?)
                }
                Some(ValueSlot::NotFound) | None => {
                    self.metrics.record_miss(&key);
                    None
                }
            };
            values.insert(key, value);
        }
        Ok(values)
    }

    /// Set a value in cache
    ///
    /// `None` uses the configured default lifetime.
    pub async fn set<T>(
        &self,
        key: impl CacheKey,
        value: &T,
        lifetime: Option<Lifetime>,
    ) -> Result<bool>
    where
        T: serde::Serialize,
    {
        let bytes = self.encode(value)?;

        let start = Instant::now();
        let saved = self
            .provider
            .save(&key.cache_key(), bytes, self.effective_lifetime(lifetime))
            .await?;
        self.metrics
            .record_latency(CacheOperation::Save, start.elapsed());

        if !saved {
            self.metrics.record_failure(CacheOperation::Save);
        }
        Ok(saved)
    }

    /// Set several values with a shared lifetime
    ///
    /// An empty batch stores nothing and reports `false`.
    pub async fn set_many<K, T>(
        &self,
        entries: &[(K, T)],
        lifetime: Option<Lifetime>,
    ) -> Result<bool>
    where
        K: CacheKey,
        T: serde::Serialize,
    {
        let mut data = Vec::with_capacity(entries.len());
        for (key, value) in entries {
            data.push((key.cache_key(), self.encode(value)?));
        }

        let start = Instant::now();
        let saved = self
            .provider
            .save_multiple(data, self.effective_lifetime(lifetime))
            .await?;
        self.metrics
            .record_latency(CacheOperation::SaveMultiple, start.elapsed());

        if !saved {
            self.metrics.record_failure(CacheOperation::SaveMultiple);
        }
        Ok(saved)
    }

    /// Delete a key from cache
    pub async fn delete(&self, key: impl CacheKey) -> Result<bool> {
        let start = Instant::now();
        let deleted = self.provider.delete(&key.cache_key()).await?;
        self.metrics
            .record_latency(CacheOperation::Delete, start.elapsed());
        Ok(deleted)
    }

    /// Delete several keys
    pub async fn delete_many<K: CacheKey>(&self, keys: &[K]) -> Result<bool> {
        let keys: Vec<String> = keys.iter().map(CacheKey::cache_key).collect();
        let start = Instant::now();
        let deleted = self.provider.delete_multiple(&keys).await?;
        self.metrics
            .record_latency(CacheOperation::DeleteMultiple, start.elapsed());
        Ok(deleted)
    }

    /// Check if key exists in cache
    pub async fn contains(&self, key: impl CacheKey) -> Result<bool> {
        self.provider.contains(&key.cache_key()).await
    }

    /// Drop every entry of the current namespace
    ///
    /// Other namespaces sharing the backend are untouched.
    pub async fn invalidate_all(&self) -> Result<bool> {
        let start = Instant::now();
        let invalidated = self.provider.delete_all().await?;
        self.metrics
            .record_latency(CacheOperation::Invalidate, start.elapsed());

        if !invalidated {
            self.metrics.record_failure(CacheOperation::Invalidate);
        }
        Ok(invalidated)
    }

    /// Clear the whole backend, every namespace included
    pub async fn flush(&self) -> Result<bool> {
        let start = Instant::now();
        let flushed = self.provider.flush().await?;
        self.metrics
            .record_latency(CacheOperation::Flush, start.elapsed());
        Ok(flushed)
    }

    /// Get cache statistics
    pub async fn stats(&self) -> Result<Option<CacheStats>> {
        self.provider.stats().await
    }

    fn encode<T: serde::Serialize>(&self, value: &T) -> Result<Vec<u8>> {
        let start = Instant::now();
        let bytes = self.serializer.serialize(value).inspect_err(|_| {
            self.metrics.record_failure(CacheOperation::Serialize);
        })?;
        self.metrics
            .record_latency(CacheOperation::Serialize, start.elapsed());
        Ok(bytes)
    }

    fn decode<T: serde::de::DeserializeOwned>(&self, bytes: &[u8]) -> Result<T> {
        let start = Instant::now();
        let value = self.serializer.deserialize(bytes).inspect_err(|_| {
            self.metrics.record_failure(CacheOperation::Deserialize);
        })?;
        self.metrics
            .record_latency(CacheOperation::Deserialize, start.elapsed());
        Ok(value)
    }
}

impl<B, S, M> Clone for CacheManager<B, S, M>
where
    B: CacheBackend + Clone,
    S: Serializer,
    M: CacheMetrics,
{
    fn clone(&self) -> Self {
        Self {
            provider: self.provider.clone(),
            serializer: self.serializer.clone(),
            metrics: self.metrics.clone(),
            config: self.config.clone(),
        }
    }
}
