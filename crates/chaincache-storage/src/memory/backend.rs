//! In-memory cache backend using DashMap

use async_trait::async_trait;
use dashmap::DashMap;
use parking_lot::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use chaincache_core::{CacheBackend, CacheStats, FetchMap, Lifetime, Result, ValueSlot};

/// Configuration for the memory backend
#[derive(Debug, Clone)]
pub struct MemoryConfig {
    /// Maximum number of entries (0 = unlimited)
    pub max_capacity: usize,
    /// Maximum bytes of keys plus values; writes beyond it are refused
    pub max_memory_bytes: Option<u64>,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            max_capacity: 10_000,
            max_memory_bytes: None,
        }
    }
}

impl MemoryConfig {
    /// Create config with specific capacity
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            max_capacity: capacity,
            ..Default::default()
        }
    }

    /// Create config with unlimited capacity
    pub fn unlimited() -> Self {
        Self {
            max_capacity: 0,
            max_memory_bytes: None,
        }
    }

    /// Set a memory limit in bytes
    pub fn max_memory(mut self, bytes: u64) -> Self {
        self.max_memory_bytes = Some(bytes);
        self
    }
}

#[derive(Debug, Clone)]
struct Entry {
    value: Vec<u8>,
    expires_at: Option<Instant>,
}

impl Entry {
    fn size(&self, key: &str) -> u64 {
        (key.len() + self.value.len()) as u64
    }

    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|at| now >= at)
    }
}

#[derive(Debug, Default)]
struct Counters {
    hits: u64,
    misses: u64,
}

/// In-memory cache backend
///
/// Expired entries are dropped lazily when touched, or in bulk by
/// [`MemoryBackend::purge_expired`]. Cloning creates a new handle to the
/// SAME underlying store.
#[derive(Clone)]
pub struct MemoryBackend {
    data: Arc<DashMap<String, Entry>>,
    counters: Arc<RwLock<Counters>>,
    /// Running total of key plus value bytes held in `data`
    usage: Arc<AtomicU64>,
    started: Instant,
    config: MemoryConfig,
}

impl MemoryBackend {
    /// Create a new memory backend
    pub fn new(config: MemoryConfig) -> Self {
        Self {
            data: Arc::new(DashMap::with_capacity(config.max_capacity.min(10_000))),
            counters: Arc::new(RwLock::new(Counters::default())),
            usage: Arc::new(AtomicU64::new(0)),
            started: Instant::now(),
            config,
        }
    }

    /// Create with default configuration
    pub fn with_defaults() -> Self {
        Self::new(MemoryConfig::default())
    }

    /// Number of stored entries, expired ones included until purged
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Check if the store is empty
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Drop every expired entry and return how many were removed
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut removed = 0;
        self.data.retain(|key, entry| {
            if entry.is_expired(now) {
                self.release(entry.size(key));
                removed += 1;
                false
            } else {
                true
            }
        });
        removed
    }

    /// Approximate memory usage of keys and values
    pub fn memory_usage(&self) -> u64 {
        self.usage.load(Ordering::Relaxed)
    }

    fn release(&self, bytes: u64) {
        // Never wraps: a racing flush may already have reset the total
        let _ = self
            .usage
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |current| {
                Some(current.saturating_sub(bytes))
            });
    }

    fn remove(&self, key: &str) {
        if let Some((key, entry)) = self.data.remove(key) {
            self.release(entry.size(&key));
        }
    }

    fn clear(&self) {
        self.data.clear();
        self.usage.store(0, Ordering::Relaxed);
    }

    fn lookup(&self, key: &str, now: Instant) -> Option<Vec<u8>> {
        let value = match self.data.get(key) {
            Some(entry) if !entry.is_expired(now) => Some(entry.value.clone()),
            _ => None,
        };

        let mut counters = self.counters.write();
        if value.is_some() {
            counters.hits += 1;
        } else {
            counters.misses += 1;
            drop(counters);
            if let Some((key, entry)) = self.data.remove_if(key, |_, entry| entry.is_expired(now)) {
                self.release(entry.size(&key));
            }
        }
        value
    }

    fn is_live(&self, key: &str, now: Instant) -> bool {
        self.data
            .get(key)
            .is_some_and(|entry| !entry.is_expired(now))
    }

    fn store(&self, key: &str, value: Vec<u8>, lifetime: Lifetime) -> bool {
        let needed = (key.len() + value.len()) as u64;
        if let Some(limit) = self.config.max_memory_bytes {
            let replaced = self.data.get(key).map(|entry| entry.size(key)).unwrap_or(0);
            let projected = self.memory_usage().saturating_sub(replaced).saturating_add(needed);
            if projected > limit {
                return false;
            }
        }

        if !self.data.contains_key(key) {
            self.maybe_evict();
        }

        // A lifetime past the clock's range never expires
        let expires_at = lifetime
            .as_duration()
            .and_then(|ttl| Instant::now().checked_add(ttl));
        self.usage.fetch_add(needed, Ordering::Relaxed);
        if let Some(previous) = self.data.insert(key.to_string(), Entry { value, expires_at }) {
            self.release(previous.size(key));
        }
        true
    }

    /// Make room for one more entry if at capacity
    fn maybe_evict(&self) {
        if self.config.max_capacity == 0 || self.data.len() < self.config.max_capacity {
            return;
        }

        // Expired entries go first; otherwise any entry will do
        if self.purge_expired() > 0 && self.data.len() < self.config.max_capacity {
            return;
        }

        let excess = self.data.len() + 1 - self.config.max_capacity;
        let keys_to_remove: Vec<String> = self
            .data
            .iter()
            .take(excess)
            .map(|entry| entry.key().clone())
            .collect();

        for key in keys_to_remove {
            self.remove(&key);
        }
    }
}

#[async_trait]
impl CacheBackend for MemoryBackend {
    async fn fetch(&self, key: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.lookup(key, Instant::now()))
    }

    async fn contains(&self, key: &str) -> Result<bool> {
        Ok(self.is_live(key, Instant::now()))
    }

    async fn save(&self, key: &str, value: Vec<u8>, lifetime: Lifetime) -> Result<bool> {
        Ok(self.store(key, value, lifetime))
    }

    async fn delete(&self, key: &str) -> Result<bool> {
        self.remove(key);
        Ok(true)
    }

    async fn flush(&self) -> Result<bool> {
        self.clear();
        Ok(true)
    }

    async fn fetch_multiple(&self, keys: &[String]) -> Result<FetchMap> {
        let now = Instant::now();
        let mut found = FetchMap::with_capacity(keys.len());
        for key in keys {
            if let Some(value) = self.lookup(key, now) {
                found.insert(key.clone(), ValueSlot::Found(value));
            }
        }
        Ok(found)
    }

    async fn save_multiple(&self, entries: &[(String, Vec<u8>)], lifetime: Lifetime) -> Result<bool> {
        let mut stored = true;
        for (key, value) in entries {
            stored = self.store(key, value.clone(), lifetime) && stored;
        }
        Ok(stored)
    }

    async fn delete_multiple(&self, keys: &[String]) -> Result<bool> {
        for key in keys {
            self.remove(key);
        }
        Ok(true)
    }

    async fn stats(&self) -> Result<Option<CacheStats>> {
        let counters = self.counters.read();
        let memory_usage = self.memory_usage();
        Ok(Some(CacheStats {
            hits: counters.hits,
            misses: counters.misses,
            uptime_secs: self.started.elapsed().as_secs(),
            memory_usage,
            memory_available: self
                .config
                .max_memory_bytes
                .map(|limit| limit.saturating_sub(memory_usage)),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn keys(ks: &[&str]) -> Vec<String> {
        ks.iter().map(|k| k.to_string()).collect()
    }

    #[tokio::test]
    async fn test_basic_save_fetch() {
        let backend = MemoryBackend::new(MemoryConfig::default());

        assert!(backend
            .save("key1", b"value1".to_vec(), Lifetime::from_secs(60))
            .await
            .unwrap());

        let result = backend.fetch("key1").await.unwrap();
        assert_eq!(result, Some(b"value1".to_vec()));
    }

    #[tokio::test]
    async fn test_fetch_nonexistent() {
        let backend = MemoryBackend::with_defaults();
        assert_eq!(backend.fetch("nonexistent").await.unwrap(), None);
        assert!(!backend.contains("nonexistent").await.unwrap());
    }

    #[tokio::test]
    async fn test_empty_value_is_a_hit() {
        let backend = MemoryBackend::with_defaults();
        backend.save("empty", Vec::new(), Lifetime::FOREVER).await.unwrap();

        assert_eq!(backend.fetch("empty").await.unwrap(), Some(Vec::new()));
        assert!(backend.contains("empty").await.unwrap());
    }

    #[tokio::test]
    async fn test_delete() {
        let backend = MemoryBackend::with_defaults();
        backend.save("key1", b"value1".to_vec(), Lifetime::FOREVER).await.unwrap();
        assert!(backend.contains("key1").await.unwrap());

        assert!(backend.delete("key1").await.unwrap());
        assert!(!backend.contains("key1").await.unwrap());

        // Deleting a missing key is not a failure
        assert!(backend.delete("key1").await.unwrap());
    }

    #[tokio::test]
    async fn test_flush() {
        let backend = MemoryBackend::with_defaults();
        backend.save("key1", b"value1".to_vec(), Lifetime::FOREVER).await.unwrap();
        backend.save("key2", b"value2".to_vec(), Lifetime::FOREVER).await.unwrap();
        assert_eq!(backend.len(), 2);

        assert!(backend.flush().await.unwrap());
        assert!(backend.is_empty());
    }

    #[tokio::test]
    async fn test_expiry() {
        let backend = MemoryBackend::with_defaults();
        backend.save("short", b"v".to_vec(), Lifetime::from_secs(1)).await.unwrap();
        backend.save("forever", b"v".to_vec(), Lifetime::FOREVER).await.unwrap();

        let later = Instant::now() + Duration::from_secs(2);
        assert!(!backend.is_live("short", later));
        assert!(backend.is_live("forever", later));

        assert_eq!(backend.lookup("short", later), None);
        // Expired entry is dropped once touched
        assert_eq!(backend.len(), 1);
    }

    #[tokio::test]
    async fn test_purge_expired() {
        let backend = MemoryBackend::with_defaults();
        backend.save("gone", b"v".to_vec(), Lifetime::from_secs(1)).await.unwrap();
        backend.save("kept", b"v".to_vec(), Lifetime::FOREVER).await.unwrap();

        tokio::time::sleep(Duration::from_millis(1100)).await;

        assert_eq!(backend.purge_expired(), 1);
        assert!(backend.contains("kept").await.unwrap());
    }

    #[tokio::test]
    async fn test_stats() {
        let backend = MemoryBackend::new(MemoryConfig::default().max_memory(1024));
        backend.save("key1", b"value1".to_vec(), Lifetime::FOREVER).await.unwrap();
        backend.fetch("key1").await.unwrap();
        backend.fetch("nonexistent").await.unwrap();

        let stats = backend.stats().await.unwrap().unwrap();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.memory_usage, 10);
        assert_eq!(stats.memory_available, Some(1014));
    }

    #[tokio::test]
    async fn test_capacity_eviction() {
        let backend = MemoryBackend::new(MemoryConfig::with_capacity(2));

        for key in ["key1", "key2", "key3"] {
            assert!(backend.save(key, b"v".to_vec(), Lifetime::FOREVER).await.unwrap());
        }

        assert_eq!(backend.len(), 2);
        assert!(backend.contains("key3").await.unwrap());
    }

    #[tokio::test]
    async fn test_memory_limit_refuses_write() {
        let backend = MemoryBackend::new(MemoryConfig::unlimited().max_memory(16));

        assert!(backend.save("a", vec![0; 10], Lifetime::FOREVER).await.unwrap());
        assert!(!backend.save("b", vec![0; 10], Lifetime::FOREVER).await.unwrap());
        // Replacing an entry only counts the difference
        assert!(backend.save("a", vec![0; 12], Lifetime::FOREVER).await.unwrap());
        assert!(!backend.contains("b").await.unwrap());
    }

    #[tokio::test]
    async fn test_lifetime_beyond_clock_range_never_expires() {
        let backend = MemoryBackend::with_defaults();

        assert!(backend
            .save("huge", b"v".to_vec(), Lifetime::from_secs(u64::MAX))
            .await
            .unwrap());
        assert_eq!(backend.fetch("huge").await.unwrap(), Some(b"v".to_vec()));
        assert!(backend.is_live("huge", Instant::now() + Duration::from_secs(3600)));
    }

    #[tokio::test]
    async fn test_memory_usage_tracks_writes_and_removals() {
        let backend = MemoryBackend::new(MemoryConfig::unlimited().max_memory(64));

        backend.save("a", vec![0; 10], Lifetime::FOREVER).await.unwrap();
        backend.save("bb", vec![0; 4], Lifetime::FOREVER).await.unwrap();
        assert_eq!(backend.memory_usage(), 17);

        // Replacing swaps the old size for the new one
        backend.save("a", vec![0; 2], Lifetime::FOREVER).await.unwrap();
        assert_eq!(backend.memory_usage(), 9);

        backend.delete("bb").await.unwrap();
        backend.delete("bb").await.unwrap();
        assert_eq!(backend.memory_usage(), 3);

        backend.save("gone", vec![0; 4], Lifetime::from_secs(1)).await.unwrap();
        let later = Instant::now() + Duration::from_secs(2);
        assert_eq!(backend.lookup("gone", later), None);
        assert_eq!(backend.memory_usage(), 3);

        backend.flush().await.unwrap();
        assert_eq!(backend.memory_usage(), 0);

        // A write after a flush is measured from zero, not from a stale total
        assert!(backend.save("c", vec![0; 63], Lifetime::FOREVER).await.unwrap());
        let stats = backend.stats().await.unwrap().unwrap();
        assert_eq!(stats.memory_usage, 64);
        assert_eq!(stats.memory_available, Some(0));
    }

    #[tokio::test]
    async fn test_fetch_multiple() {
        let backend = MemoryBackend::with_defaults();
        backend.save("key1", b"value1".to_vec(), Lifetime::FOREVER).await.unwrap();
        backend.save("key2", Vec::new(), Lifetime::FOREVER).await.unwrap();

        let results = backend
            .fetch_multiple(&keys(&["key1", "key2", "key3"]))
            .await
            .unwrap();

        assert_eq!(results.len(), 2);
        assert_eq!(results.get("key1"), Some(&ValueSlot::Found(b"value1".to_vec())));
        assert_eq!(results.get("key2"), Some(&ValueSlot::Found(Vec::new())));
        assert!(!results.contains_key("key3"));
    }

    #[tokio::test]
    async fn test_save_and_delete_multiple() {
        let backend = MemoryBackend::with_defaults();
        let entries = vec![
            ("a".to_string(), b"1".to_vec()),
            ("b".to_string(), b"2".to_vec()),
        ];

        assert!(backend.save_multiple(&entries, Lifetime::FOREVER).await.unwrap());
        assert_eq!(backend.len(), 2);

        assert!(backend.delete_multiple(&keys(&["a", "b", "c"])).await.unwrap());
        assert!(backend.is_empty());
    }

    #[tokio::test]
    async fn test_clone_shares_store() {
        let backend = MemoryBackend::with_defaults();
        let handle = backend.clone();

        backend.save("key", b"v".to_vec(), Lifetime::FOREVER).await.unwrap();
        assert!(handle.contains("key").await.unwrap());
    }
}
