//! Namespaced front-end over a backend

use crate::{CacheBackend, CacheStats, FetchMap, Lifetime, Namespace, Result};

/// Namespaced view of a backend
///
/// Callers use raw keys; the provider turns them into composite keys
/// (`<namespace>[<key>][<version>]`) before they reach the backend. The
/// namespace version is read from the backend on first use and then kept
/// for the lifetime of the provider.
///
/// # Example
/// ```ignore
/// let mut users = CacheProvider::new(backend);
/// users.set_namespace("users");
/// users.save("42", b"alice".to_vec(), Lifetime::from_secs(60)).await?;
/// assert_eq!(users.fetch("42").await?, Some(b"alice".to_vec()));
/// ```
#[derive(Debug, Clone)]
pub struct CacheProvider<B> {
    backend: B,
    namespace: Namespace,
}

impl<B: CacheBackend> CacheProvider<B> {
    /// Create a provider in the empty namespace
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            namespace: Namespace::default(),
        }
    }

    /// Create a provider in the given namespace
    pub fn with_namespace(backend: B, namespace: impl Into<String>) -> Self {
        let mut provider = Self::new(backend);
        provider.set_namespace(namespace);
        provider
    }

    /// Current namespace name
    pub fn namespace(&self) -> &str {
        self.namespace.name()
    }

    /// Switch namespace; the version is resolved again on next use
    pub fn set_namespace(&mut self, namespace: impl Into<String>) {
        let namespace = namespace.into();
        self.backend.on_namespace(&namespace);
        self.namespace.set_name(namespace);
    }

    /// The wrapped backend
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// The wrapped backend, mutably
    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    /// Unwrap the backend
    pub fn into_inner(self) -> B {
        self.backend
    }

    /// Namespace version, read from the backend on first call
    pub async fn version(&self) -> Result<u64> {
        if let Some(version) = self.namespace.cached_version() {
            return Ok(version);
        }

        let stored = self.backend.fetch(&self.namespace.version_key()).await?;
        let version = Namespace::parse_version(stored.as_deref());
        self.namespace.remember(version);
        Ok(version)
    }

    /// Forget the resolved version; the next access reads it from the backend
    pub fn reload_version(&self) {
        self.namespace.invalidate();
    }

    /// Composite key for a raw key
    pub async fn composite(&self, key: &str) -> Result<String> {
        let version = self.version().await?;
        Ok(self.namespace.composite(key, version))
    }

    /// Composite keys for a batch, all at the same version
    pub async fn composite_batch<K>(&self, keys: &[K]) -> Result<Vec<String>>
    where
        K: AsRef<str> + Sync,
    {
        let version = self.version().await?;
        Ok(keys
            .iter()
            .map(|key| self.namespace.composite(key.as_ref(), version))
            .collect())
    }

    /// Fetch a value
    pub async fn fetch(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let id = self.composite(key).await?;
        self.backend.fetch(&id).await
    }

    /// Check if a key exists
    pub async fn contains(&self, key: &str) -> Result<bool> {
        let id = self.composite(key).await?;
        self.backend.contains(&id).await
    }

    /// Store a value
    pub async fn save(&self, key: &str, value: Vec<u8>, lifetime: Lifetime) -> Result<bool> {
        let id = self.composite(key).await?;
        self.backend.save(&id, value, lifetime).await
    }

    /// Delete a key
    pub async fn delete(&self, key: &str) -> Result<bool> {
        let id = self.composite(key).await?;
        self.backend.delete(&id).await
    }

    /// Fetch several keys, keyed back by the raw keys
    ///
    /// Only keys present in the backend's answer appear in the result. A
    /// found empty value is kept; a chain's `NotFound` markers pass through.
    pub async fn fetch_multiple<K>(&self, keys: &[K]) -> Result<FetchMap>
    where
        K: AsRef<str> + Sync,
    {
        if keys.is_empty() {
            return Ok(FetchMap::new());
        }

        let ids = self.composite_batch(keys).await?;
        let mut cached = self.backend.fetch_multiple(&ids).await?;

        let mut items = FetchMap::with_capacity(cached.len());
        for (key, id) in keys.iter().zip(&ids) {
            if let Some(slot) = cached.remove(id) {
                items.insert(key.as_ref().to_string(), slot);
            }
        }
        Ok(items)
    }

    /// Store several entries
    ///
    /// An empty batch stores nothing and reports `false`.
    pub async fn save_multiple(&self, data: Vec<(String, Vec<u8>)>, lifetime: Lifetime) -> Result<bool> {
        if data.is_empty() {
            return Ok(false);
        }

        let version = self.version().await?;
        let entries: Vec<(String, Vec<u8>)> = data
            .into_iter()
            .map(|(key, value)| (self.namespace.composite(&key, version), value))
            .collect();
        self.backend.save_multiple(&entries, lifetime).await
    }

    /// Delete several keys
    pub async fn delete_multiple<K>(&self, keys: &[K]) -> Result<bool>
    where
        K: AsRef<str> + Sync,
    {
        let ids = self.composite_batch(keys).await?;
        self.backend.delete_multiple(&ids).await
    }

    /// Flush the whole backend, every namespace included
    pub async fn flush(&self) -> Result<bool> {
        self.backend.flush().await
    }

    /// Invalidate every entry of the current namespace
    ///
    /// Bumps the stored version counter so existing composite keys become
    /// unreachable; the old entries are left to the backend's own expiry.
    pub async fn delete_all(&self) -> Result<bool> {
        let next = self.version().await? + 1;
        let saved = self
            .backend
            .save(
                &self.namespace.version_key(),
                Namespace::encode_version(next),
                Lifetime::FOREVER,
            )
            .await?;

        if saved {
            self.namespace.remember(next);
        }
        Ok(saved)
    }

    /// Backend statistics
    pub async fn stats(&self) -> Result<Option<CacheStats>> {
        self.backend.stats().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{keys, MapBackend};
    use crate::ValueSlot;

    fn provider(ns: &str) -> (MapBackend, CacheProvider<MapBackend>) {
        let backend = MapBackend::default();
        (backend.clone(), CacheProvider::with_namespace(backend, ns))
    }

    #[tokio::test]
    async fn test_save_then_fetch() {
        let (backend, cache) = provider("app");

        assert!(cache.save("k", b"v".to_vec(), Lifetime::FOREVER).await.unwrap());
        assert_eq!(cache.fetch("k").await.unwrap(), Some(b"v".to_vec()));
        assert!(cache.contains("k").await.unwrap());
        assert_eq!(cache.fetch("other").await.unwrap(), None);

        // Stored under the composite key
        assert_eq!(backend.keys(), keys(&["app[k][1]"]));
    }

    #[tokio::test]
    async fn test_namespace_isolation() {
        let backend = MapBackend::default();
        let a = CacheProvider::with_namespace(backend.clone(), "a");
        let b = CacheProvider::with_namespace(backend.clone(), "b");

        a.save("k", b"from-a".to_vec(), Lifetime::FOREVER).await.unwrap();
        assert_eq!(b.fetch("k").await.unwrap(), None);

        b.save("k", b"from-b".to_vec(), Lifetime::FOREVER).await.unwrap();
        assert_eq!(a.fetch("k").await.unwrap(), Some(b"from-a".to_vec()));
        assert_eq!(b.fetch("k").await.unwrap(), Some(b"from-b".to_vec()));
    }

    #[tokio::test]
    async fn test_version_resolved_once() {
        let (backend, cache) = provider("app");

        cache.fetch("a").await.unwrap();
        cache.fetch("b").await.unwrap();
        cache.fetch_multiple(&["c", "d"]).await.unwrap();

        let version_reads = backend
            .fetches
            .lock()
            .iter()
            .filter(|k| k.as_str() == "NamespaceCacheKey[app]")
            .count();
        assert_eq!(version_reads, 1);
    }

    #[tokio::test]
    async fn test_stored_version_is_used() {
        let backend = MapBackend::default();
        backend
            .save("NamespaceCacheKey[app]", b"4".to_vec(), Lifetime::FOREVER)
            .await
            .unwrap();
        let cache = CacheProvider::with_namespace(backend.clone(), "app");

        assert_eq!(cache.version().await.unwrap(), 4);
        assert_eq!(cache.composite("k").await.unwrap(), "app[k][4]");
    }

    #[tokio::test]
    async fn test_set_namespace_forgets_version() {
        let (_backend, mut cache) = provider("a");
        cache.delete_all().await.unwrap();
        assert_eq!(cache.version().await.unwrap(), 2);

        cache.set_namespace("b");
        assert_eq!(cache.namespace(), "b");
        assert_eq!(cache.version().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_fetch_multiple_rekeys_to_raw() {
        let (_backend, cache) = provider("app");
        cache.save("a", b"1".to_vec(), Lifetime::FOREVER).await.unwrap();
        cache.save("zero", Vec::new(), Lifetime::FOREVER).await.unwrap();

        let items = cache.fetch_multiple(&["a", "zero", "missing"]).await.unwrap();

        assert_eq!(items.len(), 2);
        assert_eq!(items.get("a"), Some(&ValueSlot::Found(b"1".to_vec())));
        assert_eq!(items.get("zero"), Some(&ValueSlot::Found(Vec::new())));
        assert!(!items.contains_key("missing"));
    }

    #[tokio::test]
    async fn test_fetch_multiple_empty_skips_backend() {
        let (backend, cache) = provider("app");
        let empty: [&str; 0] = [];

        let items = cache.fetch_multiple(&empty).await.unwrap();

        assert!(items.is_empty());
        assert!(backend.fetches.lock().is_empty());
    }

    #[tokio::test]
    async fn test_save_multiple() {
        let (backend, cache) = provider("app");

        let saved = cache
            .save_multiple(
                vec![("a".to_string(), b"1".to_vec()), ("b".to_string(), b"2".to_vec())],
                Lifetime::FOREVER,
            )
            .await
            .unwrap();

        assert!(saved);
        assert_eq!(backend.keys(), keys(&["app[a][1]", "app[b][1]"]));
    }

    #[tokio::test]
    async fn test_save_multiple_empty_is_failure() {
        let (backend, cache) = provider("app");

        assert!(!cache.save_multiple(Vec::new(), Lifetime::FOREVER).await.unwrap());
        assert!(backend.saves.lock().is_empty());
    }

    #[tokio::test]
    async fn test_delete_and_delete_multiple() {
        let (backend, cache) = provider("app");
        for key in ["a", "b", "c"] {
            cache.save(key, b"x".to_vec(), Lifetime::FOREVER).await.unwrap();
        }

        assert!(cache.delete("a").await.unwrap());
        assert!(cache.delete_multiple(&["b", "c"]).await.unwrap());
        assert!(backend.keys().is_empty());

        let empty: [&str; 0] = [];
        assert!(cache.delete_multiple(&empty).await.unwrap());
    }

    #[tokio::test]
    async fn test_delete_all_bumps_version() {
        let (backend, cache) = provider("app");
        cache.save("k", b"v".to_vec(), Lifetime::FOREVER).await.unwrap();

        assert!(cache.delete_all().await.unwrap());

        assert_eq!(cache.fetch("k").await.unwrap(), None);
        assert_eq!(cache.version().await.unwrap(), 2);
        assert_eq!(
            backend.data.lock().get("NamespaceCacheKey[app]").cloned(),
            Some(b"2".to_vec())
        );
        // Old entry is unreachable, not removed
        assert!(backend.data.lock().contains_key("app[k][1]"));
    }

    #[tokio::test]
    async fn test_delete_all_invisible_to_resolved_instance() {
        let backend = MapBackend::default();
        let writer = CacheProvider::with_namespace(backend.clone(), "app");
        let other = CacheProvider::with_namespace(backend.clone(), "app");

        writer.save("k", b"v".to_vec(), Lifetime::FOREVER).await.unwrap();
        assert_eq!(other.fetch("k").await.unwrap(), Some(b"v".to_vec()));

        writer.delete_all().await.unwrap();

        // `other` keeps its resolved version until told otherwise
        assert_eq!(other.fetch("k").await.unwrap(), Some(b"v".to_vec()));

        // A fresh instance sees the bump
        let fresh = CacheProvider::with_namespace(backend, "app");
        assert_eq!(fresh.fetch("k").await.unwrap(), None);

        other.reload_version();
        assert_eq!(other.fetch("k").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_delete_all_failed_save_keeps_version() {
        let (_backend, cache) = provider("bad!");

        assert!(!cache.delete_all().await.unwrap());
        assert_eq!(cache.version().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_flush_clears_every_namespace() {
        let backend = MapBackend::default();
        let a = CacheProvider::with_namespace(backend.clone(), "a");
        let b = CacheProvider::with_namespace(backend.clone(), "b");
        a.save("k", b"1".to_vec(), Lifetime::FOREVER).await.unwrap();
        b.save("k", b"2".to_vec(), Lifetime::FOREVER).await.unwrap();

        assert!(a.flush().await.unwrap());
        assert!(backend.keys().is_empty());
    }
}
