//! Cache backend trait

use async_trait::async_trait;
use std::sync::Arc;

use crate::{bridge, CacheStats, FetchMap, Lifetime, Result};

/// Core trait for all cache storage backends
///
/// Keys reaching a backend are already namespaced; backends treat them as
/// opaque strings. Ordinary failures are reported as `Ok(false)`, and an
/// `Err` is reserved for faults the caller is expected to handle.
///
/// The batch methods have default implementations built from the single-key
/// primitives (see [`crate::bridge`]). Backends with native batch commands
/// should override them.
#[async_trait]
pub trait CacheBackend: Send + Sync + 'static {
    /// Fetch a value
    ///
    /// Returns `None` if the key doesn't exist or has expired.
    async fn fetch(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Check if a key exists
    async fn contains(&self, key: &str) -> Result<bool>;

    /// Store a value, `Lifetime::FOREVER` meaning no expiry
    async fn save(&self, key: &str, value: Vec<u8>, lifetime: Lifetime) -> Result<bool>;

    /// Delete a key
    ///
    /// Deleting a key that does not exist counts as success.
    async fn delete(&self, key: &str) -> Result<bool>;

    /// Remove every entry from the backend, regardless of namespace
    async fn flush(&self) -> Result<bool>;

    /// Fetch several keys at once
    ///
    /// The returned map only contains keys that were found.
    async fn fetch_multiple(&self, keys: &[String]) -> Result<FetchMap> {
        bridge::fetch_each(self, keys).await
    }

    /// Store several entries with a shared lifetime
    async fn save_multiple(&self, entries: &[(String, Vec<u8>)], lifetime: Lifetime) -> Result<bool> {
        bridge::save_each(self, entries, lifetime).await
    }

    /// Delete several keys
    async fn delete_multiple(&self, keys: &[String]) -> Result<bool> {
        bridge::delete_each(self, keys).await
    }

    /// Backend statistics, if the backend keeps any
    async fn stats(&self) -> Result<Option<CacheStats>> {
        Ok(None)
    }

    /// Called when the namespace of the owning provider changes
    ///
    /// Composite backends use this to keep their own tiers in step. It
    /// takes `&self` so the change also reaches backends behind shared
    /// handles.
    fn on_namespace(&self, _namespace: &str) {}
}

#[async_trait]
impl<T: CacheBackend + ?Sized> CacheBackend for Arc<T> {
    async fn fetch(&self, key: &str) -> Result<Option<Vec<u8>>> {
        (**self).fetch(key).await
    }

    async fn contains(&self, key: &str) -> Result<bool> {
        (**self).contains(key).await
    }

    async fn save(&self, key: &str, value: Vec<u8>, lifetime: Lifetime) -> Result<bool> {
        (**self).save(key, value, lifetime).await
    }

    async fn delete(&self, key: &str) -> Result<bool> {
        (**self).delete(key).await
    }

    async fn flush(&self) -> Result<bool> {
        (**self).flush().await
    }

    async fn fetch_multiple(&self, keys: &[String]) -> Result<FetchMap> {
        (**self).fetch_multiple(keys).await
    }

    async fn save_multiple(&self, entries: &[(String, Vec<u8>)], lifetime: Lifetime) -> Result<bool> {
        (**self).save_multiple(entries, lifetime).await
    }

    async fn delete_multiple(&self, keys: &[String]) -> Result<bool> {
        (**self).delete_multiple(keys).await
    }

    async fn stats(&self) -> Result<Option<CacheStats>> {
        (**self).stats().await
    }

    fn on_namespace(&self, namespace: &str) {
        (**self).on_namespace(namespace);
    }
}
