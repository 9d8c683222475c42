use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, warn};

use chaincache_core::{
    CacheBackend, CacheProvider, CacheStats, FetchMap, Lifetime, Result, ValueSlot,
};

use super::BroadcastReport;

/// One level of a chain
///
/// Each tier keeps its own namespace state, so reading a tier directly
/// yields the same composite keys the chain uses.
pub type Tier = CacheProvider<Arc<dyn CacheBackend>>;

/// Ordered chain of backends, index 0 being the fastest
///
/// The chain receives composite keys and talks to each tier's backend
/// directly. Wrap it in a [`CacheProvider`] to get namespacing; the
/// provider's namespace is pushed down to every tier, also when the chain
/// sits behind an `Arc` shared with other owners.
///
/// Reads stop at the first tier holding the key and copy the value into
/// every faster tier. Writes go to all tiers in order and succeed only if
/// every tier succeeded.
pub struct ChainCache {
    tiers: Vec<Level>,
    namespace: RwLock<String>,
}

/// A tier's backend plus its namespaced view
///
/// The backend is kept outside the lock so traffic never waits on a
/// namespace change.
struct Level {
    backend: Arc<dyn CacheBackend>,
    view: RwLock<Tier>,
}

impl Level {
    fn new(backend: Arc<dyn CacheBackend>, namespace: String) -> Self {
        let view = CacheProvider::with_namespace(backend.clone(), namespace);
        Self {
            backend,
            view: RwLock::new(view),
        }
    }

    fn backend(&self) -> &Arc<dyn CacheBackend> {
        &self.backend
    }
}

impl Clone for Level {
    fn clone(&self) -> Self {
        Self {
            backend: self.backend.clone(),
            view: RwLock::new(self.view.read().clone()),
        }
    }
}

impl Clone for ChainCache {
    fn clone(&self) -> Self {
        Self {
            tiers: self.tiers.clone(),
            namespace: RwLock::new(self.namespace.read().clone()),
        }
    }
}

impl ChainCache {
    /// Create a chain from backends ordered fastest first
    pub fn new(backends: Vec<Arc<dyn CacheBackend>>) -> Self {
        Self {
            tiers: backends
                .into_iter()
                .map(|backend| Level::new(backend, String::new()))
                .collect(),
            namespace: RwLock::new(String::new()),
        }
    }

    /// Create a chain without tiers
    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    /// Append a slower tier
    pub fn with_tier<B: CacheBackend>(mut self, backend: B) -> Self {
        let backend: Arc<dyn CacheBackend> = Arc::new(backend);
        let namespace = self.namespace.read().clone();
        self.tiers.push(Level::new(backend, namespace));
        self
    }

    /// Namespace last pushed down to the tiers
    pub fn namespace(&self) -> String {
        self.namespace.read().clone()
    }

    /// All tiers, fastest first
    ///
    /// Each [`Tier`] is a snapshot; a later namespace change is not seen by
    /// tiers handed out before it.
    pub fn tiers(&self) -> Vec<Tier> {
        self.tiers.iter().map(|level| level.view.read().clone()).collect()
    }

    /// Tier at `index`
    pub fn tier(&self, index: usize) -> Option<Tier> {
        self.tiers.get(index).map(|level| level.view.read().clone())
    }

    /// Number of tiers
    pub fn len(&self) -> usize {
        self.tiers.len()
    }

    /// Check if the chain has no tiers
    pub fn is_empty(&self) -> bool {
        self.tiers.is_empty()
    }

    /// Statistics of each tier, in chain order
    pub async fn tier_stats(&self) -> Result<Vec<Option<CacheStats>>> {
        let mut stats = Vec::with_capacity(self.tiers.len());
        for tier in &self.tiers {
            stats.push(tier.backend().stats().await?);
        }
        Ok(stats)
    }

    /// Save to every tier and report each result
    pub async fn save_report(
        &self,
        key: &str,
        value: Vec<u8>,
        lifetime: Lifetime,
    ) -> Result<BroadcastReport> {
        let mut report = BroadcastReport::with_capacity(self.tiers.len());
        for (index, tier) in self.tiers.iter().enumerate() {
            let ok = tier.backend().save(key, value.clone(), lifetime).await?;
            note_tier_failure("save", index, ok);
            report.push(ok);
        }
        Ok(report)
    }

    /// Save a batch to every tier and report each result
    pub async fn save_multiple_report(
        &self,
        entries: &[(String, Vec<u8>)],
        lifetime: Lifetime,
    ) -> Result<BroadcastReport> {
        let mut report = BroadcastReport::with_capacity(self.tiers.len());
        for (index, tier) in self.tiers.iter().enumerate() {
            let ok = tier.backend().save_multiple(entries, lifetime).await?;
            note_tier_failure("save_multiple", index, ok);
            report.push(ok);
        }
        Ok(report)
    }

    /// Delete from every tier and report each result
    pub async fn delete_report(&self, key: &str) -> Result<BroadcastReport> {
        let mut report = BroadcastReport::with_capacity(self.tiers.len());
        for (index, tier) in self.tiers.iter().enumerate() {
            let ok = tier.backend().delete(key).await?;
            note_tier_failure("delete", index, ok);
            report.push(ok);
        }
        Ok(report)
    }

    /// Delete a batch from every tier and report each result
    pub async fn delete_multiple_report(&self, keys: &[String]) -> Result<BroadcastReport> {
        let mut report = BroadcastReport::with_capacity(self.tiers.len());
        for (index, tier) in self.tiers.iter().enumerate() {
            let ok = tier.backend().delete_multiple(keys).await?;
            note_tier_failure("delete_multiple", index, ok);
            report.push(ok);
        }
        Ok(report)
    }

    /// Flush every tier and report each result
    pub async fn flush_report(&self) -> Result<BroadcastReport> {
        let mut report = BroadcastReport::with_capacity(self.tiers.len());
        for (index, tier) in self.tiers.iter().enumerate() {
            let ok = tier.backend().flush().await?;
            note_tier_failure("flush", index, ok);
            report.push(ok);
        }
        Ok(report)
    }

    /// Copy a value found at tier `depth` into the faster tiers
    async fn backfill(&self, key: &str, value: &[u8], depth: usize) {
        for (index, tier) in self.tiers[..depth].iter().enumerate().rev() {
            match tier.backend().save(key, value.to_vec(), Lifetime::FOREVER).await {
                Ok(true) => {}
                Ok(false) => warn!(target: "chaincache", tier = index, key = %key, "backfill rejected"),
                Err(e) => warn!(target: "chaincache", tier = index, key = %key, error = %e, "backfill failed"),
            }
        }
    }

    /// Copy the hits of tier `depth` into the faster tiers
    async fn backfill_multiple(&self, hits: &[(String, Vec<u8>)], depth: usize) {
        for (index, tier) in self.tiers[..depth].iter().enumerate().rev() {
            match tier.backend().save_multiple(hits, Lifetime::FOREVER).await {
                Ok(true) => {}
                Ok(false) => warn!(target: "chaincache", tier = index, keys = hits.len(), "batch backfill rejected"),
                Err(e) => warn!(target: "chaincache", tier = index, keys = hits.len(), error = %e, "batch backfill failed"),
            }
        }
    }
}

fn note_tier_failure(operation: &'static str, index: usize, ok: bool) {
    if !ok {
        warn!(target: "chaincache", operation, tier = index, "tier write failed");
    }
}

#[async_trait]
impl CacheBackend for ChainCache {
    async fn fetch(&self, key: &str) -> Result<Option<Vec<u8>>> {
        for (depth, tier) in self.tiers.iter().enumerate() {
            let backend = tier.backend();
            if !backend.contains(key).await? {
                continue;
            }

            // Gone between the two calls; keep looking further down
            let Some(value) = backend.fetch(key).await? else {
                continue;
            };

            debug!(target: "chaincache", tier = depth, key = %key, "chain hit");
            if depth > 0 {
                self.backfill(key, &value, depth).await;
            }
            return Ok(Some(value));
        }

        Ok(None)
    }

    async fn contains(&self, key: &str) -> Result<bool> {
        for tier in &self.tiers {
            if tier.backend().contains(key).await? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    async fn save(&self, key: &str, value: Vec<u8>, lifetime: Lifetime) -> Result<bool> {
        Ok(self.save_report(key, value, lifetime).await?.succeeded())
    }

    async fn delete(&self, key: &str) -> Result<bool> {
        Ok(self.delete_report(key).await?.succeeded())
    }

    async fn flush(&self) -> Result<bool> {
        Ok(self.flush_report().await?.succeeded())
    }

    /// Every requested key is present in the answer; keys found nowhere
    /// map to [`ValueSlot::NotFound`].
    async fn fetch_multiple(&self, keys: &[String]) -> Result<FetchMap> {
        let mut seen = HashSet::with_capacity(keys.len());
        let mut needed: Vec<String> = keys
            .iter()
            .filter(|key| seen.insert(key.as_str()))
            .cloned()
            .collect();

        let mut found = FetchMap::with_capacity(needed.len());
        for (depth, tier) in self.tiers.iter().enumerate() {
            if needed.is_empty() {
                break;
            }

            let mut answered = tier.backend().fetch_multiple(&needed).await?;
            let mut hits = Vec::new();
            needed.retain(|key| match answered.remove(key) {
                Some(ValueSlot::Found(value)) => {
                    hits.push((key.clone(), value));
                    false
                }
                _ => true,
            });

            if hits.is_empty() {
                continue;
            }

            debug!(target: "chaincache", tier = depth, hits = hits.len(), "chain batch hit");
            if depth > 0 {
                self.backfill_multiple(&hits, depth).await;
            }
            found.extend(hits.into_iter().map(|(key, value)| (key, ValueSlot::Found(value))));
        }

        for key in needed {
            found.insert(key, ValueSlot::NotFound);
        }
        Ok(found)
    }

    async fn save_multiple(&self, entries: &[(String, Vec<u8>)], lifetime: Lifetime) -> Result<bool> {
        Ok(self.save_multiple_report(entries, lifetime).await?.succeeded())
    }

    async fn delete_multiple(&self, keys: &[String]) -> Result<bool> {
        Ok(self.delete_multiple_report(keys).await?.succeeded())
    }

    /// Combined statistics of the tiers that keep any
    async fn stats(&self) -> Result<Option<CacheStats>> {
        let mut merged: Option<CacheStats> = None;
        for stats in self.tier_stats().await?.into_iter().flatten() {
            match merged.as_mut() {
                Some(total) => total.merge(&stats),
                None => merged = Some(stats),
            }
        }
        Ok(merged)
    }

    fn on_namespace(&self, namespace: &str) {
        *self.namespace.write() = namespace.to_string();
        for level in &self.tiers {
            level.view.write().set_namespace(namespace);
        }
    }
}
