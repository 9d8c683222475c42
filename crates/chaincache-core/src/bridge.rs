//! Batch operations built from single-key primitives
//!
//! These are the default batch methods of [`CacheBackend`]. They visit keys
//! in order, one at a time, and never short-circuit on a `false` result.

use crate::{CacheBackend, FetchMap, Lifetime, Result, ValueSlot};

/// Fetch each key in turn, keeping only the keys that were found
pub async fn fetch_each<B>(backend: &B, keys: &[String]) -> Result<FetchMap>
where
    B: CacheBackend + ?Sized,
{
    let mut found = FetchMap::with_capacity(keys.len());
    for key in keys {
        if let Some(value) = backend.fetch(key).await? {
            found.insert(key.clone(), ValueSlot::Found(value));
        }
    }
    Ok(found)
}

/// Save each entry in turn; `true` only if every save succeeded
pub async fn save_each<B>(backend: &B, entries: &[(String, Vec<u8>)], lifetime: Lifetime) -> Result<bool>
where
    B: CacheBackend + ?Sized,
{
    let mut stored = true;
    for (key, value) in entries {
        stored = backend.save(key, value.clone(), lifetime).await? && stored;
    }
    Ok(stored)
}

/// Delete each key in turn; `true` only if every delete succeeded
pub async fn delete_each<B>(backend: &B, keys: &[String]) -> Result<bool>
where
    B: CacheBackend + ?Sized,
{
    let mut deleted = true;
    for key in keys {
        deleted = backend.delete(key).await? && deleted;
    }
    Ok(deleted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{keys, MapBackend};

    #[tokio::test]
    async fn test_fetch_each_keeps_found_only() {
        let backend = MapBackend::default();
        backend.save("a", b"1".to_vec(), Lifetime::FOREVER).await.unwrap();
        backend.save("empty", Vec::new(), Lifetime::FOREVER).await.unwrap();

        let found = backend.fetch_multiple(&keys(&["a", "b", "empty"])).await.unwrap();

        assert_eq!(found.len(), 2);
        assert_eq!(found.get("a"), Some(&ValueSlot::Found(b"1".to_vec())));
        assert_eq!(found.get("empty"), Some(&ValueSlot::Found(Vec::new())));
        assert!(!found.contains_key("b"));
    }

    #[tokio::test]
    async fn test_save_each_does_not_short_circuit() {
        let backend = MapBackend::default();
        let entries = vec![
            ("a".to_string(), b"1".to_vec()),
            ("!bad".to_string(), b"2".to_vec()),
            ("c".to_string(), b"3".to_vec()),
        ];

        let stored = backend.save_multiple(&entries, Lifetime::FOREVER).await.unwrap();

        assert!(!stored);
        assert_eq!(*backend.saves.lock(), keys(&["a", "!bad", "c"]));
        assert!(backend.contains("c").await.unwrap());
    }

    #[tokio::test]
    async fn test_delete_each() {
        let backend = MapBackend::default();
        backend.save("a", b"1".to_vec(), Lifetime::FOREVER).await.unwrap();

        assert!(backend.delete_multiple(&keys(&["a", "missing"])).await.unwrap());
        assert!(!backend.contains("a").await.unwrap());
        assert!(!backend.delete_multiple(&keys(&["!x"])).await.unwrap());
        assert!(backend.delete_multiple(&[]).await.unwrap());
    }

    #[tokio::test]
    async fn test_default_stats_absent() {
        let backend = MapBackend::default();
        assert_eq!(backend.stats().await.unwrap(), None);
    }
}
