//! Test-only backend shared by the unit tests of this crate

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

use crate::{CacheBackend, Lifetime, Result};

/// HashMap backend without native batch support
///
/// Writes to keys containing `!` are rejected with `Ok(false)`. Cloning shares
/// the store, like the real backends do.
#[derive(Clone, Default)]
pub(crate) struct MapBackend {
    pub data: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    pub saves: Arc<Mutex<Vec<String>>>,
    pub fetches: Arc<Mutex<Vec<String>>>,
}

impl MapBackend {
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.data.lock().keys().cloned().collect();
        keys.sort();
        keys
    }
}

#[async_trait]
impl CacheBackend for MapBackend {
    async fn fetch(&self, key: &str) -> Result<Option<Vec<u8>>> {
        self.fetches.lock().push(key.to_string());
        Ok(self.data.lock().get(key).cloned())
    }

    async fn contains(&self, key: &str) -> Result<bool> {
        Ok(self.data.lock().contains_key(key))
    }

    async fn save(&self, key: &str, value: Vec<u8>, _lifetime: Lifetime) -> Result<bool> {
        self.saves.lock().push(key.to_string());
        if key.contains('!') {
            return Ok(false);
        }
        self.data.lock().insert(key.to_string(), value);
        Ok(true)
    }

    async fn delete(&self, key: &str) -> Result<bool> {
        self.data.lock().remove(key);
        Ok(!key.contains('!'))
    }

    async fn flush(&self) -> Result<bool> {
        self.data.lock().clear();
        Ok(true)
    }
}

pub(crate) fn keys(ks: &[&str]) -> Vec<String> {
    ks.iter().map(|k| k.to_string()).collect()
}
