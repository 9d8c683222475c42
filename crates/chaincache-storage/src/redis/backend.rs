use async_trait::async_trait;
use bb8::{Pool, PooledConnection};
use bb8_redis::RedisConnectionManager;
use redis::{AsyncCommands, Cmd, Value};
use std::time::Instant;
use tracing::debug;

use chaincache_core::{
    CacheBackend, CacheError, CacheStats, Expiry, FetchMap, Lifetime, Result, ValueSlot,
};

use super::config::RedisConfig;

const SCAN_BATCH: usize = 1000;

/// Redis backend implementation
///
/// Values are stored as plain strings. Lifetimes up to 30 days are sent as
/// `EX` seconds, longer ones as an `EXAT` unix timestamp.
#[derive(Clone)]
pub struct RedisBackend {
    pool: Pool<RedisConnectionManager>,
    config: RedisConfig,
    started: Instant,
}

impl RedisBackend {
    /// Create a new Redis backend
    pub async fn new(config: RedisConfig) -> Result<Self> {
        let manager = RedisConnectionManager::new(config.url.as_str())
            .map_err(|e| CacheError::Connection(e.to_string()))?;

        let pool = Pool::builder()
            .max_size(config.pool_size)
            .connection_timeout(config.connection_timeout)
            .build(manager)
            .await
            .map_err(|e| CacheError::Connection(e.to_string()))?;

        Ok(Self {
            pool,
            config,
            started: Instant::now(),
        })
    }

    /// Backend configuration
    pub fn config(&self) -> &RedisConfig {
        &self.config
    }

    fn prefixed_key(&self, key: &str) -> String {
        prefixed(self.config.key_prefix.as_deref(), key)
    }

    /// Get connection from pool
    async fn get_connection(&self) -> Result<PooledConnection<'_, RedisConnectionManager>> {
        self.pool.get().await.map_err(|e| CacheError::Connection(e.to_string()))
    }

    fn set_command(&self, key: &str, value: &[u8], lifetime: Lifetime) -> Cmd {
        let mut cmd = redis::cmd("SET");
        cmd.arg(self.prefixed_key(key)).arg(value);
        if let Some((option, secs)) = expiry_args(lifetime.expiry()) {
            cmd.arg(option).arg(secs);
        }
        cmd
    }

    /// Remove every key under the configured prefix
    async fn unlink_prefixed(&self, prefix: &str) -> Result<()> {
        let mut conn = self.get_connection().await?;
        let pattern = format!("{}:*", prefix);
        let mut cursor = 0u64;

        loop {
            let (next_cursor, keys): (u64, Vec<String>) = redis::cmd("SCAN")
                .cursor_arg(cursor)
                .arg("MATCH")
                .arg(&pattern)
                .arg("COUNT")
                .arg(SCAN_BATCH)
                .query_async(&mut *conn)
                .await
                .map_err(|e| CacheError::Backend(e.to_string()))?;

            if !keys.is_empty() {
                let _: usize = conn
                    .unlink(&keys)
                    .await
                    .map_err(|e| CacheError::Backend(e.to_string()))?;
            }

            cursor = next_cursor;
            if cursor == 0 {
                break;
            }
        }
        Ok(())
    }
}

#[async_trait]
impl CacheBackend for RedisBackend {
    async fn fetch(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let mut conn = self.get_connection().await?;
        conn.get(self.prefixed_key(key))
            .await
            .map_err(|e| CacheError::Backend(e.to_string()))
    }

    async fn contains(&self, key: &str) -> Result<bool> {
        let mut conn = self.get_connection().await?;
        conn.exists(self.prefixed_key(key))
            .await
            .map_err(|e| CacheError::Backend(e.to_string()))
    }

    async fn save(&self, key: &str, value: Vec<u8>, lifetime: Lifetime) -> Result<bool> {
        let mut conn = self.get_connection().await?;
        let reply: Value = self
            .set_command(key, &value, lifetime)
            .query_async(&mut *conn)
            .await
            .map_err(|e| CacheError::Backend(e.to_string()))?;
        Ok(reply != Value::Nil)
    }

    /// A key that was already gone still counts as deleted
    async fn delete(&self, key: &str) -> Result<bool> {
        let mut conn = self.get_connection().await?;
        let _: u64 = conn
            .del(self.prefixed_key(key))
            .await
            .map_err(|e| CacheError::Backend(e.to_string()))?;
        Ok(true)
    }

    async fn flush(&self) -> Result<bool> {
        if let Some(prefix) = &self.config.key_prefix {
            self.unlink_prefixed(prefix).await?;
            return Ok(true);
        }

        let mut conn = self.get_connection().await?;
        let _: () = redis::cmd("FLUSHDB")
            .query_async(&mut *conn)
            .await
            .map_err(|e| CacheError::Backend(e.to_string()))?;
        Ok(true)
    }

    async fn fetch_multiple(&self, keys: &[String]) -> Result<FetchMap> {
        if keys.is_empty() {
            return Ok(FetchMap::new());
        }

        let mut conn = self.get_connection().await?;
        let prefixed_keys: Vec<String> = keys.iter().map(|k| self.prefixed_key(k)).collect();
        let values: Vec<Option<Vec<u8>>> = redis::cmd("MGET")
            .arg(&prefixed_keys)
            .query_async(&mut *conn)
            .await
            .map_err(|e| CacheError::Backend(e.to_string()))?;

        Ok(keys
            .iter()
            .zip(values)
            .filter_map(|(key, value)| value.map(|v| (key.clone(), ValueSlot::Found(v))))
            .collect())
    }

    async fn save_multiple(&self, entries: &[(String, Vec<u8>)], lifetime: Lifetime) -> Result<bool> {
        if entries.is_empty() {
            return Ok(true);
        }

        let mut conn = self.get_connection().await?;
        let mut pipe = redis::pipe();
        pipe.atomic();
        for (key, value) in entries {
            pipe.add_command(self.set_command(key, value, lifetime));
        }

        let replies: Vec<Value> = pipe
            .query_async(&mut *conn)
            .await
            .map_err(|e| CacheError::Backend(e.to_string()))?;
        Ok(replies.iter().all(|reply| *reply != Value::Nil))
    }

    async fn delete_multiple(&self, keys: &[String]) -> Result<bool> {
        if keys.is_empty() {
            return Ok(true);
        }

        let mut conn = self.get_connection().await?;
        let prefixed_keys: Vec<String> = keys.iter().map(|k| self.prefixed_key(k)).collect();
        let _: u64 = conn
            .del(&prefixed_keys)
            .await
            .map_err(|e| CacheError::Backend(e.to_string()))?;
        Ok(true)
    }

    async fn stats(&self) -> Result<Option<CacheStats>> {
        let mut conn = self.get_connection().await?;
        let info: String = redis::cmd("INFO")
            .query_async(&mut *conn)
            .await
            .map_err(|e| CacheError::Backend(e.to_string()))?;

        let mut stats = parse_info(&info);
        if stats.uptime_secs == 0 {
            debug!(target: "chaincache", "INFO reported no uptime, using backend age");
            stats.uptime_secs = self.started.elapsed().as_secs();
        }
        Ok(Some(stats))
    }
}

fn prefixed(prefix: Option<&str>, key: &str) -> String {
    match prefix {
        Some(prefix) => format!("{}:{}", prefix, key),
        None => key.to_string(),
    }
}

/// `SET` options for an expiry, `None` for keys that never expire
fn expiry_args(expiry: Expiry) -> Option<(&'static str, u64)> {
    match expiry {
        Expiry::Never => None,
        Expiry::Relative(secs) => Some(("EX", secs)),
        Expiry::Absolute(timestamp) => Some(("EXAT", timestamp)),
    }
}

/// Read the counters we report out of an `INFO` reply
fn parse_info(info: &str) -> CacheStats {
    let mut stats = CacheStats::default();
    let mut max_memory = 0u64;

    for line in info.lines() {
        let Some((field, value)) = line.trim().split_once(':') else {
            continue;
        };
        let Ok(value) = value.trim().parse::<u64>() else {
            continue;
        };

        match field {
            "keyspace_hits" => stats.hits = value,
            "keyspace_misses" => stats.misses = value,
            "uptime_in_seconds" => stats.uptime_secs = value,
            "used_memory" => stats.memory_usage = value,
            "maxmemory" => max_memory = value,
            _ => {}
        }
    }

    // maxmemory 0 means no limit
    if max_memory > 0 {
        stats.memory_available = Some(max_memory.saturating_sub(stats.memory_usage));
    }
    stats
}
