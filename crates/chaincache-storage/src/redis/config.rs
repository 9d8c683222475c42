//! Configuration for Redis backend

use std::time::Duration;

/// Configuration for Redis backend connection and behavior
#[derive(Debug, Clone)]
pub struct RedisConfig {
    /// Redis connection URL (e.g., "redis://127.0.0.1:6379")
    pub url: String,

    /// Connection pool size
    pub pool_size: u32,

    /// Connection timeout
    pub connection_timeout: Duration,

    /// Optional key prefix (e.g., "myapp")
    ///
    /// With a prefix, `flush` only removes keys under it. Without one,
    /// `flush` empties the whole database.
    pub key_prefix: Option<String>,
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            url: "redis://127.0.0.1:6379".to_string(),
            pool_size: 10,
            connection_timeout: Duration::from_secs(5),
            key_prefix: None,
        }
    }
}

impl RedisConfig {
    /// Create new config with URL
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    /// Set pool size
    pub fn pool_size(mut self, size: u32) -> Self {
        self.pool_size = size;
        self
    }

    /// Set connection timeout
    pub fn connection_timeout(mut self, timeout: Duration) -> Self {
        self.connection_timeout = timeout;
        self
    }

    /// Set key prefix
    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.key_prefix = Some(prefix.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = RedisConfig::default();
        assert_eq!(config.url, "redis://127.0.0.1:6379");
        assert_eq!(config.pool_size, 10);
        assert!(config.key_prefix.is_none());
    }

    #[test]
    fn test_builder() {
        let config = RedisConfig::new("redis://cache:6380")
            .pool_size(4)
            .connection_timeout(Duration::from_millis(250))
            .prefix("app");

        assert_eq!(config.url, "redis://cache:6380");
        assert_eq!(config.pool_size, 4);
        assert_eq!(config.connection_timeout, Duration::from_millis(250));
        assert_eq!(config.key_prefix.as_deref(), Some("app"));
    }
}
