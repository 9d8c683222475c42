//! Memory in front of Redis

use chaincache::prelude::*;

#[tokio::main]
async fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    let redis_url =
        std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://127.0.0.1:6379".to_string());
    println!("Connecting to Redis at {}", redis_url);

    let redis = match RedisBackend::new(RedisConfig::new(redis_url).prefix("chaincache")).await {
        Ok(redis) => redis,
        Err(e) => {
            eprintln!("Could not connect to Redis: {}", e);
            println!("Make sure Redis is running at 127.0.0.1:6379 or set REDIS_URL");
            return Ok(());
        }
    };

    let chain = ChainCache::empty()
        .with_tier(MemoryBackend::new(MemoryConfig::default()))
        .with_tier(redis.clone());
    let cache = CacheManager::with_config(chain, CacheManagerConfig::with_namespace("sessions"));

    cache.set("abc123", &"user:42".to_string(), Some(Lifetime::from_secs(60))).await?;
    println!("Session: {:?}", cache.get::<String>("abc123").await?);

    // A second process only sharing Redis still finds it
    let cold = CacheManager::with_config(
        ChainCache::empty()
            .with_tier(MemoryBackend::new(MemoryConfig::default()))
            .with_tier(redis),
        CacheManagerConfig::with_namespace("sessions"),
    );
    println!("Cold start: {:?}", cold.get::<String>("abc123").await?);

    if let Some(stats) = cold.stats().await? {
        println!("Redis + memory hits: {}", stats.hits);
    }

    cache.flush().await?;
    Ok(())
}
