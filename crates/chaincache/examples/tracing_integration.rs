use chaincache::prelude::*;
use chaincache::TracingMetrics;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    // TRACE shows operation latencies too
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::TRACE)
        .with_target(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| CacheError::Internal(e.to_string()))?;

    // Reads that hit the second tier log a backfill under the "chaincache" target
    let slow = MemoryBackend::new(MemoryConfig::default());
    let chain = ChainCache::empty()
        .with_tier(MemoryBackend::new(MemoryConfig::default()))
        .with_tier(slow.clone());

    let metrics = TracingMetrics::new().with_service_name("example-service");
    let cache = CacheManager::with_serializer_and_metrics(
        chain,
        JsonSerializer,
        metrics,
        CacheManagerConfig::with_namespace("demo"),
    );

    cache.set("user:1", &"Alice".to_string(), Some(Lifetime::from_secs(60))).await?;

    let val = cache.get::<String>("user:1").await?;
    println!("Got: {:?}", val);

    let miss = cache.get::<String>("user:99").await?;
    println!("Got: {:?}", miss);

    Ok(())
}
