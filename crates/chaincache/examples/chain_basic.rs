//! Two in-memory tiers behind one namespaced cache

use chaincache::prelude::*;

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
struct User {
    id: u64,
    name: String,
}

#[tokio::main]
async fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    println!("=== chaincache tier chain ===\n");

    // Keep handles on the tiers to look inside them later
    let fast = MemoryBackend::new(MemoryConfig::with_capacity(100));
    let slow = MemoryBackend::new(MemoryConfig::unlimited());
    let chain = ChainCache::empty()
        .with_tier(fast.clone())
        .with_tier(slow.clone());

    let cache = CacheManager::with_config(chain, CacheManagerConfig::with_namespace("users"));

    let alice = User {
        id: 1,
        name: "Alice".to_string(),
    };
    cache.set(alice.id, &alice, Some(Lifetime::from_secs(300))).await?;
    println!("Written through to {} tiers", cache.provider().backend().len());

    // Cold start of the fast tier
    fast.flush().await?;
    println!("Fast tier flushed, entries left: {}", fast.len());

    match cache.get::<User>(1u64).await? {
        Some(user) => println!("Read {} from the slow tier", user.name),
        None => println!("Miss"),
    }
    println!("Fast tier warmed again, entries: {}", fast.len());

    // Batch read marks keys found nowhere
    let users = cache.get_many::<User, _>(&[1u64, 2u64]).await?;
    for (key, user) in &users {
        println!("  {} => {:?}", key, user.as_ref().map(|u| &u.name));
    }

    // Drop the whole namespace in one write
    cache.invalidate_all().await?;
    println!(
        "After invalidation: {:?}",
        cache.get::<User>(1u64).await?.map(|u| u.name)
    );

    if let Some(stats) = cache.stats().await? {
        println!("\nHits: {}, misses: {}", stats.hits, stats.misses);
        println!("Hit ratio: {:.2}%", stats.hit_ratio() * 100.0);
    }
    println!("Slow tier holds {} entries", slow.len());

    Ok(())
}
