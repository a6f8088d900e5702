//! # Basic Caching Example
//!
//! This example demonstrates named caches:
//! - Per-cache TTL overrides
//! - Cache-aside loading with `get_or_load`
//! - Cache keys built by the key generator
//! - Eviction and clearing

use redishaus::prelude::*;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Report {
    month: u32,
    total: u64,
}

async fn build_report(month: u32) -> CacheResult<Report> {
    // Stand-in for an expensive query
    tokio::time::sleep(Duration::from_millis(300)).await;
    Ok(Report {
        month,
        total: 1000 + u64::from(month),
    })
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("🚀 RedisHaus Basic Caching Example");
    println!("==================================");

    let config = AppConfig {
        redis: RedisConfig::new("localhost".to_string(), 6379, 0),
        cache: CacheConfig::default()
            .with_time_to_live(600)
            .with_ttl_override("reports", 60),
    };
    let haus = RedisHaus::new(config)?;

    match haus.health_check().await {
        Ok(_) => println!("✅ Redis connection healthy"),
        Err(e) => {
            println!("❌ Redis connection failed: {}", e);
            println!("💡 Please start Redis: docker run -d --name redis -p 6379:6379 redis:7-alpine");
            return Ok(());
        }
    }

    let reports = haus.cache_manager().get_cache("reports").await;
    println!("\n🗄️  Cache '{}' with ttl {:?}", reports.name(), reports.ttl());

    let key = haus
        .key_generator()
        .generate("ReportService", "monthly", &[&3]);
    println!("   generated key: {}", reports.cache_key(&key));

    for attempt in 1..=2 {
        let started = Instant::now();
        let report: Report = reports.get_or_load(&key, || build_report(3)).await?;
        println!(
            "   attempt {}: {:?} in {:?}",
            attempt,
            report,
            started.elapsed()
        );
    }

    println!("\n♻️  Invalidation");
    println!("   evicted: {}", reports.evict(&key).await?);
    reports.put("scratch", &Report { month: 1, total: 1 }).await?;
    println!("   cleared {} entries", reports.clear().await?);
    println!("   caches: {:?}", haus.cache_manager().cache_names().await);

    Ok(())
}
