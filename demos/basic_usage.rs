//! # Basic Usage Example
//!
//! This example demonstrates the typed command façade:
//! - Building RedisHaus from configuration
//! - Storing and reading structs as JSON
//! - Expiry, counters and conditional writes

use redishaus::prelude::*;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Product {
    id: u32,
    name: String,
    price: f64,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("🚀 RedisHaus Basic Usage Example");
    println!("================================");

    let config = AppConfig {
        redis: RedisConfig::new("localhost".to_string(), 6379, 0).with_key_prefix("demo:"),
        cache: CacheConfig::default(),
    };
    let haus = RedisHaus::new(config)?;

    match haus.health_check().await {
        Ok(reply) => println!("✅ Redis connection healthy ({})", reply),
        Err(e) => {
            println!("❌ Redis connection failed: {}", e);
            println!("💡 Please start Redis: docker run -d --name redis -p 6379:6379 redis:7-alpine");
            return Ok(());
        }
    }

    let redis = haus.utils();

    // 1. Structs in, structs out
    println!("\n📦 Values");
    let laptop = Product {
        id: 1,
        name: "Laptop".to_string(),
        price: 999.0,
    };
    redis.set("product:1", &laptop).await?;
    let loaded: Option<Product> = redis.get("product:1").await?;
    println!("   Loaded typed: {:?}", loaded);
    let untyped: Option<Value> = redis.get("product:1").await?;
    println!("   Loaded untyped: {:?}", untyped);

    // 2. Expiry
    println!("\n⏱️  Expiry");
    redis
        .set_ex("session:abc", &"user-1", Duration::from_secs(30))
        .await?;
    println!("   session:abc expires in {}s", redis.get_expire("session:abc").await?);

    // 3. Counters
    println!("\n🔢 Counters");
    redis.increment("visits").await?;
    let visits = redis.increment_by("visits", 10).await?;
    println!("   visits = {}", visits);

    // 4. Conditional writes
    println!("\n🔒 Conditional writes");
    let first = redis.set_if_absent("lock:report", &"worker-1").await?;
    let second = redis.set_if_absent("lock:report", &"worker-2").await?;
    println!("   first acquire: {}, second acquire: {}", first, second);

    // 5. Keys
    println!("\n🔑 Keys under the demo: prefix");
    for key in redis.scan(&ScanOptions::all()).await? {
        println!("   {} ({})", key, redis.key_type(&key).await?);
    }

    let keys = redis.keys("*").await?;
    let removed = redis.delete_many(&keys).await?;
    println!("\n🧹 Removed {} demo keys", removed);

    Ok(())
}
