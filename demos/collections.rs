//! # Collections Example
//!
//! This example demonstrates hashes, lists, sets and sorted sets.

use redishaus::prelude::*;
use std::collections::HashMap;
use std::time::Duration;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("🚀 RedisHaus Collections Example");
    println!("===============================");

    let config = AppConfig {
        redis: RedisConfig::new("localhost".to_string(), 6379, 0).with_key_prefix("collections:"),
        cache: CacheConfig::default(),
    };
    let haus = RedisHaus::new(config)?;
    if let Err(e) = haus.health_check().await {
        println!("❌ Redis connection failed: {}", e);
        return Ok(());
    }
    let redis = haus.utils();

    // Hash
    println!("\n🗂️  Hash");
    redis
        .h_put_all(
            "user:1",
            [("name", json!("Ada")), ("lang", json!("en")), ("logins", json!(0))],
        )
        .await?;
    redis.h_increment("user:1", "logins", 1).await?;
    let user: HashMap<String, Value> = redis.h_get_all("user:1").await?;
    println!("   user:1 = {:?}", user);

    // List as a work queue
    println!("\n📋 List");
    redis.l_right_push_all("jobs", &["resize", "encode", "upload"]).await?;
    while let Some(job) = redis
        .l_blocking_left_pop::<String>("jobs", Duration::from_secs(1))
        .await?
    {
        println!("   processing {}", job);
    }

    // Set
    println!("\n🔖 Set");
    redis.s_add("tags:rust", &["fast", "safe", "fun"]).await?;
    redis.s_add("tags:go", &["fast", "simple"]).await?;
    let shared: Vec<String> = redis.s_intersect("tags:rust", &["tags:go"]).await?;
    println!("   shared tags: {:?}", shared);

    // Sorted set as a leaderboard
    println!("\n🏆 Sorted set");
    let scores = vec![
        TypedTuple::new("ada".to_string(), 120.0),
        TypedTuple::new("bob".to_string(), 95.0),
        TypedTuple::new("cy".to_string(), 140.0),
    ];
    redis.z_add_all("leaderboard", &scores).await?;
    redis.z_increment_score("leaderboard", &"bob", 50.0).await?;
    let top: Vec<TypedTuple<String>> = redis.z_reverse_range_with_scores("leaderboard", 0, 2).await?;
    for (rank, entry) in top.iter().enumerate() {
        println!("   #{} {} ({})", rank + 1, entry.value, entry.score);
    }

    let keys = redis.keys("*").await?;
    redis.delete_many(&keys).await?;
    println!("\n🧹 Cleaned up");

    Ok(())
}
