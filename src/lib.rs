//! # RedisHaus
//!
//! A typed async toolkit for Redis: one façade method per command with JSON
//! values, optional key namespacing, named caches with per-cache TTLs, and
//! cache key generation.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use redishaus::prelude::*;
//!
//! #[derive(Debug, Serialize, Deserialize)]
//! struct User {
//!     id: u64,
//!     name: String,
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = AppConfig {
//!         redis: RedisConfig::new("localhost".to_string(), 6379, 0).with_key_prefix("app:"),
//!         cache: CacheConfig::default().with_time_to_live(300),
//!     };
//!     let haus = RedisHaus::new(config)?;
//!
//!     let redis = haus.utils();
//!     redis.set("user:1", &User { id: 1, name: "Ada".to_string() }).await?;
//!     let user: Option<User> = redis.get("user:1").await?;
//!     println!("Loaded: {:?}", user);
//!
//!     let users = haus.cache_manager().get_cache("users").await;
//!     let name: String = users
//!         .get_or_load("1", || async { Ok("Ada".to_string()) })
//!         .await?;
//!     println!("Cached name: {}", name);
//!
//!     Ok(())
//! }
//! ```

pub mod core;
pub mod errors;
pub mod prelude;

// Re-export the main public types for convenience
pub use crate::core::{RedisHaus, RedisHausBuilder};
pub use errors::RedisHausError;

// Re-export centralized config
pub use config::{AppConfig, CacheConfig, RedisConfig};
