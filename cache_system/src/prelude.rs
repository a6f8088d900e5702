//! Convenience re-exports for common cache-system usage

// Core cache system components
pub use crate::errors::{CacheError, CacheResult};
pub use crate::key_generator::{KeyGenerator, SimpleKeyGenerator};
pub use crate::manager::{Cache, CacheManager, RedisCache};
pub use crate::template::RedisTemplate;
pub use crate::types::{DataType, ScanOptions, TypedTuple};
pub use crate::utils::RedisUtils;

// Re-export centralized config
pub use config::{CacheConfig, RedisConfig};

// Common external dependencies
pub use async_trait::async_trait;
pub use chrono;
pub use redis;
pub use serde::{Deserialize, Serialize};
pub use serde_json;
pub use tokio;
