//! Convenience re-exports for common RedisHaus usage
//!
//! # Example
//!
//! ```rust
//! use redishaus::prelude::*;
//!
//! let generator = SimpleKeyGenerator;
//! assert_eq!(generator.generate("Repo", "find", &[&7]), "Repofind7");
//! ```

// Core RedisHaus components
pub use crate::core::{RedisHaus, RedisHausBuilder};
pub use crate::errors::RedisHausError;

// Re-export centralized config
pub use config::{AppConfig, CacheConfig, ConfigError, RedisConfig};

// Re-export cache system
pub use cache_system::prelude::*;
pub use cache_system::{JsonValueSerializer, KeySerializer, StringKeySerializer, ValueSerializer};

// Common external dependencies
pub use serde_json::{Value, json};
