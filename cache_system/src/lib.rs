//! Cache system for Redis
//!
//! This crate provides the [`RedisTemplate`] (connection plus key and value
//! serializers), the typed [`RedisUtils`] façade over it, and the named-cache
//! [`CacheManager`].

#[cfg(feature = "debug-logging")]
#[macro_export]
macro_rules! debug_log {
    ($($arg:tt)*) => {
        tracing::debug!($($arg)*)
    };
}

#[cfg(not(feature = "debug-logging"))]
#[macro_export]
macro_rules! debug_log {
    ($($arg:tt)*) => {};
}

#[cfg(feature = "debug-logging")]
#[macro_export]
macro_rules! trace_log {
    ($($arg:tt)*) => {
        tracing::trace!($($arg)*)
    };
}

#[cfg(not(feature = "debug-logging"))]
#[macro_export]
macro_rules! trace_log {
    ($($arg:tt)*) => {};
}

pub mod convert;
pub mod errors;
pub mod key_generator;
pub mod manager;
pub mod prelude;
pub mod serializer;
pub mod template;
pub mod types;
pub mod utils;

// Re-export centralized config
pub use config::{CacheConfig, RedisConfig};

pub use errors::{CacheError, CacheResult};
pub use key_generator::{KeyGenerator, SimpleKeyGenerator};
pub use manager::{Cache, CacheManager, RedisCache};
pub use serializer::{JsonValueSerializer, KeySerializer, StringKeySerializer, ValueSerializer};
pub use template::RedisTemplate;
pub use types::{DataType, ScanOptions, TypedTuple};
pub use utils::RedisUtils;
