//! Error types for the RedisHaus crate
//!
//! This module contains all error types that can be returned by RedisHaus operations.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum RedisHausError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Cache error: {0}")]
    Cache(#[from] cache_system::CacheError),
}
