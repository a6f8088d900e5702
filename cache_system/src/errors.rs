//! Error types for cache operations
//!
//! This module defines all error types that can occur
//! during template, façade and cache manager operations.

use thiserror::Error;

/// Cache system errors
#[derive(Error, Debug)]
pub enum CacheError {
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Connection pool error: {0}")]
    Connection(String),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Cannot convert stored value into {target}: {reason}")]
    Conversion { target: &'static str, reason: String },

    #[error("Invalid key bytes: {0}")]
    InvalidKey(String),

    #[error("Connection timeout after {0}ms")]
    Timeout(u64),

    #[error("Cache '{0}' does not allow null values")]
    NullValueNotAllowed(String),

    #[error("Unknown data type reply: {0}")]
    UnknownDataType(String),
}

pub type CacheResult<T> = Result<T, CacheError>;
