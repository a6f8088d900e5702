//! Key and value serializers
//!
//! The template never talks to Redis in terms of Rust types. Keys go through a
//! [`KeySerializer`], stored values through a [`ValueSerializer`], and both can
//! be replaced by the application before the template is built.

use crate::errors::{CacheError, CacheResult};
use serde_json::Value;
use std::fmt::Debug;

/// Converts between logical keys and the bytes stored in Redis
pub trait KeySerializer: Send + Sync + Debug {
    fn serialize(&self, key: &str) -> Vec<u8>;

    fn deserialize(&self, bytes: &[u8]) -> CacheResult<String>;
}

/// Converts between untyped values and the bytes stored in Redis
pub trait ValueSerializer: Send + Sync + Debug {
    fn serialize(&self, value: &Value) -> CacheResult<Vec<u8>>;

    fn deserialize(&self, bytes: &[u8]) -> CacheResult<Value>;
}

/// UTF-8 key serializer with an optional namespace prefix
#[derive(Debug, Clone, Default)]
pub struct StringKeySerializer {
    prefix: Option<String>,
}

impl StringKeySerializer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_prefix(prefix: &str) -> Self {
        Self {
            prefix: (!prefix.is_empty()).then(|| prefix.to_string()),
        }
    }

    pub fn prefix(&self) -> Option<&str> {
        self.prefix.as_deref()
    }
}

impl KeySerializer for StringKeySerializer {
    fn serialize(&self, key: &str) -> Vec<u8> {
        match &self.prefix {
            Some(prefix) => format!("{}{}", prefix, key).into_bytes(),
            None => key.as_bytes().to_vec(),
        }
    }

    fn deserialize(&self, bytes: &[u8]) -> CacheResult<String> {
        let key = std::str::from_utf8(bytes)
            .map_err(|e| CacheError::InvalidKey(e.to_string()))?;

        let key = match &self.prefix {
            Some(prefix) => key.strip_prefix(prefix.as_str()).unwrap_or(key),
            None => key,
        };
        Ok(key.to_string())
    }
}

/// JSON value serializer backed by serde_json
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonValueSerializer;

impl ValueSerializer for JsonValueSerializer {
    fn serialize(&self, value: &Value) -> CacheResult<Vec<u8>> {
        Ok(serde_json::to_vec(value)?)
    }

    fn deserialize(&self, bytes: &[u8]) -> CacheResult<Value> {
        Ok(serde_json::from_slice(bytes)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_plain_key_round_trip() {
        let serializer = StringKeySerializer::new();
        assert_eq!(serializer.serialize("user:1"), b"user:1".to_vec());
        assert_eq!(serializer.deserialize(b"user:1").unwrap(), "user:1");
    }

    #[test]
    fn test_prefixed_key_is_stripped_on_read() {
        let serializer = StringKeySerializer::with_prefix("app:");
        assert_eq!(serializer.serialize("user:1"), b"app:user:1".to_vec());
        assert_eq!(serializer.deserialize(b"app:user:1").unwrap(), "user:1");
        // Keys written outside the namespace come back untouched
        assert_eq!(serializer.deserialize(b"other:1").unwrap(), "other:1");
    }

    #[test]
    fn test_empty_prefix_is_ignored() {
        let serializer = StringKeySerializer::with_prefix("");
        assert!(serializer.prefix().is_none());
        assert_eq!(serializer.serialize("k"), b"k".to_vec());
    }

    #[test]
    fn test_invalid_utf8_key_rejected() {
        let serializer = StringKeySerializer::new();
        let result = serializer.deserialize(&[0xff, 0xfe]);
        assert!(matches!(result, Err(CacheError::InvalidKey(_))));
    }

    #[test]
    fn test_counter_written_by_server_reads_as_number() {
        // INCR stores plain ASCII digits, which are valid JSON
        let value = JsonValueSerializer.deserialize(b"42").unwrap();
        assert_eq!(value, json!(42));
    }

    #[test]
    fn test_object_serialization_is_stable() {
        let a = JsonValueSerializer
            .serialize(&json!({"b": 1, "a": 2}))
            .unwrap();
        let b = JsonValueSerializer
            .serialize(&json!({"a": 2, "b": 1}))
            .unwrap();
        // Set and sorted-set membership compares raw bytes
        assert_eq!(a, b);
    }

    #[test]
    fn test_non_json_bytes_fail() {
        let result = JsonValueSerializer.deserialize(b"not json");
        assert!(matches!(result, Err(CacheError::SerializationError(_))));
    }
}
