//! Generic type coercion for stored values
//!
//! Everything read back from Redis is first decoded into an untyped
//! [`serde_json::Value`]. These helpers turn that into whatever type the
//! caller asked for. A value is deserialized directly when possible; a string
//! that itself holds a JSON document is parsed as a second attempt, so values
//! written as pre-encoded JSON text still come back as structured types.

use crate::errors::{CacheError, CacheResult};
use crate::types::TypedTuple;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::HashMap;

/// Convert a single stored value, mapping absent and `null` to `None`
pub fn copy_properties<T: DeserializeOwned>(value: Option<Value>) -> CacheResult<Option<T>> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(value) => convert(value).map(Some),
    }
}

/// Convert every element of a list; `null` elements are an error
pub fn copy_list<T: DeserializeOwned>(values: Vec<Value>) -> CacheResult<Vec<T>> {
    values.into_iter().map(convert).collect()
}

/// Convert a positional list where missing entries must keep their slot
pub fn copy_optional_list<T: DeserializeOwned>(
    values: Vec<Option<Value>>,
) -> CacheResult<Vec<Option<T>>> {
    values.into_iter().map(copy_properties).collect()
}

/// Convert hash entries, skipping entries whose field or value is empty
pub fn copy_map<T: DeserializeOwned>(
    entries: Vec<(String, Value)>,
) -> CacheResult<HashMap<String, T>> {
    entries
        .into_iter()
        .filter(|(field, value)| !field.is_empty() && !is_empty(value))
        .map(|(field, value)| Ok((field, convert(value)?)))
        .collect()
}

/// Convert sorted-set members, keeping their scores
pub fn copy_tuples<T: DeserializeOwned>(
    tuples: Vec<(Value, f64)>,
) -> CacheResult<Vec<TypedTuple<T>>> {
    tuples
        .into_iter()
        .map(|(value, score)| Ok(TypedTuple::new(convert(value)?, score)))
        .collect()
}

pub(crate) fn convert<T: DeserializeOwned>(value: Value) -> CacheResult<T> {
    let direct_error = match serde_json::from_value::<T>(value.clone()) {
        Ok(converted) => return Ok(converted),
        Err(e) => e,
    };

    if let Value::String(text) = &value {
        if let Ok(converted) = serde_json::from_str::<T>(text) {
            return Ok(converted);
        }
    }

    Err(CacheError::Conversion {
        target: std::any::type_name::<T>(),
        reason: direct_error.to_string(),
    })
}

fn is_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
        _ => false,
    }
}
