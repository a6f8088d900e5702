//! Small value types shared by the façade

use crate::errors::CacheError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Sorted-set member together with its score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypedTuple<T> {
    pub value: T,
    pub score: f64,
}

impl<T> TypedTuple<T> {
    pub fn new(value: T, score: f64) -> Self {
        Self { value, score }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> TypedTuple<U> {
        TypedTuple {
            value: f(self.value),
            score: self.score,
        }
    }
}

/// Type of the value stored at a key, as reported by `TYPE`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataType {
    None,
    String,
    List,
    Set,
    ZSet,
    Hash,
    Stream,
}

impl DataType {
    pub fn code(&self) -> &'static str {
        match self {
            DataType::None => "none",
            DataType::String => "string",
            DataType::List => "list",
            DataType::Set => "set",
            DataType::ZSet => "zset",
            DataType::Hash => "hash",
            DataType::Stream => "stream",
        }
    }
}

impl FromStr for DataType {
    type Err = CacheError;

    fn from_str(code: &str) -> Result<Self, Self::Err> {
        match code.to_ascii_lowercase().as_str() {
            "none" => Ok(DataType::None),
            "string" => Ok(DataType::String),
            "list" => Ok(DataType::List),
            "set" => Ok(DataType::Set),
            "zset" => Ok(DataType::ZSet),
            "hash" => Ok(DataType::Hash),
            "stream" => Ok(DataType::Stream),
            other => Err(CacheError::UnknownDataType(other.to_string())),
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// `MATCH` / `COUNT` options for the SCAN command family
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanOptions {
    pub pattern: Option<String>,
    pub count: Option<usize>,
}

impl ScanOptions {
    /// Options that match everything with the server default batch size
    pub fn all() -> Self {
        Self::default()
    }

    pub fn pattern(mut self, pattern: &str) -> Self {
        self.pattern = Some(pattern.to_string());
        self
    }

    pub fn count(mut self, count: usize) -> Self {
        self.count = Some(count);
        self
    }

    /// Append `MATCH`/`COUNT` arguments to a SCAN-family command
    pub(crate) fn apply(&self, cmd: &mut redis::Cmd, pattern: Option<Vec<u8>>) {
        if let Some(pattern) = pattern {
            cmd.arg("MATCH").arg(pattern);
        }
        if let Some(count) = self.count {
            cmd.arg("COUNT").arg(count);
        }
    }
}
