//! Typed façade over the Redis client
//!
//! [`RedisUtils`] exposes one async method per Redis command, grouped by data
//! type in the submodules. Writes accept anything `Serialize`; reads return
//! any `DeserializeOwned` type, converted through [`crate::convert`]. Ask for
//! [`serde_json::Value`] to get the untyped stored value.

mod hash;
mod keys;
mod list;
mod set;
mod string;
mod zset;

use crate::convert::{copy_list, copy_properties, copy_tuples};
use crate::errors::CacheResult;
use crate::template::RedisTemplate;
use crate::types::{ScanOptions, TypedTuple};
use redis::aio::ConnectionManager;
use serde::de::DeserializeOwned;
use std::sync::Arc;

/// Façade exposing typed operations for strings, hashes, lists, sets and sorted sets
#[derive(Debug, Clone)]
pub struct RedisUtils {
    template: Arc<RedisTemplate>,
}

impl RedisUtils {
    pub fn new(template: Arc<RedisTemplate>) -> Self {
        Self { template }
    }

    /// Underlying template, for commands the façade does not wrap
    pub fn template(&self) -> &RedisTemplate {
        &self.template
    }

    async fn conn(&self) -> CacheResult<ConnectionManager> {
        self.template.connection().await
    }

    fn decode<T: DeserializeOwned>(&self, raw: Option<Vec<u8>>) -> CacheResult<Option<T>> {
        copy_properties(self.template.deserialize_optional(raw)?)
    }

    fn decode_list<T: DeserializeOwned>(&self, raw: Vec<Vec<u8>>) -> CacheResult<Vec<T>> {
        copy_list(self.template.deserialize_values(raw)?)
    }

    fn decode_tuples<T: DeserializeOwned>(
        &self,
        raw: Vec<(Vec<u8>, f64)>,
    ) -> CacheResult<Vec<TypedTuple<T>>> {
        let tuples = raw
            .into_iter()
            .map(|(bytes, score)| Ok((self.template.deserialize_value(&bytes)?, score)))
            .collect::<CacheResult<Vec<_>>>()?;
        copy_tuples(tuples)
    }

    /// Run a SCAN-family command against `key` until the cursor wraps to zero
    async fn scan_member_pages(
        &self,
        command: &str,
        key: &str,
        options: &ScanOptions,
        pattern: Option<Vec<u8>>,
    ) -> CacheResult<Vec<Vec<u8>>> {
        let mut conn = self.conn().await?;
        let raw_key = self.template.raw_key(key);
        let mut cursor: u64 = 0;
        let mut collected = Vec::new();

        loop {
            let mut cmd = redis::cmd(command);
            cmd.arg(&raw_key).arg(cursor);
            options.apply(&mut cmd, pattern.clone());

            let (next, page): (u64, Vec<Vec<u8>>) = cmd.query_async(&mut conn).await?;
            collected.extend(page);
            if next == 0 {
                break;
            }
            cursor = next;
        }

        Ok(collected)
    }
}

/// Convert a `Duration` into whole seconds or milliseconds for expiry commands.
/// Values beyond `i64::MAX` saturate rather than wrap negative, since Redis
/// deletes a key given a negative expiry.
fn split_duration(duration: std::time::Duration) -> Expiry {
    if duration.subsec_nanos() == 0 {
        Expiry::Seconds(i64::try_from(duration.as_secs()).unwrap_or(i64::MAX))
    } else {
        Expiry::Millis(i64::try_from(duration.as_millis()).unwrap_or(i64::MAX).max(1))
    }
}

#[derive(Debug, PartialEq, Eq)]
enum Expiry {
    Seconds(i64),
    Millis(i64),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_whole_seconds_use_second_precision() {
        assert_eq!(split_duration(Duration::from_secs(60)), Expiry::Seconds(60));
    }

    #[test]
    fn test_fractional_durations_use_milliseconds() {
        assert_eq!(split_duration(Duration::from_millis(1500)), Expiry::Millis(1500));
        // Sub-millisecond values still expire rather than becoming zero
        assert_eq!(split_duration(Duration::from_micros(10)), Expiry::Millis(1));
    }

    #[test]
    fn test_huge_durations_saturate_instead_of_going_negative() {
        assert_eq!(split_duration(Duration::from_secs(u64::MAX)), Expiry::Seconds(i64::MAX));
        assert_eq!(split_duration(Duration::MAX), Expiry::Millis(i64::MAX));
        assert_eq!(
            split_duration(Duration::new(u64::MAX / 1000, 500_000_000)),
            Expiry::Millis(i64::MAX)
        );
    }
}
