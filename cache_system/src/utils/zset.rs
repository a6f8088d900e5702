//! Sorted-set commands
//!
//! Ranges are returned in server order as `Vec`s; members are ordered by score
//! ascending unless the method name says `reverse`.

use super::RedisUtils;
use crate::errors::{CacheError, CacheResult};
use crate::types::{ScanOptions, TypedTuple};
use redis::AsyncCommands;
use serde::Serialize;
use serde::de::DeserializeOwned;

impl RedisUtils {
    /// Add or update a member, returning whether it was newly added
    pub async fn z_add<V: Serialize + ?Sized>(&self, key: &str, value: &V, score: f64) -> CacheResult<bool> {
        let raw_value = self.template.raw_value(value)?;
        let mut conn = self.conn().await?;
        let added: i64 = conn.zadd(self.template.raw_key(key), raw_value, score).await?;
        Ok(added > 0)
    }

    /// Add several scored members, returning how many were new
    pub async fn z_add_all<V: Serialize>(&self, key: &str, tuples: &[TypedTuple<V>]) -> CacheResult<i64> {
        if tuples.is_empty() {
            return Ok(0);
        }

        let items = tuples
            .iter()
            .map(|tuple| Ok((tuple.score, self.template.raw_value(&tuple.value)?)))
            .collect::<CacheResult<Vec<_>>>()?;
        let mut conn = self.conn().await?;
        let added: i64 = conn.zadd_multiple(self.template.raw_key(key), &items).await?;
        Ok(added)
    }

    pub async fn z_remove<V: Serialize>(&self, key: &str, values: &[V]) -> CacheResult<i64> {
        if values.is_empty() {
            return Ok(0);
        }

        let raw_values = self.template.raw_values(values)?;
        let mut conn = self.conn().await?;
        let removed: i64 = conn.zrem(self.template.raw_key(key), raw_values).await?;
        Ok(removed)
    }

    /// Add `delta` to the member's score, returning the new score
    pub async fn z_increment_score<V: Serialize + ?Sized>(
        &self,
        key: &str,
        value: &V,
        delta: f64,
    ) -> CacheResult<f64> {
        let raw_value = self.template.raw_value(value)?;
        let mut conn = self.conn().await?;
        let score: f64 = conn.zincr(self.template.raw_key(key), raw_value, delta).await?;
        Ok(score)
    }

    /// Zero-based rank by ascending score
    pub async fn z_rank<V: Serialize + ?Sized>(&self, key: &str, value: &V) -> CacheResult<Option<i64>> {
        let raw_value = self.template.raw_value(value)?;
        let mut conn = self.conn().await?;
        let rank: Option<i64> = conn.zrank(self.template.raw_key(key), raw_value).await?;
        Ok(rank)
    }

    /// Zero-based rank by descending score
    pub async fn z_reverse_rank<V: Serialize + ?Sized>(&self, key: &str, value: &V) -> CacheResult<Option<i64>> {
        let raw_value = self.template.raw_value(value)?;
        let mut conn = self.conn().await?;
        let rank: Option<i64> = conn.zrevrank(self.template.raw_key(key), raw_value).await?;
        Ok(rank)
    }

    pub async fn z_range<T: DeserializeOwned>(&self, key: &str, start: i64, end: i64) -> CacheResult<Vec<T>> {
        let mut conn = self.conn().await?;
        let raw: Vec<Vec<u8>> = conn
            .zrange(self.template.raw_key(key), start as isize, end as isize)
            .await?;
        self.decode_list(raw)
    }

    pub async fn z_range_with_scores<T: DeserializeOwned>(
        &self,
        key: &str,
        start: i64,
        end: i64,
    ) -> CacheResult<Vec<TypedTuple<T>>> {
        let mut conn = self.conn().await?;
        let raw: Vec<(Vec<u8>, f64)> = conn
            .zrange_withscores(self.template.raw_key(key), start as isize, end as isize)
            .await?;
        self.decode_tuples(raw)
    }

    pub async fn z_range_by_score<T: DeserializeOwned>(&self, key: &str, min: f64, max: f64) -> CacheResult<Vec<T>> {
        let mut conn = self.conn().await?;
        let raw: Vec<Vec<u8>> = conn.zrangebyscore(self.template.raw_key(key), min, max).await?;
        self.decode_list(raw)
    }

    pub async fn z_range_by_score_with_scores<T: DeserializeOwned>(
        &self,
        key: &str,
        min: f64,
        max: f64,
    ) -> CacheResult<Vec<TypedTuple<T>>> {
        let mut conn = self.conn().await?;
        let raw: Vec<(Vec<u8>, f64)> = conn
            .zrangebyscore_withscores(self.template.raw_key(key), min, max)
            .await?;
        self.decode_tuples(raw)
    }

    /// Scored members within `[min, max]`, paged by `offset` and `count`
    pub async fn z_range_by_score_with_scores_limit<T: DeserializeOwned>(
        &self,
        key: &str,
        min: f64,
        max: f64,
        offset: i64,
        count: i64,
    ) -> CacheResult<Vec<TypedTuple<T>>> {
        let mut conn = self.conn().await?;
        let raw: Vec<(Vec<u8>, f64)> = conn
            .zrangebyscore_limit_withscores(
                self.template.raw_key(key),
                min,
                max,
                offset as isize,
                count as isize,
            )
            .await?;
        self.decode_tuples(raw)
    }

    pub async fn z_reverse_range<T: DeserializeOwned>(&self, key: &str, start: i64, end: i64) -> CacheResult<Vec<T>> {
        let mut conn = self.conn().await?;
        let raw: Vec<Vec<u8>> = conn
            .zrevrange(self.template.raw_key(key), start as isize, end as isize)
            .await?;
        self.decode_list(raw)
    }

    pub async fn z_reverse_range_with_scores<T: DeserializeOwned>(
        &self,
        key: &str,
        start: i64,
        end: i64,
    ) -> CacheResult<Vec<TypedTuple<T>>> {
        let mut conn = self.conn().await?;
        let raw: Vec<(Vec<u8>, f64)> = conn
            .zrevrange_withscores(self.template.raw_key(key), start as isize, end as isize)
            .await?;
        self.decode_tuples(raw)
    }

    /// Members within `[min, max]`, highest score first
    pub async fn z_reverse_range_by_score<T: DeserializeOwned>(
        &self,
        key: &str,
        min: f64,
        max: f64,
    ) -> CacheResult<Vec<T>> {
        let mut conn = self.conn().await?;
        let raw: Vec<Vec<u8>> = conn.zrevrangebyscore(self.template.raw_key(key), max, min).await?;
        self.decode_list(raw)
    }

    pub async fn z_reverse_range_by_score_with_scores<T: DeserializeOwned>(
        &self,
        key: &str,
        min: f64,
        max: f64,
    ) -> CacheResult<Vec<TypedTuple<T>>> {
        let mut conn = self.conn().await?;
        let raw: Vec<(Vec<u8>, f64)> = conn
            .zrevrangebyscore_withscores(self.template.raw_key(key), max, min)
            .await?;
        self.decode_tuples(raw)
    }

    /// Members within `[min, max]`, highest score first, paged by `offset` and `count`
    pub async fn z_reverse_range_by_score_limit<T: DeserializeOwned>(
        &self,
        key: &str,
        min: f64,
        max: f64,
        offset: i64,
        count: i64,
    ) -> CacheResult<Vec<T>> {
        let mut conn = self.conn().await?;
        let raw: Vec<Vec<u8>> = conn
            .zrevrangebyscore_limit(
                self.template.raw_key(key),
                max,
                min,
                offset as isize,
                count as isize,
            )
            .await?;
        self.decode_list(raw)
    }

    /// Number of members with a score within `[min, max]`
    pub async fn z_count(&self, key: &str, min: f64, max: f64) -> CacheResult<i64> {
        let mut conn = self.conn().await?;
        let count: i64 = conn.zcount(self.template.raw_key(key), min, max).await?;
        Ok(count)
    }

    pub async fn z_size(&self, key: &str) -> CacheResult<i64> {
        let mut conn = self.conn().await?;
        let size: i64 = conn.zcard(self.template.raw_key(key)).await?;
        Ok(size)
    }

    pub async fn z_score<V: Serialize + ?Sized>(&self, key: &str, value: &V) -> CacheResult<Option<f64>> {
        let raw_value = self.template.raw_value(value)?;
        let mut conn = self.conn().await?;
        let score: Option<f64> = conn.zscore(self.template.raw_key(key), raw_value).await?;
        Ok(score)
    }

    /// Remove members ranked between `start` and `end`
    pub async fn z_remove_range(&self, key: &str, start: i64, end: i64) -> CacheResult<i64> {
        let mut conn = self.conn().await?;
        let removed: i64 = conn
            .zremrangebyrank(self.template.raw_key(key), start as isize, end as isize)
            .await?;
        Ok(removed)
    }

    pub async fn z_remove_range_by_score(&self, key: &str, min: f64, max: f64) -> CacheResult<i64> {
        let mut conn = self.conn().await?;
        let removed: i64 = conn.zrembyscore(self.template.raw_key(key), min, max).await?;
        Ok(removed)
    }

    /// Store the union of `key` and `other_keys` (scores summed) into `dest_key`
    pub async fn z_union_and_store<K: AsRef<str>>(
        &self,
        key: &str,
        other_keys: &[K],
        dest_key: &str,
    ) -> CacheResult<i64> {
        self.z_store("ZUNIONSTORE", key, other_keys, dest_key).await
    }

    /// Store the intersection of `key` and `other_keys` (scores summed) into `dest_key`
    pub async fn z_intersect_and_store<K: AsRef<str>>(
        &self,
        key: &str,
        other_keys: &[K],
        dest_key: &str,
    ) -> CacheResult<i64> {
        self.z_store("ZINTERSTORE", key, other_keys, dest_key).await
    }

    /// Iterate the sorted set with `ZSCAN`, collecting every matching member.
    /// The pattern is matched against the serialized member bytes.
    pub async fn z_scan<T: DeserializeOwned>(
        &self,
        key: &str,
        options: &ScanOptions,
    ) -> CacheResult<Vec<TypedTuple<T>>> {
        let pattern = options.pattern.as_ref().map(|p| p.as_bytes().to_vec());
        let flat = self.scan_member_pages("ZSCAN", key, options, pattern).await?;

        let mut tuples = Vec::with_capacity(flat.len() / 2);
        let mut iter = flat.into_iter();
        while let (Some(member), Some(score)) = (iter.next(), iter.next()) {
            tuples.push((member, parse_score(&score)?));
        }
        self.decode_tuples(tuples)
    }

    async fn z_store<K: AsRef<str>>(
        &self,
        command: &str,
        key: &str,
        other_keys: &[K],
        dest_key: &str,
    ) -> CacheResult<i64> {
        let mut conn = self.conn().await?;
        let stored: i64 = redis::cmd(command)
            .arg(self.template.raw_key(dest_key))
            .arg(other_keys.len() + 1)
            .arg(self.template.raw_key(key))
            .arg(self.template.raw_keys(other_keys))
            .query_async(&mut conn)
            .await?;
        Ok(stored)
    }
}

fn parse_score(raw: &[u8]) -> CacheResult<f64> {
    let text = String::from_utf8_lossy(raw);
    match text.as_ref() {
        "inf" | "+inf" => Ok(f64::INFINITY),
        "-inf" => Ok(f64::NEG_INFINITY),
        other => other.parse().map_err(|_| CacheError::Conversion {
            target: "f64",
            reason: format!("invalid score '{}'", other),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_score_values() {
        assert_eq!(parse_score(b"1.5").unwrap(), 1.5);
        assert_eq!(parse_score(b"-3").unwrap(), -3.0);
        assert_eq!(parse_score(b"inf").unwrap(), f64::INFINITY);
        assert_eq!(parse_score(b"-inf").unwrap(), f64::NEG_INFINITY);
        assert!(matches!(parse_score(b"abc"), Err(CacheError::Conversion { .. })));
    }
}
