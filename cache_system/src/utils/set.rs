//! Set commands

use super::RedisUtils;
use crate::errors::CacheResult;
use crate::types::ScanOptions;
use redis::AsyncCommands;
use serde::Serialize;
use serde::de::DeserializeOwned;

impl RedisUtils {
    /// Add members, returning how many were new
    pub async fn s_add<V: Serialize>(&self, key: &str, values: &[V]) -> CacheResult<i64> {
        if values.is_empty() {
            return Ok(0);
        }

        let raw_values = self.template.raw_values(values)?;
        let mut conn = self.conn().await?;
        let added: i64 = conn.sadd(self.template.raw_key(key), raw_values).await?;
        Ok(added)
    }

    pub async fn s_remove<V: Serialize>(&self, key: &str, values: &[V]) -> CacheResult<i64> {
        if values.is_empty() {
            return Ok(0);
        }

        let raw_values = self.template.raw_values(values)?;
        let mut conn = self.conn().await?;
        let removed: i64 = conn.srem(self.template.raw_key(key), raw_values).await?;
        Ok(removed)
    }

    /// Remove and return a random member
    pub async fn s_pop<T: DeserializeOwned>(&self, key: &str) -> CacheResult<Option<T>> {
        let mut conn = self.conn().await?;
        let raw: Option<Vec<u8>> = redis::cmd("SPOP")
            .arg(self.template.raw_key(key))
            .query_async(&mut conn)
            .await?;
        self.decode(raw)
    }

    /// Move `value` from `key` to `dest_key`
    pub async fn s_move<V: Serialize + ?Sized>(&self, key: &str, value: &V, dest_key: &str) -> CacheResult<bool> {
        let raw_value = self.template.raw_value(value)?;
        let mut conn = self.conn().await?;
        let moved: bool = conn
            .smove(self.template.raw_key(key), self.template.raw_key(dest_key), raw_value)
            .await?;
        Ok(moved)
    }

    pub async fn s_size(&self, key: &str) -> CacheResult<i64> {
        let mut conn = self.conn().await?;
        let size: i64 = conn.scard(self.template.raw_key(key)).await?;
        Ok(size)
    }

    pub async fn s_is_member<V: Serialize + ?Sized>(&self, key: &str, value: &V) -> CacheResult<bool> {
        let raw_value = self.template.raw_value(value)?;
        let mut conn = self.conn().await?;
        let member: bool = conn.sismember(self.template.raw_key(key), raw_value).await?;
        Ok(member)
    }

    /// Members present in `key` and every one of `other_keys`
    pub async fn s_intersect<T, K>(&self, key: &str, other_keys: &[K]) -> CacheResult<Vec<T>>
    where
        T: DeserializeOwned,
        K: AsRef<str>,
    {
        self.combine("SINTER", key, other_keys).await
    }

    pub async fn s_intersect_and_store<K: AsRef<str>>(
        &self,
        key: &str,
        other_keys: &[K],
        dest_key: &str,
    ) -> CacheResult<i64> {
        self.combine_and_store("SINTERSTORE", key, other_keys, dest_key).await
    }

    pub async fn s_union<T, K>(&self, key: &str, other_keys: &[K]) -> CacheResult<Vec<T>>
    where
        T: DeserializeOwned,
        K: AsRef<str>,
    {
        self.combine("SUNION", key, other_keys).await
    }

    pub async fn s_union_and_store<K: AsRef<str>>(
        &self,
        key: &str,
        other_keys: &[K],
        dest_key: &str,
    ) -> CacheResult<i64> {
        self.combine_and_store("SUNIONSTORE", key, other_keys, dest_key).await
    }

    /// Members of `key` that are in none of `other_keys`
    pub async fn s_difference<T, K>(&self, key: &str, other_keys: &[K]) -> CacheResult<Vec<T>>
    where
        T: DeserializeOwned,
        K: AsRef<str>,
    {
        self.combine("SDIFF", key, other_keys).await
    }

    pub async fn s_difference_and_store<K: AsRef<str>>(
        &self,
        key: &str,
        other_keys: &[K],
        dest_key: &str,
    ) -> CacheResult<i64> {
        self.combine_and_store("SDIFFSTORE", key, other_keys, dest_key).await
    }

    pub async fn s_members<T: DeserializeOwned>(&self, key: &str) -> CacheResult<Vec<T>> {
        let mut conn = self.conn().await?;
        let raw: Vec<Vec<u8>> = conn.smembers(self.template.raw_key(key)).await?;
        self.decode_list(raw)
    }

    pub async fn s_random_member<T: DeserializeOwned>(&self, key: &str) -> CacheResult<Option<T>> {
        let mut conn = self.conn().await?;
        let raw: Option<Vec<u8>> = conn.srandmember(self.template.raw_key(key)).await?;
        self.decode(raw)
    }

    /// `count` random members; the same member may be returned more than once
    pub async fn s_random_members<T: DeserializeOwned>(&self, key: &str, count: u64) -> CacheResult<Vec<T>> {
        self.random_members(key, random_member_count(count, false)).await
    }

    /// Up to `count` distinct random members
    pub async fn s_distinct_random_members<T: DeserializeOwned>(
        &self,
        key: &str,
        count: u64,
    ) -> CacheResult<Vec<T>> {
        self.random_members(key, random_member_count(count, true)).await
    }

    /// Iterate the set with `SSCAN`, collecting every matching member.
    /// The pattern is matched against the serialized member bytes.
    pub async fn s_scan<T: DeserializeOwned>(&self, key: &str, options: &ScanOptions) -> CacheResult<Vec<T>> {
        let pattern = options.pattern.as_ref().map(|p| p.as_bytes().to_vec());
        let raw = self.scan_member_pages("SSCAN", key, options, pattern).await?;
        self.decode_list(raw)
    }

    async fn random_members<T: DeserializeOwned>(&self, key: &str, count: i64) -> CacheResult<Vec<T>> {
        if count == 0 {
            return Ok(Vec::new());
        }

        let mut conn = self.conn().await?;
        let raw: Vec<Vec<u8>> = redis::cmd("SRANDMEMBER")
            .arg(self.template.raw_key(key))
            .arg(count)
            .query_async(&mut conn)
            .await?;
        self.decode_list(raw)
    }

    async fn combine<T, K>(&self, command: &str, key: &str, other_keys: &[K]) -> CacheResult<Vec<T>>
    where
        T: DeserializeOwned,
        K: AsRef<str>,
    {
        let mut conn = self.conn().await?;
        let raw: Vec<Vec<u8>> = redis::cmd(command)
            .arg(self.template.raw_key(key))
            .arg(self.template.raw_keys(other_keys))
            .query_async(&mut conn)
            .await?;
        self.decode_list(raw)
    }

    async fn combine_and_store<K: AsRef<str>>(
        &self,
        command: &str,
        key: &str,
        other_keys: &[K],
        dest_key: &str,
    ) -> CacheResult<i64> {
        let mut conn = self.conn().await?;
        let stored: i64 = redis::cmd(command)
            .arg(self.template.raw_key(dest_key))
            .arg(self.template.raw_key(key))
            .arg(self.template.raw_keys(other_keys))
            .query_async(&mut conn)
            .await?;
        Ok(stored)
    }
}

/// `SRANDMEMBER` count argument; negative asks for repeats, saturating at `i64::MAX`
fn random_member_count(count: u64, distinct: bool) -> i64 {
    let count = i64::try_from(count).unwrap_or(i64::MAX);
    if distinct { count } else { -count }
}
