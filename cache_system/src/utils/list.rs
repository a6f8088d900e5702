//! List commands

use super::RedisUtils;
use crate::errors::CacheResult;
use redis::AsyncCommands;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::time::Duration;

impl RedisUtils {
    /// Element at `index` (negative indexes count from the tail)
    pub async fn l_index<T: DeserializeOwned>(&self, key: &str, index: i64) -> CacheResult<Option<T>> {
        let mut conn = self.conn().await?;
        let raw: Option<Vec<u8>> = conn.lindex(self.template.raw_key(key), index as isize).await?;
        self.decode(raw)
    }

    /// Elements between `start` and `end`, both inclusive
    pub async fn l_range<T: DeserializeOwned>(&self, key: &str, start: i64, end: i64) -> CacheResult<Vec<T>> {
        let mut conn = self.conn().await?;
        let raw: Vec<Vec<u8>> = conn
            .lrange(self.template.raw_key(key), start as isize, end as isize)
            .await?;
        self.decode_list(raw)
    }

    pub async fn l_left_push<V: Serialize + ?Sized>(&self, key: &str, value: &V) -> CacheResult<i64> {
        let raw_value = self.template.raw_value(value)?;
        let mut conn = self.conn().await?;
        let length: i64 = conn.lpush(self.template.raw_key(key), raw_value).await?;
        Ok(length)
    }

    pub async fn l_left_push_all<V: Serialize>(&self, key: &str, values: &[V]) -> CacheResult<i64> {
        self.push_all("LPUSH", key, values).await
    }

    /// Push to the head only when the list already exists
    pub async fn l_left_push_if_present<V: Serialize + ?Sized>(
        &self,
        key: &str,
        value: &V,
    ) -> CacheResult<i64> {
        let raw_value = self.template.raw_value(value)?;
        let mut conn = self.conn().await?;
        let length: i64 = conn.lpush_exists(self.template.raw_key(key), raw_value).await?;
        Ok(length)
    }

    /// Insert `value` before the first occurrence of `pivot`
    pub async fn l_insert_before<P, V>(&self, key: &str, pivot: &P, value: &V) -> CacheResult<i64>
    where
        P: Serialize + ?Sized,
        V: Serialize + ?Sized,
    {
        self.insert("BEFORE", key, pivot, value).await
    }

    pub async fn l_right_push<V: Serialize + ?Sized>(&self, key: &str, value: &V) -> CacheResult<i64> {
        let raw_value = self.template.raw_value(value)?;
        let mut conn = self.conn().await?;
        let length: i64 = conn.rpush(self.template.raw_key(key), raw_value).await?;
        Ok(length)
    }

    pub async fn l_right_push_all<V: Serialize>(&self, key: &str, values: &[V]) -> CacheResult<i64> {
        self.push_all("RPUSH", key, values).await
    }

    /// Push to the tail only when the list already exists
    pub async fn l_right_push_if_present<V: Serialize + ?Sized>(
        &self,
        key: &str,
        value: &V,
    ) -> CacheResult<i64> {
        let raw_value = self.template.raw_value(value)?;
        let mut conn = self.conn().await?;
        let length: i64 = conn.rpush_exists(self.template.raw_key(key), raw_value).await?;
        Ok(length)
    }

    /// Insert `value` after the first occurrence of `pivot`
    pub async fn l_insert_after<P, V>(&self, key: &str, pivot: &P, value: &V) -> CacheResult<i64>
    where
        P: Serialize + ?Sized,
        V: Serialize + ?Sized,
    {
        self.insert("AFTER", key, pivot, value).await
    }

    pub async fn l_set<V: Serialize + ?Sized>(&self, key: &str, index: i64, value: &V) -> CacheResult<()> {
        let raw_value = self.template.raw_value(value)?;
        let mut conn = self.conn().await?;
        let _: () = conn
            .lset(self.template.raw_key(key), index as isize, raw_value)
            .await?;
        Ok(())
    }

    pub async fn l_left_pop<T: DeserializeOwned>(&self, key: &str) -> CacheResult<Option<T>> {
        let mut conn = self.conn().await?;
        let raw: Option<Vec<u8>> = redis::cmd("LPOP")
            .arg(self.template.raw_key(key))
            .query_async(&mut conn)
            .await?;
        self.decode(raw)
    }

    /// Wait up to `timeout` for an element at the head
    pub async fn l_blocking_left_pop<T: DeserializeOwned>(
        &self,
        key: &str,
        timeout: Duration,
    ) -> CacheResult<Option<T>> {
        self.blocking_pop("BLPOP", key, timeout).await
    }

    pub async fn l_right_pop<T: DeserializeOwned>(&self, key: &str) -> CacheResult<Option<T>> {
        let mut conn = self.conn().await?;
        let raw: Option<Vec<u8>> = redis::cmd("RPOP")
            .arg(self.template.raw_key(key))
            .query_async(&mut conn)
            .await?;
        self.decode(raw)
    }

    /// Wait up to `timeout` for an element at the tail
    pub async fn l_blocking_right_pop<T: DeserializeOwned>(
        &self,
        key: &str,
        timeout: Duration,
    ) -> CacheResult<Option<T>> {
        self.blocking_pop("BRPOP", key, timeout).await
    }

    /// Move the tail of `source_key` to the head of `destination_key`
    pub async fn l_right_pop_and_left_push<T: DeserializeOwned>(
        &self,
        source_key: &str,
        destination_key: &str,
    ) -> CacheResult<Option<T>> {
        let mut conn = self.conn().await?;
        let raw: Option<Vec<u8>> = conn
            .rpoplpush(
                self.template.raw_key(source_key),
                self.template.raw_key(destination_key),
            )
            .await?;
        self.decode(raw)
    }

    pub async fn l_blocking_right_pop_and_left_push<T: DeserializeOwned>(
        &self,
        source_key: &str,
        destination_key: &str,
        timeout: Duration,
    ) -> CacheResult<Option<T>> {
        trace_log!("BRPOPLPUSH {} -> {} waiting {:?}", source_key, destination_key, timeout);
        let mut conn = self.template.dedicated_connection().await?;
        let raw: Option<Vec<u8>> = redis::cmd("BRPOPLPUSH")
            .arg(self.template.raw_key(source_key))
            .arg(self.template.raw_key(destination_key))
            .arg(timeout.as_secs_f64())
            .query_async(&mut conn)
            .await?;
        self.decode(raw)
    }

    /// Remove occurrences of `value`: `count > 0` from the head, `< 0` from the tail, `0` all
    pub async fn l_remove<V: Serialize + ?Sized>(&self, key: &str, count: i64, value: &V) -> CacheResult<i64> {
        let raw_value = self.template.raw_value(value)?;
        let mut conn = self.conn().await?;
        let removed: i64 = conn
            .lrem(self.template.raw_key(key), count as isize, raw_value)
            .await?;
        Ok(removed)
    }

    /// Keep only the elements between `start` and `end`
    pub async fn l_trim(&self, key: &str, start: i64, end: i64) -> CacheResult<()> {
        let mut conn = self.conn().await?;
        let _: () = conn
            .ltrim(self.template.raw_key(key), start as isize, end as isize)
            .await?;
        Ok(())
    }

    pub async fn l_len(&self, key: &str) -> CacheResult<i64> {
        let mut conn = self.conn().await?;
        let length: i64 = conn.llen(self.template.raw_key(key)).await?;
        Ok(length)
    }

    async fn push_all<V: Serialize>(&self, command: &str, key: &str, values: &[V]) -> CacheResult<i64> {
        if values.is_empty() {
            return Ok(0);
        }

        let raw_values = self.template.raw_values(values)?;
        let mut conn = self.conn().await?;
        let length: i64 = redis::cmd(command)
            .arg(self.template.raw_key(key))
            .arg(raw_values)
            .query_async(&mut conn)
            .await?;
        Ok(length)
    }

    async fn insert<P, V>(&self, position: &str, key: &str, pivot: &P, value: &V) -> CacheResult<i64>
    where
        P: Serialize + ?Sized,
        V: Serialize + ?Sized,
    {
        let raw_pivot = self.template.raw_value(pivot)?;
        let raw_value = self.template.raw_value(value)?;
        let mut conn = self.conn().await?;
        let length: i64 = redis::cmd("LINSERT")
            .arg(self.template.raw_key(key))
            .arg(position)
            .arg(raw_pivot)
            .arg(raw_value)
            .query_async(&mut conn)
            .await?;
        Ok(length)
    }

    /// Blocking pops get their own connection so they never stall the shared one
    async fn blocking_pop<T: DeserializeOwned>(
        &self,
        command: &str,
        key: &str,
        timeout: Duration,
    ) -> CacheResult<Option<T>> {
        trace_log!("{} {} waiting {:?}", command, key, timeout);
        let mut conn = self.template.dedicated_connection().await?;
        let popped: Option<(Vec<u8>, Vec<u8>)> = redis::cmd(command)
            .arg(self.template.raw_key(key))
            .arg(timeout.as_secs_f64())
            .query_async(&mut conn)
            .await?;
        self.decode(popped.map(|(_, value)| value))
    }
}
