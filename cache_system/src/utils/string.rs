//! String (value) commands

use super::{Expiry, RedisUtils, split_duration};
use crate::convert::copy_optional_list;
use crate::errors::CacheResult;
use redis::AsyncCommands;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::time::Duration;

impl RedisUtils {
    pub async fn set<V: Serialize + ?Sized>(&self, key: &str, value: &V) -> CacheResult<()> {
        let raw_value = self.template.raw_value(value)?;
        let mut conn = self.conn().await?;
        let _: () = conn.set(self.template.raw_key(key), raw_value).await?;
        Ok(())
    }

    /// Value at `key` converted into `T`
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> CacheResult<Option<T>> {
        let mut conn = self.conn().await?;
        let raw: Option<Vec<u8>> = conn.get(self.template.raw_key(key)).await?;
        self.decode(raw)
    }

    /// Raw substring of the stored bytes, inclusive on both ends
    pub async fn get_range(&self, key: &str, start: i64, end: i64) -> CacheResult<String> {
        let mut conn = self.conn().await?;
        let range: String = conn
            .getrange(self.template.raw_key(key), start as isize, end as isize)
            .await?;
        Ok(range)
    }

    /// Store `value` and return the previous value
    pub async fn get_and_set<T, V>(&self, key: &str, value: &V) -> CacheResult<Option<T>>
    where
        T: DeserializeOwned,
        V: Serialize + ?Sized,
    {
        let raw_value = self.template.raw_value(value)?;
        let mut conn = self.conn().await?;
        let previous: Option<Vec<u8>> = redis::cmd("GETSET")
            .arg(self.template.raw_key(key))
            .arg(raw_value)
            .query_async(&mut conn)
            .await?;
        self.decode(previous)
    }

    pub async fn get_bit(&self, key: &str, offset: u64) -> CacheResult<bool> {
        let mut conn = self.conn().await?;
        let bit: bool = redis::cmd("GETBIT")
            .arg(self.template.raw_key(key))
            .arg(offset)
            .query_async(&mut conn)
            .await?;
        Ok(bit)
    }

    /// Values for several keys; missing keys keep their position as `None`
    pub async fn multi_get<T, K>(&self, keys: &[K]) -> CacheResult<Vec<Option<T>>>
    where
        T: DeserializeOwned,
        K: AsRef<str>,
    {
        if keys.is_empty() {
            return Ok(Vec::new());
        }

        let mut conn = self.conn().await?;
        let raw: Vec<Option<Vec<u8>>> = redis::cmd("MGET")
            .arg(self.template.raw_keys(keys))
            .query_async(&mut conn)
            .await?;

        let values = raw
            .into_iter()
            .map(|entry| self.template.deserialize_optional(entry))
            .collect::<CacheResult<Vec<_>>>()?;
        copy_optional_list(values)
    }

    /// Set or clear a single bit, returning its previous value
    pub async fn set_bit(&self, key: &str, offset: u64, value: bool) -> CacheResult<bool> {
        let mut conn = self.conn().await?;
        let previous: bool = redis::cmd("SETBIT")
            .arg(self.template.raw_key(key))
            .arg(offset)
            .arg(u8::from(value))
            .query_async(&mut conn)
            .await?;
        Ok(previous)
    }

    /// Store `value` with an expiry; sub-second durations use `PSETEX`
    pub async fn set_ex<V: Serialize + ?Sized>(
        &self,
        key: &str,
        value: &V,
        timeout: Duration,
    ) -> CacheResult<()> {
        let raw_key = self.template.raw_key(key);
        let raw_value = self.template.raw_value(value)?;
        let mut conn = self.conn().await?;

        let _: () = match split_duration(timeout) {
            Expiry::Seconds(seconds) => conn.set_ex(raw_key, raw_value, seconds.unsigned_abs()).await?,
            Expiry::Millis(millis) => conn.pset_ex(raw_key, raw_value, millis.unsigned_abs()).await?,
        };
        Ok(())
    }

    /// Store `value` only when `key` does not exist
    pub async fn set_if_absent<V: Serialize + ?Sized>(
        &self,
        key: &str,
        value: &V,
    ) -> CacheResult<bool> {
        let raw_value = self.template.raw_value(value)?;
        let mut conn = self.conn().await?;
        let stored: bool = conn.set_nx(self.template.raw_key(key), raw_value).await?;
        Ok(stored)
    }

    /// Overwrite part of the stored bytes starting at `offset`
    pub async fn set_range<V: Serialize + ?Sized>(
        &self,
        key: &str,
        value: &V,
        offset: u64,
    ) -> CacheResult<i64> {
        let raw_value = self.template.raw_value(value)?;
        let mut conn = self.conn().await?;
        let length: i64 = redis::cmd("SETRANGE")
            .arg(self.template.raw_key(key))
            .arg(offset)
            .arg(raw_value)
            .query_async(&mut conn)
            .await?;
        Ok(length)
    }

    /// Length in bytes of the stored value
    pub async fn size(&self, key: &str) -> CacheResult<i64> {
        let mut conn = self.conn().await?;
        let length: i64 = conn.strlen(self.template.raw_key(key)).await?;
        Ok(length)
    }

    pub async fn multi_set<I, K, V>(&self, entries: I) -> CacheResult<()>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Serialize,
    {
        let Some(args) = self.pair_args(entries)? else {
            return Ok(());
        };

        let mut conn = self.conn().await?;
        let _: () = redis::cmd("MSET").arg(args).query_async(&mut conn).await?;
        Ok(())
    }

    /// Store every entry only if none of the keys exist
    pub async fn multi_set_if_absent<I, K, V>(&self, entries: I) -> CacheResult<bool>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Serialize,
    {
        let Some(args) = self.pair_args(entries)? else {
            return Ok(false);
        };

        let mut conn = self.conn().await?;
        let stored: bool = redis::cmd("MSETNX").arg(args).query_async(&mut conn).await?;
        Ok(stored)
    }

    pub async fn increment(&self, key: &str) -> CacheResult<i64> {
        self.increment_by(key, 1).await
    }

    pub async fn increment_by(&self, key: &str, delta: i64) -> CacheResult<i64> {
        let mut conn = self.conn().await?;
        let value: i64 = conn.incr(self.template.raw_key(key), delta).await?;
        Ok(value)
    }

    pub async fn increment_by_float(&self, key: &str, delta: f64) -> CacheResult<f64> {
        let mut conn = self.conn().await?;
        let value: f64 = redis::cmd("INCRBYFLOAT")
            .arg(self.template.raw_key(key))
            .arg(delta)
            .query_async(&mut conn)
            .await?;
        Ok(value)
    }

    pub async fn decrement(&self, key: &str) -> CacheResult<i64> {
        self.decrement_by(key, 1).await
    }

    pub async fn decrement_by(&self, key: &str, delta: i64) -> CacheResult<i64> {
        let mut conn = self.conn().await?;
        let value: i64 = conn.decr(self.template.raw_key(key), delta).await?;
        Ok(value)
    }

    /// Append raw text to the stored bytes, returning the new length
    pub async fn append(&self, key: &str, value: &str) -> CacheResult<i64> {
        let mut conn = self.conn().await?;
        let length: i64 = conn.append(self.template.raw_key(key), value).await?;
        Ok(length)
    }

    /// Flatten key/value pairs into `MSET` arguments, `None` when there are none
    fn pair_args<I, K, V>(&self, entries: I) -> CacheResult<Option<Vec<Vec<u8>>>>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Serialize,
    {
        let mut args = Vec::new();
        for (key, value) in entries {
            args.push(self.template.raw_key(key.as_ref()));
            args.push(self.template.raw_value(&value)?);
        }
        Ok((!args.is_empty()).then_some(args))
    }
}
