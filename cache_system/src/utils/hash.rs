//! Hash commands
//!
//! Hash fields go through the template's hash key serializer (no namespace
//! prefix), hash values through the value serializer.

use super::RedisUtils;
use crate::convert::{copy_list, copy_map, copy_optional_list};
use crate::errors::CacheResult;
use crate::types::ScanOptions;
use redis::AsyncCommands;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::HashMap;

impl RedisUtils {
    pub async fn h_get<T: DeserializeOwned>(&self, key: &str, field: &str) -> CacheResult<Option<T>> {
        let mut conn = self.conn().await?;
        let raw: Option<Vec<u8>> = conn
            .hget(self.template.raw_key(key), self.template.raw_hash_key(field))
            .await?;
        self.decode(raw)
    }

    /// All entries of the hash; entries with empty values are skipped
    pub async fn h_get_all<T: DeserializeOwned>(&self, key: &str) -> CacheResult<HashMap<String, T>> {
        let mut conn = self.conn().await?;
        let raw: Vec<(Vec<u8>, Vec<u8>)> = conn.hgetall(self.template.raw_key(key)).await?;
        copy_map(self.decode_entries(raw)?)
    }

    /// Values for several fields; missing fields keep their position as `None`
    pub async fn h_multi_get<T, F>(&self, key: &str, fields: &[F]) -> CacheResult<Vec<Option<T>>>
    where
        T: DeserializeOwned,
        F: AsRef<str>,
    {
        if fields.is_empty() {
            return Ok(Vec::new());
        }

        let mut conn = self.conn().await?;
        let raw: Vec<Option<Vec<u8>>> = redis::cmd("HMGET")
            .arg(self.template.raw_key(key))
            .arg(self.template.raw_hash_keys(fields))
            .query_async(&mut conn)
            .await?;

        let values = raw
            .into_iter()
            .map(|entry| self.template.deserialize_optional(entry))
            .collect::<CacheResult<Vec<_>>>()?;
        copy_optional_list(values)
    }

    pub async fn h_put<V: Serialize + ?Sized>(&self, key: &str, field: &str, value: &V) -> CacheResult<()> {
        let raw_value = self.template.raw_value(value)?;
        let mut conn = self.conn().await?;
        let _: i64 = conn
            .hset(self.template.raw_key(key), self.template.raw_hash_key(field), raw_value)
            .await?;
        Ok(())
    }

    pub async fn h_put_all<I, F, V>(&self, key: &str, entries: I) -> CacheResult<()>
    where
        I: IntoIterator<Item = (F, V)>,
        F: AsRef<str>,
        V: Serialize,
    {
        let items = entries
            .into_iter()
            .map(|(field, value)| {
                Ok((self.template.raw_hash_key(field.as_ref()), self.template.raw_value(&value)?))
            })
            .collect::<CacheResult<Vec<_>>>()?;
        if items.is_empty() {
            return Ok(());
        }

        let mut conn = self.conn().await?;
        let _: () = conn.hset_multiple(self.template.raw_key(key), &items).await?;
        Ok(())
    }

    /// Set a field only when it does not exist yet
    pub async fn h_put_if_absent<V: Serialize + ?Sized>(
        &self,
        key: &str,
        field: &str,
        value: &V,
    ) -> CacheResult<bool> {
        let raw_value = self.template.raw_value(value)?;
        let mut conn = self.conn().await?;
        let stored: bool = conn
            .hset_nx(self.template.raw_key(key), self.template.raw_hash_key(field), raw_value)
            .await?;
        Ok(stored)
    }

    /// Delete fields, returning how many were removed
    pub async fn h_delete<F: AsRef<str>>(&self, key: &str, fields: &[F]) -> CacheResult<i64> {
        if fields.is_empty() {
            return Ok(0);
        }

        let mut conn = self.conn().await?;
        let removed: i64 = conn
            .hdel(self.template.raw_key(key), self.template.raw_hash_keys(fields))
            .await?;
        Ok(removed)
    }

    pub async fn h_exists(&self, key: &str, field: &str) -> CacheResult<bool> {
        let mut conn = self.conn().await?;
        let exists: bool = conn
            .hexists(self.template.raw_key(key), self.template.raw_hash_key(field))
            .await?;
        Ok(exists)
    }

    pub async fn h_increment(&self, key: &str, field: &str, delta: i64) -> CacheResult<i64> {
        let mut conn = self.conn().await?;
        let value: i64 = redis::cmd("HINCRBY")
            .arg(self.template.raw_key(key))
            .arg(self.template.raw_hash_key(field))
            .arg(delta)
            .query_async(&mut conn)
            .await?;
        Ok(value)
    }

    pub async fn h_increment_float(&self, key: &str, field: &str, delta: f64) -> CacheResult<f64> {
        let mut conn = self.conn().await?;
        let value: f64 = redis::cmd("HINCRBYFLOAT")
            .arg(self.template.raw_key(key))
            .arg(self.template.raw_hash_key(field))
            .arg(delta)
            .query_async(&mut conn)
            .await?;
        Ok(value)
    }

    /// Field names converted into `T` (use `String` for the names as stored)
    pub async fn h_keys<T: DeserializeOwned>(&self, key: &str) -> CacheResult<Vec<T>> {
        let mut conn = self.conn().await?;
        let raw: Vec<Vec<u8>> = conn.hkeys(self.template.raw_key(key)).await?;
        let fields = raw
            .iter()
            .map(|bytes| Ok(Value::String(self.template.deserialize_hash_key(bytes)?)))
            .collect::<CacheResult<Vec<_>>>()?;
        copy_list(fields)
    }

    pub async fn h_size(&self, key: &str) -> CacheResult<i64> {
        let mut conn = self.conn().await?;
        let size: i64 = conn.hlen(self.template.raw_key(key)).await?;
        Ok(size)
    }

    pub async fn h_values<T: DeserializeOwned>(&self, key: &str) -> CacheResult<Vec<T>> {
        let mut conn = self.conn().await?;
        let raw: Vec<Vec<u8>> = conn.hvals(self.template.raw_key(key)).await?;
        self.decode_list(raw)
    }

    /// Iterate the hash with `HSCAN`, collecting every matching entry
    pub async fn h_scan<T: DeserializeOwned>(
        &self,
        key: &str,
        options: &ScanOptions,
    ) -> CacheResult<HashMap<String, T>> {
        let pattern = options
            .pattern
            .as_deref()
            .map(|pattern| self.template.raw_hash_key(pattern));
        let flat = self.scan_member_pages("HSCAN", key, options, pattern).await?;

        let mut entries = Vec::with_capacity(flat.len() / 2);
        let mut iter = flat.into_iter();
        while let (Some(field), Some(value)) = (iter.next(), iter.next()) {
            entries.push((field, value));
        }
        copy_map(self.decode_entries(entries)?)
    }

    fn decode_entries(&self, raw: Vec<(Vec<u8>, Vec<u8>)>) -> CacheResult<Vec<(String, Value)>> {
        raw.into_iter()
            .map(|(field, value)| {
                Ok((
                    self.template.deserialize_hash_key(&field)?,
                    self.template.deserialize_value(&value)?,
                ))
            })
            .collect()
    }
}
