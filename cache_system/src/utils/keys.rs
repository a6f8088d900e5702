//! Key-level commands

use super::{Expiry, RedisUtils, split_duration};
use crate::errors::CacheResult;
use crate::types::{DataType, ScanOptions};
use chrono::{DateTime, Utc};
use redis::AsyncCommands;
use std::time::Duration;

impl RedisUtils {
    /// Delete a key, returning whether it existed
    pub async fn delete(&self, key: &str) -> CacheResult<bool> {
        let mut conn = self.conn().await?;
        let deleted: i64 = conn.del(self.template.raw_key(key)).await?;
        Ok(deleted > 0)
    }

    /// Delete several keys, returning how many existed
    pub async fn delete_many<K: AsRef<str>>(&self, keys: &[K]) -> CacheResult<i64> {
        if keys.is_empty() {
            return Ok(0);
        }

        let mut conn = self.conn().await?;
        let deleted: i64 = conn.del(self.template.raw_keys(keys)).await?;
        Ok(deleted)
    }

    /// Serialized form of the value at `key`, as produced by `DUMP`
    pub async fn dump(&self, key: &str) -> CacheResult<Option<Vec<u8>>> {
        let mut conn = self.conn().await?;
        let dumped: Option<Vec<u8>> = redis::cmd("DUMP")
            .arg(self.template.raw_key(key))
            .query_async(&mut conn)
            .await?;
        Ok(dumped)
    }

    pub async fn has_key(&self, key: &str) -> CacheResult<bool> {
        let mut conn = self.conn().await?;
        let exists: bool = conn.exists(self.template.raw_key(key)).await?;
        Ok(exists)
    }

    /// Set a relative expiry; sub-second durations use `PEXPIRE`
    pub async fn expire(&self, key: &str, timeout: Duration) -> CacheResult<bool> {
        let mut conn = self.conn().await?;
        let raw_key = self.template.raw_key(key);

        let applied: bool = match split_duration(timeout) {
            Expiry::Seconds(seconds) => conn.expire(raw_key, seconds).await?,
            Expiry::Millis(millis) => conn.pexpire(raw_key, millis).await?,
        };
        Ok(applied)
    }

    /// Set an absolute expiry
    pub async fn expire_at(&self, key: &str, at: DateTime<Utc>) -> CacheResult<bool> {
        let mut conn = self.conn().await?;
        let applied: bool = redis::cmd("PEXPIREAT")
            .arg(self.template.raw_key(key))
            .arg(at.timestamp_millis())
            .query_async(&mut conn)
            .await?;
        Ok(applied)
    }

    /// Keys matching a glob pattern
    pub async fn keys(&self, pattern: &str) -> CacheResult<Vec<String>> {
        let mut conn = self.conn().await?;
        let raw: Vec<Vec<u8>> = conn.keys(self.template.raw_key(pattern)).await?;
        self.template.deserialize_keys(raw)
    }

    /// Cursor-based alternative to [`RedisUtils::keys`] that does not block the server
    pub async fn scan(&self, options: &ScanOptions) -> CacheResult<Vec<String>> {
        let mut conn = self.conn().await?;
        // Always MATCH so a namespaced key serializer only sees its own keys
        let pattern = Some(self.template.raw_key(options.pattern.as_deref().unwrap_or("*")));
        let mut cursor: u64 = 0;
        let mut collected = Vec::new();

        loop {
            let mut cmd = redis::cmd("SCAN");
            cmd.arg(cursor);
            options.apply(&mut cmd, pattern.clone());

            let (next, page): (u64, Vec<Vec<u8>>) = cmd.query_async(&mut conn).await?;
            collected.extend(self.template.deserialize_keys(page)?);
            if next == 0 {
                break;
            }
            cursor = next;
        }

        Ok(collected)
    }

    /// Move a key into another logical database
    pub async fn move_key(&self, key: &str, db_index: u8) -> CacheResult<bool> {
        let mut conn = self.conn().await?;
        let moved: bool = redis::cmd("MOVE")
            .arg(self.template.raw_key(key))
            .arg(db_index)
            .query_async(&mut conn)
            .await?;
        Ok(moved)
    }

    /// Remove the expiry so the key persists
    pub async fn persist(&self, key: &str) -> CacheResult<bool> {
        let mut conn = self.conn().await?;
        let persisted: bool = conn.persist(self.template.raw_key(key)).await?;
        Ok(persisted)
    }

    /// Remaining time to live in seconds (-1 without expiry, -2 when missing)
    pub async fn get_expire(&self, key: &str) -> CacheResult<i64> {
        let mut conn = self.conn().await?;
        let ttl: i64 = conn.ttl(self.template.raw_key(key)).await?;
        Ok(ttl)
    }

    /// Remaining time to live in milliseconds (-1 without expiry, -2 when missing)
    pub async fn get_expire_millis(&self, key: &str) -> CacheResult<i64> {
        let mut conn = self.conn().await?;
        let ttl: i64 = conn.pttl(self.template.raw_key(key)).await?;
        Ok(ttl)
    }

    pub async fn random_key(&self) -> CacheResult<Option<String>> {
        let mut conn = self.conn().await?;
        let raw: Option<Vec<u8>> = redis::cmd("RANDOMKEY").query_async(&mut conn).await?;
        raw.map(|bytes| self.template.deserialize_key(&bytes))
            .transpose()
    }

    pub async fn rename(&self, old_key: &str, new_key: &str) -> CacheResult<()> {
        let mut conn = self.conn().await?;
        let _: () = conn
            .rename(self.template.raw_key(old_key), self.template.raw_key(new_key))
            .await?;
        Ok(())
    }

    /// Rename only when `new_key` does not exist yet
    pub async fn rename_if_absent(&self, old_key: &str, new_key: &str) -> CacheResult<bool> {
        let mut conn = self.conn().await?;
        let renamed: bool = conn
            .rename_nx(self.template.raw_key(old_key), self.template.raw_key(new_key))
            .await?;
        Ok(renamed)
    }

    pub async fn key_type(&self, key: &str) -> CacheResult<DataType> {
        let mut conn = self.conn().await?;
        let code: String = redis::cmd("TYPE")
            .arg(self.template.raw_key(key))
            .query_async(&mut conn)
            .await?;
        code.parse()
    }
}
