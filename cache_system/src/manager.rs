//! Cache manager implementation
//!
//! This module provides the [`CacheManager`], which hands out named
//! [`RedisCache`]s sharing one [`RedisTemplate`] and one [`CacheConfig`].

use crate::convert::{convert, copy_properties};
use crate::errors::{CacheError, CacheResult};
use crate::template::RedisTemplate;
use async_trait::async_trait;
use config::CacheConfig;
use redis::AsyncCommands;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt::Debug;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

const CACHE_KEY_SEPARATOR: &str = "::";

/// Untyped access to a named cache
#[async_trait]
pub trait Cache: Send + Sync + Debug {
    fn name(&self) -> &str;

    async fn get_value(&self, key: &str) -> CacheResult<Option<Value>>;

    async fn put_value(&self, key: &str, value: Value) -> CacheResult<()>;

    /// Remove one entry, returning whether it existed
    async fn evict(&self, key: &str) -> CacheResult<bool>;

    /// Remove every entry of this cache, returning how many were deleted
    async fn clear(&self) -> CacheResult<i64>;
}

/// Redis-backed cache manager
#[derive(Clone)]
pub struct CacheManager {
    template: Arc<RedisTemplate>,
    config: Arc<CacheConfig>,
    caches: Arc<RwLock<HashMap<String, Arc<RedisCache>>>>,
}

impl Debug for CacheManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let cache_count = match self.caches.try_read() {
            Ok(caches) => caches.len().to_string(),
            Err(_) => "locked".to_string(),
        };

        f.debug_struct("CacheManager")
            .field("config", &self.config)
            .field("caches", &cache_count)
            .finish()
    }
}

impl CacheManager {
    pub fn new(template: Arc<RedisTemplate>, config: CacheConfig) -> Self {
        Self {
            template,
            config: Arc::new(config),
            caches: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Get the cache called `name`, creating it on first use
    pub async fn get_cache(&self, name: &str) -> Arc<RedisCache> {
        if let Some(cache) = self.caches.read().await.get(name) {
            return Arc::clone(cache);
        }

        let mut caches = self.caches.write().await;
        let cache = caches.entry(name.to_string()).or_insert_with(|| {
            debug_log!("Creating cache '{}' with ttl {:?}", name, self.config.ttl_for(name));
            Arc::new(RedisCache::new(name, Arc::clone(&self.template), &self.config))
        });
        Arc::clone(cache)
    }

    /// Names of every cache created so far, sorted
    pub async fn cache_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.caches.read().await.keys().cloned().collect();
        names.sort();
        names
    }

    /// Get current configuration
    pub fn config(&self) -> &CacheConfig {
        &self.config
    }
}

/// A named cache whose entries expire after the configured TTL
#[derive(Debug)]
pub struct RedisCache {
    name: String,
    template: Arc<RedisTemplate>,
    key_prefix: Option<String>,
    ttl: Duration,
    cache_null_values: bool,
}

impl RedisCache {
    fn new(name: &str, template: Arc<RedisTemplate>, config: &CacheConfig) -> Self {
        let key_prefix = config.use_key_prefix.then(|| {
            format!(
                "{}{}{}",
                config.key_prefix.as_deref().unwrap_or_default(),
                name,
                CACHE_KEY_SEPARATOR
            )
        });

        Self {
            name: name.to_string(),
            template,
            key_prefix,
            ttl: config.ttl_for(name),
            cache_null_values: config.cache_null_values,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Redis key an entry is stored under
    pub fn cache_key(&self, key: &str) -> String {
        match &self.key_prefix {
            Some(prefix) => format!("{}{}", prefix, key),
            None => key.to_string(),
        }
    }

    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> CacheResult<Option<T>> {
        copy_properties(self.get_value(key).await?)
    }

    pub async fn put<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> CacheResult<()> {
        self.put_value(key, serde_json::to_value(value)?).await
    }

    /// Store `value` only when no entry exists, returning whether it was stored
    pub async fn put_if_absent<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> CacheResult<bool> {
        let value = self.check_null(serde_json::to_value(value)?)?;
        let raw_value = self.template.raw_value(&value)?;
        let mut conn = self.template.connection().await?;

        let reply: Option<String> = redis::cmd("SET")
            .arg(self.raw_cache_key(key))
            .arg(raw_value)
            .arg("NX")
            .arg("PX")
            .arg(ttl_millis(self.ttl))
            .query_async(&mut conn)
            .await?;
        Ok(reply.is_some())
    }

    /// Return the cached value, or run `loader` and cache its result
    ///
    /// A loaded `null` is only stored when the cache allows null values.
    pub async fn get_or_load<T, F, Fut>(&self, key: &str, loader: F) -> CacheResult<T>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = CacheResult<T>>,
    {
        if let Some(cached) = self.get_value(key).await? {
            trace_log!("Cache '{}' hit for '{}'", self.name, key);
            return convert(cached);
        }

        trace_log!("Cache '{}' miss for '{}'", self.name, key);
        let loaded = loader().await?;
        let value = serde_json::to_value(&loaded)?;
        if !value.is_null() || self.cache_null_values {
            self.put_value(key, value).await?;
        }
        Ok(loaded)
    }

    fn raw_cache_key(&self, key: &str) -> Vec<u8> {
        self.template.raw_key(&self.cache_key(key))
    }

    /// `SCAN MATCH` pattern for every entry of this cache, with the literal
    /// prefix escaped so glob characters in names match only themselves
    fn clear_pattern(&self) -> Vec<u8> {
        let mut pattern = escape_glob(&self.raw_cache_key(""));
        pattern.push(b'*');
        pattern
    }

    fn check_null(&self, value: Value) -> CacheResult<Value> {
        if value.is_null() && !self.cache_null_values {
            return Err(CacheError::NullValueNotAllowed(self.name.clone()));
        }
        Ok(value)
    }
}

#[async_trait]
impl Cache for RedisCache {
    fn name(&self) -> &str {
        &self.name
    }

    async fn get_value(&self, key: &str) -> CacheResult<Option<Value>> {
        let mut conn = self.template.connection().await?;
        let raw: Option<Vec<u8>> = conn.get(self.raw_cache_key(key)).await?;
        self.template.deserialize_optional(raw)
    }

    async fn put_value(&self, key: &str, value: Value) -> CacheResult<()> {
        let value = self.check_null(value)?;
        let raw_value = self.template.raw_value(&value)?;
        let mut conn = self.template.connection().await?;

        let _: () = conn
            .pset_ex(self.raw_cache_key(key), raw_value, ttl_millis(self.ttl))
            .await?;
        Ok(())
    }

    async fn evict(&self, key: &str) -> CacheResult<bool> {
        let mut conn = self.template.connection().await?;
        let deleted: i64 = conn.del(self.raw_cache_key(key)).await?;
        Ok(deleted > 0)
    }

    async fn clear(&self) -> CacheResult<i64> {
        let pattern = self.clear_pattern();
        let mut conn = self.template.connection().await?;
        let mut cursor: u64 = 0;
        let mut deleted = 0;

        loop {
            let (next, keys): (u64, Vec<Vec<u8>>) = redis::cmd("SCAN")
                .arg(cursor)
                .arg("MATCH")
                .arg(&pattern)
                .query_async(&mut conn)
                .await?;

            if !keys.is_empty() {
                let removed: i64 = conn.del(keys).await?;
                deleted += removed;
            }
            if next == 0 {
                break;
            }
            cursor = next;
        }

        debug_log!("Cleared {} entries from cache '{}'", deleted, self.name);
        Ok(deleted)
    }
}

fn ttl_millis(ttl: Duration) -> u64 {
    u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX).max(1)
}

fn escape_glob(raw: &[u8]) -> Vec<u8> {
    let mut escaped = Vec::with_capacity(raw.len());
    for &byte in raw {
        if matches!(byte, b'*' | b'?' | b'[' | b']' | b'\\') {
            escaped.push(b'\\');
        }
        escaped.push(byte);
    }
    escaped
}
