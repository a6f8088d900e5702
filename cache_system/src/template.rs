//! Redis template: connection handling plus key/value serialization
//!
//! The template owns the client, a lazily created shared connection and the
//! serializers used to turn keys and values into wire bytes. Higher layers
//! (the `RedisUtils` façade and the cache manager) only ever work through it.
//!
//! The shared connection is a [`ConnectionManager`], which reconnects on its
//! own after the server restarts or the link drops.

use crate::errors::{CacheError, CacheResult};
use crate::serializer::{JsonValueSerializer, KeySerializer, StringKeySerializer, ValueSerializer};
use config::RedisConfig;
use redis::Client;
use redis::aio::{ConnectionManager, ConnectionManagerConfig, MultiplexedConnection};
use serde::Serialize;
use serde_json::Value;
use std::fmt::Debug;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Connection and serialization context shared by all operations
#[derive(Clone)]
pub struct RedisTemplate {
    client: Arc<Client>,
    config: Arc<RedisConfig>,
    connection_pool: Arc<RwLock<Option<ConnectionManager>>>,
    key_serializer: Arc<dyn KeySerializer>,
    hash_key_serializer: Arc<dyn KeySerializer>,
    value_serializer: Arc<dyn ValueSerializer>,
}

impl Debug for RedisTemplate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let connection_status = {
            match self.connection_pool.try_read() {
                Ok(pool) => {
                    if pool.is_some() {
                        "connected"
                    } else {
                        "no_connection"
                    }
                }
                Err(_) => "lock_error",
            }
        };

        f.debug_struct("RedisTemplate")
            .field("config", &self.config)
            .field("key_serializer", &self.key_serializer)
            .field("value_serializer", &self.value_serializer)
            .field("connected", &connection_status)
            .finish()
    }
}

impl RedisTemplate {
    /// Create a template with the default string key and JSON value serializers
    pub fn new(config: RedisConfig) -> Result<Self, CacheError> {
        let client = Client::open(config.connection_url().as_str())?;
        let key_serializer =
            StringKeySerializer::with_prefix(config.key_prefix.as_deref().unwrap_or_default());

        Ok(Self {
            client: Arc::new(client),
            config: Arc::new(config),
            connection_pool: Arc::new(RwLock::new(None)),
            key_serializer: Arc::new(key_serializer),
            hash_key_serializer: Arc::new(StringKeySerializer::new()),
            value_serializer: Arc::new(JsonValueSerializer),
        })
    }

    /// Replace the key serializer
    pub fn with_key_serializer(mut self, serializer: Arc<dyn KeySerializer>) -> Self {
        self.key_serializer = serializer;
        self
    }

    /// Replace the serializer used for hash field names
    pub fn with_hash_key_serializer(mut self, serializer: Arc<dyn KeySerializer>) -> Self {
        self.hash_key_serializer = serializer;
        self
    }

    /// Replace the value serializer
    pub fn with_value_serializer(mut self, serializer: Arc<dyn ValueSerializer>) -> Self {
        self.value_serializer = serializer;
        self
    }

    /// Get or create the shared Redis connection
    pub async fn connection(&self) -> Result<ConnectionManager, CacheError> {
        let mut pool = self.connection_pool.write().await;

        if pool.is_none() {
            debug_log!("Opening shared Redis connection to {}:{}", self.config.host, self.config.port);
            let manager_config =
                ConnectionManagerConfig::new().set_connection_timeout(self.config.connection_timeout());
            let connect = ConnectionManager::new_with_config((*self.client).clone(), manager_config);
            let connection = self.with_timeout(connect).await?;
            *pool = Some(connection);
        }

        pool.as_ref()
            .cloned()
            .ok_or_else(|| CacheError::Connection("Failed to get connection from pool".into()))
    }

    /// Open a connection reserved for a single blocking command
    pub async fn dedicated_connection(&self) -> Result<MultiplexedConnection, CacheError> {
        trace_log!("Opening dedicated Redis connection");
        self.with_timeout(self.client.get_multiplexed_async_connection())
            .await
    }

    async fn with_timeout<C, F>(&self, connect: F) -> Result<C, CacheError>
    where
        F: std::future::Future<Output = redis::RedisResult<C>>,
    {
        match tokio::time::timeout(self.config.connection_timeout(), connect).await {
            Ok(connection) => Ok(connection?),
            Err(_) => Err(CacheError::Timeout(self.config.connection_timeout_ms)),
        }
    }

    /// Ping Redis to check connectivity
    pub async fn ping(&self) -> Result<String, CacheError> {
        let mut conn = self.connection().await?;

        let pong: String = redis::cmd("PING").query_async(&mut conn).await?;
        Ok(pong)
    }

    /// Get current configuration
    pub fn config(&self) -> &RedisConfig {
        &self.config
    }

    pub fn key_serializer(&self) -> &dyn KeySerializer {
        self.key_serializer.as_ref()
    }

    pub fn value_serializer(&self) -> &dyn ValueSerializer {
        self.value_serializer.as_ref()
    }

    pub fn raw_key(&self, key: &str) -> Vec<u8> {
        self.key_serializer.serialize(key)
    }

    pub fn raw_keys<K: AsRef<str>>(&self, keys: &[K]) -> Vec<Vec<u8>> {
        keys.iter().map(|key| self.raw_key(key.as_ref())).collect()
    }

    pub fn deserialize_key(&self, bytes: &[u8]) -> CacheResult<String> {
        self.key_serializer.deserialize(bytes)
    }

    pub fn deserialize_keys(&self, raw: Vec<Vec<u8>>) -> CacheResult<Vec<String>> {
        raw.iter().map(|bytes| self.deserialize_key(bytes)).collect()
    }

    pub fn raw_hash_key(&self, field: &str) -> Vec<u8> {
        self.hash_key_serializer.serialize(field)
    }

    pub fn raw_hash_keys<F: AsRef<str>>(&self, fields: &[F]) -> Vec<Vec<u8>> {
        fields.iter().map(|field| self.raw_hash_key(field.as_ref())).collect()
    }

    pub fn deserialize_hash_key(&self, bytes: &[u8]) -> CacheResult<String> {
        self.hash_key_serializer.deserialize(bytes)
    }

    /// Encode any serializable value through the value serializer
    pub fn raw_value<V: Serialize + ?Sized>(&self, value: &V) -> CacheResult<Vec<u8>> {
        let value = serde_json::to_value(value)?;
        self.value_serializer.serialize(&value)
    }

    pub fn raw_values<V: Serialize>(&self, values: &[V]) -> CacheResult<Vec<Vec<u8>>> {
        values.iter().map(|value| self.raw_value(value)).collect()
    }

    pub fn deserialize_value(&self, bytes: &[u8]) -> CacheResult<Value> {
        self.value_serializer.deserialize(bytes)
    }

    pub fn deserialize_optional(&self, raw: Option<Vec<u8>>) -> CacheResult<Option<Value>> {
        raw.map(|bytes| self.deserialize_value(&bytes)).transpose()
    }

    pub fn deserialize_values(&self, raw: Vec<Vec<u8>>) -> CacheResult<Vec<Value>> {
        raw.iter().map(|bytes| self.deserialize_value(bytes)).collect()
    }
}
