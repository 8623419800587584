//! Redis-backed `ResponseCache`.

use std::time::Duration;

use async_trait::async_trait;
use bb8_redis::RedisConnectionManager;
use bb8_redis::bb8::{Pool, PooledConnection};
use bb8_redis::redis::{self, AsyncCommands};
use serde_json::Value;
use tracing::debug;

use crate::domain::ports::{ResponseCache, ResponseCacheError};

const SCAN_BATCH: u32 = 200;

/// Connection settings for [`RedisResponseCache`].
#[derive(Debug, Clone)]
pub struct RedisCacheConfig {
    url: String,
    namespace: String,
    max_size: u32,
    connection_timeout: Duration,
}

impl RedisCacheConfig {
    /// Connect to `url` with no key namespace, 8 connections, and a 5 second
    /// checkout timeout.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            namespace: String::new(),
            max_size: 8,
            connection_timeout: Duration::from_secs(5),
        }
    }

    /// Prepend `namespace` to every key.
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    /// Set the maximum number of pooled connections.
    pub fn with_max_size(mut self, max_size: u32) -> Self {
        self.max_size = max_size;
        self
    }

    /// Set the connection checkout timeout.
    pub fn with_connection_timeout(mut self, timeout: Duration) -> Self {
        self.connection_timeout = timeout;
        self
    }
}

/// Response cache stored in Redis.
#[derive(Clone)]
pub struct RedisResponseCache {
    pool: Pool<RedisConnectionManager>,
    namespace: String,
}

fn backend_error(err: impl std::fmt::Display) -> ResponseCacheError {
    ResponseCacheError::backend(err.to_string())
}

/// Escape glob metacharacters so `prefix` matches literally in `SCAN MATCH`.
fn escape_glob(prefix: &str) -> String {
    let mut escaped = String::with_capacity(prefix.len());
    for ch in prefix.chars() {
        if matches!(ch, '*' | '?' | '[' | ']' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

impl RedisResponseCache {
    /// Build the pool. Connections are opened lazily, so an unreachable
    /// server surfaces on first use rather than here.
    ///
    /// # Errors
    ///
    /// Returns [`ResponseCacheError::Backend`] when the URL is invalid.
    pub async fn connect(config: RedisCacheConfig) -> Result<Self, ResponseCacheError> {
        let manager = RedisConnectionManager::new(config.url.as_str()).map_err(backend_error)?;
        let pool = Pool::builder()
            .max_size(config.max_size)
            .connection_timeout(config.connection_timeout)
            .build_unchecked(manager);
        Ok(Self {
            pool,
            namespace: config.namespace,
        })
    }

    fn key(&self, key: &str) -> String {
        format!("{}{key}", self.namespace)
    }

    async fn connection(
        &self,
    ) -> Result<PooledConnection<'_, RedisConnectionManager>, ResponseCacheError> {
        self.pool.get().await.map_err(backend_error)
    }
}

#[async_trait]
impl ResponseCache for RedisResponseCache {
    async fn has(&self, key: &str) -> Result<bool, ResponseCacheError> {
        let mut conn = self.connection().await?;
        conn.exists::<_, bool>(self.key(key))
            .await
            .map_err(backend_error)
    }

    async fn get(&self, key: &str) -> Result<Option<Value>, ResponseCacheError> {
        let mut conn = self.connection().await?;
        let raw: Option<String> = conn.get(self.key(key)).await.map_err(backend_error)?;
        raw.map(|text| {
            serde_json::from_str(&text)
                .map_err(|err| ResponseCacheError::serialization(err.to_string()))
        })
        .transpose()
    }

    async fn put(&self, key: &str, value: &Value, ttl: Duration) -> Result<(), ResponseCacheError> {
        let text = serde_json::to_string(value)
            .map_err(|err| ResponseCacheError::serialization(err.to_string()))?;
        let mut conn = self.connection().await?;
        conn.set_ex::<_, _, ()>(self.key(key), text, ttl.as_secs().max(1))
            .await
            .map_err(backend_error)
    }

    async fn forget_by_prefix(&self, prefix: &str) -> Result<u64, ResponseCacheError> {
        let pattern = format!("{}*", escape_glob(&self.key(prefix)));
        let mut conn = self.connection().await?;
        let mut cursor: u64 = 0;
        let mut removed: u64 = 0;
        loop {
            let (next, keys): (u64, Vec<String>) = redis::cmd("SCAN")
                .arg(cursor)
                .arg("MATCH")
                .arg(&pattern)
                .arg("COUNT")
                .arg(SCAN_BATCH)
                .query_async(&mut *conn)
                .await
                .map_err(backend_error)?;
            if !keys.is_empty() {
                removed += conn.del::<_, u64>(&keys).await.map_err(backend_error)?;
            }
            if next == 0 {
                break;
            }
            cursor = next;
        }
        debug!(%pattern, removed, "redis prefix invalidated");
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("bookings_", "bookings_")]
    #[case("app:cache_country_", "app:cache_country_")]
    #[case("odd*[key]?\\", "odd\\*\\[key\\]\\?\\\\")]
    fn glob_metacharacters_are_escaped(#[case] prefix: &str, #[case] expected: &str) {
        assert_eq!(escape_glob(prefix), expected);
    }

    #[rstest]
    #[tokio::test]
    async fn keys_carry_the_namespace() {
        let cache = RedisResponseCache::connect(
            RedisCacheConfig::new("redis://127.0.0.1:6379").with_namespace("surf:"),
        )
        .await
        .expect("pool builds without connecting");
        assert_eq!(cache.key("bookings_p_1"), "surf:bookings_p_1");
    }

    #[rstest]
    #[tokio::test]
    async fn invalid_url_is_a_backend_error() {
        let err = RedisResponseCache::connect(RedisCacheConfig::new("not a url"))
            .await
            .err()
            .expect("invalid url rejected");
        assert!(matches!(err, ResponseCacheError::Backend { .. }));
    }
}
