//! Port for caching serialised list responses.
//!
//! Values are JSON documents so any adapter can store them as text. Keys are
//! plain strings; resources share a key prefix and writes drop every key under
//! that prefix with [`ResponseCache::forget_by_prefix`].

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use super::define_port_error;

define_port_error! {
    /// Errors surfaced by response cache adapters.
    pub enum ResponseCacheError {
        /// Cache backend is unavailable or timing out.
        Backend { message: String } => "response cache backend failure: {message}",
        /// Cached content could not be encoded or decoded.
        Serialization { message: String } => "response cache serialisation failed: {message}",
    }
}

/// Key-value cache with TTL and prefix invalidation.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ResponseCache: Send + Sync {
    /// Whether a live entry exists for `key`.
    async fn has(&self, key: &str) -> Result<bool, ResponseCacheError>;

    /// Read the entry for `key`, `None` when absent or expired.
    async fn get(&self, key: &str) -> Result<Option<Value>, ResponseCacheError>;

    /// Store `value` under `key` for `ttl`.
    async fn put(&self, key: &str, value: &Value, ttl: Duration) -> Result<(), ResponseCacheError>;

    /// Remove every entry whose key starts with `prefix`, returning how many
    /// were removed.
    async fn forget_by_prefix(&self, prefix: &str) -> Result<u64, ResponseCacheError>;
}
