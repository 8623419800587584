//! Cache-aside reads and prefix invalidation over a [`ResponseCache`].
//!
//! A read checks the cache first and only runs the loader on a miss, storing
//! the loader's result for the configured TTL. Cache failures never fail the
//! request: a read error counts as a miss, write and invalidation errors are
//! logged and ignored.
//!
//! A read that missed can store its page after a concurrent write already
//! invalidated the prefix. That page then stays stale until its TTL expires.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use super::Error;
use super::ports::ResponseCache;

/// Default lifetime of a cached list page.
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(300);

/// Shared cache handle with a fixed entry lifetime.
#[derive(Clone)]
pub struct CacheAside {
    cache: Arc<dyn ResponseCache>,
    ttl: Duration,
}

impl CacheAside {
    /// Wrap `cache`, storing entries for `ttl`.
    pub fn new(cache: Arc<dyn ResponseCache>, ttl: Duration) -> Self {
        Self { cache, ttl }
    }

    /// Entry lifetime.
    #[must_use]
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Return the cached value for `key`, or run `loader` and cache its
    /// result.
    ///
    /// # Errors
    ///
    /// Only the loader's error is returned; cache failures degrade to a miss.
    pub async fn fetch<T, F, Fut>(&self, key: &str, loader: F) -> Result<T, Error>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, Error>>,
    {
        if let Some(hit) = self.read(key).await {
            return Ok(hit);
        }
        debug!(%key, "cache miss");
        let value = loader().await?;
        self.write(key, &value).await;
        Ok(value)
    }

    /// Drop every cached entry under `prefix`.
    pub async fn invalidate(&self, prefix: &str) {
        match self.cache.forget_by_prefix(prefix).await {
            Ok(removed) => debug!(%prefix, removed, "cache invalidated"),
            Err(err) => warn!(error = %err, %prefix, "cache invalidation failed"),
        }
    }

    async fn read<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        match self.cache.has(key).await {
            Ok(true) => {}
            Ok(false) => return None,
            Err(err) => {
                warn!(error = %err, %key, "cache lookup failed");
                return None;
            }
        }
        let raw = match self.cache.get(key).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(err) => {
                warn!(error = %err, %key, "cache read failed");
                return None;
            }
        };
        match serde_json::from_value(raw) {
            Ok(value) => {
                debug!(%key, "cache hit");
                Some(value)
            }
            Err(err) => {
                warn!(error = %err, %key, "cached entry could not be decoded");
                None
            }
        }
    }

    async fn write<T: Serialize>(&self, key: &str, value: &T) {
        let encoded = match serde_json::to_value(value) {
            Ok(encoded) => encoded,
            Err(err) => {
                warn!(error = %err, %key, "cache entry could not be encoded");
                return;
            }
        };
        if let Err(err) = self.cache.put(key, &encoded, self.ttl).await {
            warn!(error = %err, %key, "cache write failed");
        }
    }
}
