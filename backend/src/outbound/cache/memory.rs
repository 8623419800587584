//! Process-local `ResponseCache`.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};
use mockable::Clock;
use serde_json::Value;

use crate::domain::ports::{ResponseCache, ResponseCacheError};

struct Entry {
    value: Value,
    expires_at: Option<DateTime<Utc>>,
}

impl Entry {
    fn is_live(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_none_or(|at| now < at)
    }
}

/// Response cache held in a mutex-guarded map.
///
/// Expired entries are dropped when read and swept on every `put`, so keys
/// that are never read again do not accumulate.
#[derive(Clone)]
pub struct InMemoryResponseCache {
    entries: Arc<Mutex<HashMap<String, Entry>>>,
    clock: Arc<dyn Clock>,
}

impl InMemoryResponseCache {
    /// Empty cache whose expiry follows `clock`.
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: Arc::new(Mutex::new(HashMap::new())),
            clock,
        }
    }

    /// Number of stored entries, expired ones included.
    pub fn len(&self) -> usize {
        self.lock().map_or(0, |entries| entries.len())
    }

    /// Whether no entries are stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<String, Entry>>, ResponseCacheError> {
        self.entries
            .lock()
            .map_err(|_| ResponseCacheError::backend("in-memory cache lock poisoned"))
    }

    fn live_value(&self, key: &str) -> Result<Option<Value>, ResponseCacheError> {
        let now = self.clock.utc();
        let mut entries = self.lock()?;
        match entries.get(key) {
            Some(entry) if entry.is_live(now) => Ok(Some(entry.value.clone())),
            Some(_) => {
                entries.remove(key);
                Ok(None)
            }
            None => Ok(None),
        }
    }
}

#[async_trait]
impl ResponseCache for InMemoryResponseCache {
    async fn has(&self, key: &str) -> Result<bool, ResponseCacheError> {
        Ok(self.live_value(key)?.is_some())
    }

    async fn get(&self, key: &str) -> Result<Option<Value>, ResponseCacheError> {
        self.live_value(key)
    }

    async fn put(&self, key: &str, value: &Value, ttl: Duration) -> Result<(), ResponseCacheError> {
        let now = self.clock.utc();
        let expires_at = TimeDelta::from_std(ttl)
            .ok()
            .and_then(|delta| now.checked_add_signed(delta));
        let mut entries = self.lock()?;
        entries.retain(|_, entry| entry.is_live(now));
        entries.insert(
            key.to_owned(),
            Entry {
                value: value.clone(),
                expires_at,
            },
        );
        Ok(())
    }

    async fn forget_by_prefix(&self, prefix: &str) -> Result<u64, ResponseCacheError> {
        let mut entries = self.lock()?;
        let before = entries.len();
        entries.retain(|key, _| !key.starts_with(prefix));
        Ok(u64::try_from(before - entries.len()).unwrap_or(u64::MAX))
    }
}
