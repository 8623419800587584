//! Response cache adapters.
//!
//! - [`RedisResponseCache`]: `bb8-redis` pool, JSON text values with `SET EX`,
//!   prefix invalidation through a `SCAN`/`DEL` loop.
//! - [`InMemoryResponseCache`]: mutex-guarded map with clock-driven expiry,
//!   used when no Redis URL is configured and in tests.

mod memory;
mod redis;

pub use memory::InMemoryResponseCache;
pub use redis::{RedisCacheConfig, RedisResponseCache};
