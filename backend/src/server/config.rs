//! HTTP server configuration object and helpers.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use booking_backend::domain::DEFAULT_CACHE_TTL;
use booking_backend::inbound::http::DEFAULT_MAX_BODY_BYTES;
use booking_backend::outbound::cache::RedisResponseCache;
use booking_backend::outbound::persistence::DbPool;
use url::Url;

/// Builder-style configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) bind_addr: SocketAddr,
    pub(crate) public_base_url: Url,
    pub(crate) upload_dir: PathBuf,
    pub(crate) cache_ttl: Duration,
    pub(crate) api_token: Option<String>,
    pub(crate) max_body_bytes: usize,
    pub(crate) db_pool: Option<DbPool>,
    pub(crate) redis: Option<RedisResponseCache>,
}

impl ServerConfig {
    /// Configuration with in-memory adapters and no bearer token.
    #[must_use]
    pub fn new(bind_addr: SocketAddr, public_base_url: Url, upload_dir: PathBuf) -> Self {
        Self {
            bind_addr,
            public_base_url,
            upload_dir,
            cache_ttl: DEFAULT_CACHE_TTL,
            api_token: None,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
            db_pool: None,
            redis: None,
        }
    }

    /// Attach a database connection pool for the repositories.
    ///
    /// Without one the server keeps bookings and countries in memory.
    #[must_use]
    pub fn with_db_pool(mut self, pool: DbPool) -> Self {
        self.db_pool = Some(pool);
        self
    }

    /// Cache list pages in Redis instead of process memory.
    #[must_use]
    pub fn with_redis(mut self, redis: RedisResponseCache) -> Self {
        self.redis = Some(redis);
        self
    }

    /// Lifetime of cached list pages.
    #[must_use]
    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }

    /// Require `token` as a bearer token on resource routes.
    #[must_use]
    pub fn with_api_token(mut self, token: Option<String>) -> Self {
        self.api_token = token;
        self
    }

    /// Largest JSON request body accepted, in bytes.
    #[must_use]
    pub fn with_max_body_bytes(mut self, limit: usize) -> Self {
        self.max_body_bytes = limit;
        self
    }

    /// Return the socket address the server will bind to.
    #[cfg_attr(
        not(any(test, doctest)),
        expect(dead_code, reason = "Exercised by server tests")
    )]
    #[must_use]
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
    }
}
