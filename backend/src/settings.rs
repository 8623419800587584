//! Runtime configuration loaded via OrthoConfig.
//!
//! Every field is optional; accessors supply the defaults. Values come from
//! `BOOKING_*` environment variables, a configuration file, or the command
//! line, in OrthoConfig's usual precedence.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;
use thiserror::Error;
use url::Url;

use crate::domain::DEFAULT_CACHE_TTL;
use crate::inbound::http::DEFAULT_MAX_BODY_BYTES;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_PUBLIC_BASE_URL: &str = "http://localhost:8080";
const DEFAULT_UPLOAD_DIR: &str = "public/uploads";
const DEFAULT_CACHE_NAMESPACE: &str = "booking";
const DEFAULT_DB_MAX_CONNECTIONS: u32 = 10;

/// A configured value that could not be interpreted.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// `bind_addr` is not `host:port`.
    #[error("invalid bind address `{value}`: {message}")]
    BindAddr { value: String, message: String },
    /// `public_base_url` is not an absolute URL.
    #[error("invalid public base URL `{value}`: {message}")]
    PublicBaseUrl { value: String, message: String },
}

/// Application settings.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "BOOKING")]
pub struct AppSettings {
    /// Socket address the HTTP server binds to.
    pub bind_addr: Option<String>,
    /// PostgreSQL URL; in-memory repositories are used when absent.
    pub database_url: Option<String>,
    /// Upper bound on pooled database connections.
    pub db_max_connections: Option<u32>,
    /// Redis URL; an in-process cache is used when absent.
    pub redis_url: Option<String>,
    /// Prefix prepended to every Redis key.
    pub cache_namespace: Option<String>,
    /// Lifetime of cached list pages, in seconds.
    pub cache_ttl_secs: Option<u64>,
    /// Directory uploaded files are written to.
    pub upload_dir: Option<PathBuf>,
    /// Base URL attachment links are built from.
    pub public_base_url: Option<String>,
    /// Bearer token required on resource routes.
    pub api_token: Option<String>,
    /// Largest accepted JSON request body, in bytes.
    pub max_body_bytes: Option<usize>,
}

impl AppSettings {
    /// Address to bind, defaulting to `0.0.0.0:8080`.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::BindAddr`] when the value does not parse.
    pub fn bind_addr(&self) -> Result<SocketAddr, SettingsError> {
        let raw = self.bind_addr.as_deref().unwrap_or(DEFAULT_BIND_ADDR);
        raw.trim().parse().map_err(|err: std::net::AddrParseError| {
            SettingsError::BindAddr {
                value: raw.to_owned(),
                message: err.to_string(),
            }
        })
    }

    /// Base URL for attachment links, defaulting to `http://localhost:8080`.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::PublicBaseUrl`] when the value does not parse.
    pub fn public_base_url(&self) -> Result<Url, SettingsError> {
        let raw = self
            .public_base_url
            .as_deref()
            .unwrap_or(DEFAULT_PUBLIC_BASE_URL);
        Url::parse(raw.trim()).map_err(|err| SettingsError::PublicBaseUrl {
            value: raw.to_owned(),
            message: err.to_string(),
        })
    }

    /// Upload directory, defaulting to `public/uploads`.
    pub fn upload_dir(&self) -> PathBuf {
        self.upload_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_UPLOAD_DIR))
    }

    /// Cache entry lifetime, defaulting to five minutes.
    pub fn cache_ttl(&self) -> Duration {
        self.cache_ttl_secs
            .map_or(DEFAULT_CACHE_TTL, Duration::from_secs)
    }

    /// Redis key namespace, defaulting to `booking`.
    pub fn cache_namespace(&self) -> &str {
        self.cache_namespace
            .as_deref()
            .unwrap_or(DEFAULT_CACHE_NAMESPACE)
    }

    /// Database pool size, defaulting to ten.
    pub fn db_max_connections(&self) -> u32 {
        self.db_max_connections
            .unwrap_or(DEFAULT_DB_MAX_CONNECTIONS)
    }

    /// Request body limit, defaulting to 10 MiB. Zero counts as unset.
    pub fn max_body_bytes(&self) -> usize {
        self.max_body_bytes
            .filter(|limit| *limit > 0)
            .unwrap_or(DEFAULT_MAX_BODY_BYTES)
    }

    /// Database URL when one is configured and non-blank.
    pub fn database_url(&self) -> Option<&str> {
        non_blank(self.database_url.as_deref())
    }

    /// Redis URL when one is configured and non-blank.
    pub fn redis_url(&self) -> Option<&str> {
        non_blank(self.redis_url.as_deref())
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}
