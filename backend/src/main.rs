//! Backend entry-point: loads settings, connects adapters, and serves the
//! REST endpoints with OpenAPI docs.

mod server;

use actix_web::web;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use booking_backend::inbound::http::health::HealthState;
use booking_backend::outbound::cache::{RedisCacheConfig, RedisResponseCache};
use booking_backend::outbound::persistence::{DbPool, PoolConfig};
use booking_backend::settings::AppSettings;
use ortho_config::OrthoConfig;

use server::{ServerConfig, create_server};

fn startup_error(context: &str, err: impl std::fmt::Display) -> std::io::Error {
    std::io::Error::other(format!("{context}: {err}"))
}

async fn build_server_config(settings: &AppSettings) -> std::io::Result<ServerConfig> {
    let bind_addr = settings
        .bind_addr()
        .map_err(|err| startup_error("settings", err))?;
    let public_base_url = settings
        .public_base_url()
        .map_err(|err| startup_error("settings", err))?;

    let mut config = ServerConfig::new(bind_addr, public_base_url, settings.upload_dir())
        .with_cache_ttl(settings.cache_ttl())
        .with_api_token(settings.api_token.clone())
        .with_max_body_bytes(settings.max_body_bytes());

    if let Some(url) = settings.database_url() {
        let pool = DbPool::new(
            PoolConfig::new(url).with_max_size(settings.db_max_connections()),
        )
        .await
        .map_err(|err| startup_error("database pool", err))?;
        config = config.with_db_pool(pool);
    }

    if let Some(url) = settings.redis_url() {
        let redis = RedisResponseCache::connect(
            RedisCacheConfig::new(url).with_namespace(format!("{}:", settings.cache_namespace())),
        )
        .await
        .map_err(|err| startup_error("redis cache", err))?;
        config = config.with_redis(redis);
    }

    Ok(config)
}

/// Application bootstrap.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = AppSettings::load_from_iter(std::env::args_os())
        .map_err(|err| startup_error("settings", err))?;
    let config = build_server_config(&settings).await?;
    info!(
        bind_addr = %config.bind_addr,
        persistent = config.db_pool.is_some(),
        redis = config.redis.is_some(),
        auth = settings.api_token.is_some(),
        "starting booking backend"
    );

    let health_state = web::Data::new(HealthState::new());
    let server = create_server(health_state, config)?;
    server.await
}
