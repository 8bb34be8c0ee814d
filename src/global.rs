use crate::common::config::SyncConfig;
use crate::infra::db::mysql::{check_connection, make_mysql_pool, MySqlPool};
use crate::infra::external::bitstamp::BitstampExchange;
use crate::infra::external::rate_limiter::bitstamp_limiter::BitstampLimiter;
use anyhow::Context;
use once_cell::sync::OnceCell;
use std::sync::Arc;
use tracing::info;

pub static CONFIG: OnceCell<Arc<SyncConfig>> = OnceCell::new();
pub static MYSQL_POOL: OnceCell<MySqlPool> = OnceCell::new();
pub static BITSTAMP: OnceCell<Arc<BitstampExchange>> = OnceCell::new();

/// Builds the pool and the exchange client; fails when MySQL is unreachable.
pub fn init_global_services(config: SyncConfig) -> anyhow::Result<()> {
    let pool = make_mysql_pool(&config.database_url).context("Failed to initialize MySQL pool")?;
    check_connection(&pool).context("MySQL connectivity check failed")?;
    info!("MySQL connection ok");

    let limiter = BitstampLimiter::new(config.requests_per_minute);
    let exchange = BitstampExchange::new(&config.api_base_url, limiter)
        .context("Failed to build Bitstamp client")?;

    MYSQL_POOL
        .set(pool)
        .map_err(|_| anyhow::anyhow!("MySQL pool already initialized"))?;
    BITSTAMP
        .set(Arc::new(exchange))
        .map_err(|_| anyhow::anyhow!("Bitstamp client already initialized"))?;
    CONFIG
        .set(Arc::new(config))
        .map_err(|_| anyhow::anyhow!("Config already initialized"))?;
    Ok(())
}

/// Get a handle to the shared MySQL pool
pub fn get_mysql_pool() -> anyhow::Result<MySqlPool> {
    MYSQL_POOL
        .get()
        .cloned()
        .ok_or_else(|| anyhow::anyhow!("MySQL pool not initialized"))
}

pub fn get_bitstamp() -> anyhow::Result<Arc<BitstampExchange>> {
    BITSTAMP
        .get()
        .cloned()
        .ok_or_else(|| anyhow::anyhow!("Bitstamp client not initialized"))
}

pub fn get_config() -> anyhow::Result<Arc<SyncConfig>> {
    CONFIG
        .get()
        .cloned()
        .ok_or_else(|| anyhow::anyhow!("Config not initialized"))
}
