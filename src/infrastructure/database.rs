//! PostgreSQL connection pool.

use deadpool_postgres::{Config, ManagerConfig, Pool, RecyclingMethod, Runtime};
use thiserror::Error;
use tokio_postgres::NoTls;
use tracing::info;

use super::config::DatabaseConfig;

/// Pool construction failure.
#[derive(Debug, Error)]
#[error("failed to create database pool: {0}")]
pub struct PoolError(String);

/// Creates a connection pool from configuration.
///
/// Connections are opened lazily, so this succeeds even if the server is
/// unreachable.
///
/// # Errors
/// Returns error if the configuration is invalid.
pub fn create_pool(config: &DatabaseConfig) -> Result<Pool, PoolError> {
    let mut cfg = Config::new();
    if let Some(url) = &config.url {
        cfg.url = Some(url.clone());
    } else {
        cfg.host = Some(config.host.clone());
        cfg.port = Some(config.port);
        cfg.dbname = Some(config.dbname.clone());
        cfg.user = Some(config.user.clone());
        cfg.password = Some(config.password.clone());
    }
    cfg.manager = Some(ManagerConfig {
        recycling_method: RecyclingMethod::Fast,
    });
    cfg.pool = Some(deadpool_postgres::PoolConfig::new(config.pool_size.max(1)));

    let pool = cfg
        .create_pool(Some(Runtime::Tokio1), NoTls)
        .map_err(|e| PoolError(e.to_string()))?;

    info!(
        host = %config.host,
        dbname = %config.dbname,
        pool_size = config.pool_size,
        "Database pool created"
    );
    Ok(pool)
}
