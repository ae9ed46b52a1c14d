use super::app_config::LogLevel;
use crate::domain::entities::ProviderKind;
use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;

/// Command-line arguments. Every flag overrides the matching config entry.
#[derive(Debug, Parser)]
#[command(
    name = "hydragen",
    version,
    about = "Serves compound structure images with provider fallback and caching",
    long_about = None
)]
pub struct CliArgs {
    /// Configuration file path.
    #[arg(short, long, value_name = "PATH", env = "HYDRAGEN_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log file path.
    #[arg(long, value_name = "PATH", env = "HYDRAGEN_LOG_PATH")]
    pub log_path: Option<PathBuf>,

    /// Log verbosity level.
    #[arg(long, value_enum, env = "HYDRAGEN_LOG_LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Address to listen on.
    #[arg(long, value_name = "ADDR", env = "HYDRAGEN_LISTEN_ADDR")]
    pub listen_addr: Option<SocketAddr>,

    /// Image resolution deadline in seconds.
    #[arg(long, value_name = "SECS")]
    pub request_timeout_secs: Option<u64>,

    /// Root directory of the image cache.
    #[arg(long, value_name = "PATH", env = "HYDRAGEN_ASSET_ROOT")]
    pub asset_root: Option<PathBuf>,

    /// Provider priority; repeat to list several.
    #[arg(long = "provider", value_name = "NAME")]
    pub providers: Vec<ProviderKind>,

    /// Postgres connection string.
    #[arg(long, value_name = "URL", env = "HYDRAGEN_DATABASE_URL", hide_env_values = true)]
    pub database_url: Option<String>,
}
