//! Application configuration.

/// Config file sections and override precedence.
pub mod app_config;
/// Command-line flags.
pub mod args;
/// Locating, creating and parsing `config.toml`.
pub mod storage;

pub use app_config::{
    AppConfig, CacheConfig, DatabaseConfig, LogLevel, ProvidersConfig, ServerConfig,
};
pub use args::CliArgs;
pub use storage::{ConfigError, StorageManager};
