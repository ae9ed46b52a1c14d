//! Infrastructure layer with external service adapters.

/// Application configuration.
pub mod config;
/// Cooldown store adapters.
pub mod cooldown;
/// Postgres connection pool.
pub mod database;
/// On-disk image cache.
pub mod image;
/// Compound metadata adapters.
pub mod metadata;
/// Chembl and Cactus HTTP adapters.
pub mod providers;

pub use config::{AppConfig, CliArgs, ConfigError, DatabaseConfig, LogLevel, StorageManager};
pub use cooldown::{InMemoryCooldownStore, PostgresCooldownStore};
pub use database::{PoolError, create_pool};
pub use image::DiskImageCache;
pub use metadata::{InMemoryCompoundMetadataStore, PostgresCompoundMetadataStore};
pub use providers::{CactusProvider, ChemblProvider, build_client};
