//! Application configuration.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::args::CliArgs;
use crate::domain::entities::ProviderKind;
use crate::infrastructure::image::DEFAULT_ASSET_ROOT;
use crate::infrastructure::providers::{CACTUS_STRUCTURE_BASE, CHEMBL_IMAGE_BASE};

pub(super) const APP_NAME: &str = "hydragen";
pub(super) const APP_QUALIFIER: &str = "org";
pub(super) const APP_ORGANIZATION: &str = "hydragen";

const DB_ENV_PREFIX: &str = "HYDRAGEN_DB_";

/// Log level configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Trace level.
    Trace,
    /// Debug level.
    Debug,
    /// Info level.
    #[default]
    Info,
    /// Warning level.
    Warn,
    /// Error level.
    Error,
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        };
        f.write_str(s)
    }
}

/// Root configuration, read from `config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Log file path. Logs go to stderr when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_path: Option<PathBuf>,

    /// Log verbosity level.
    #[serde(default)]
    pub log_level: LogLevel,

    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Image cache settings.
    #[serde(default)]
    pub cache: CacheConfig,

    /// Provider chain settings.
    #[serde(default)]
    pub providers: ProvidersConfig,

    /// Postgres connection. In-memory stores are used when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database: Option<DatabaseConfig>,
}

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Socket address to bind.
    #[serde(default = "default_listen_addr")]
    pub listen_addr: SocketAddr,

    /// Deadline for a single image resolution, in seconds.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl ServerConfig {
    /// Resolution deadline as a [`Duration`].
    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

/// Image cache settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Directory under which `inchikey/...` is laid out.
    #[serde(default = "default_asset_root")]
    pub asset_root: PathBuf,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            asset_root: default_asset_root(),
        }
    }
}

/// Provider chain settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProvidersConfig {
    /// Providers in priority order.
    #[serde(default = "default_provider_order")]
    pub order: Vec<ProviderKind>,

    /// Base URL of the Chembl image endpoint.
    #[serde(default = "default_chembl_base_url")]
    pub chembl_base_url: String,

    /// Base URL of the Cactus structure endpoint.
    #[serde(default = "default_cactus_base_url")]
    pub cactus_base_url: String,

    /// Per-request HTTP timeout, in seconds.
    #[serde(default = "default_provider_timeout_secs")]
    pub timeout_secs: u64,
}

impl ProvidersConfig {
    /// Per-request timeout as a [`Duration`].
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        Self {
            order: default_provider_order(),
            chembl_base_url: default_chembl_base_url(),
            cactus_base_url: default_cactus_base_url(),
            timeout_secs: default_provider_timeout_secs(),
        }
    }
}

/// Postgres connection settings.
#[derive(Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Full connection string. Takes precedence over the discrete fields.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Server host.
    #[serde(default = "default_db_host")]
    pub host: String,
    /// Server port.
    #[serde(default = "default_db_port")]
    pub port: u16,
    /// Database name.
    #[serde(default = "default_db_name")]
    pub dbname: String,
    /// Login role.
    #[serde(default = "default_db_user")]
    pub user: String,
    /// Login password.
    #[serde(default)]
    pub password: String,
    /// Maximum pooled connections.
    #[serde(default = "default_pool_size")]
    pub pool_size: usize,
}

impl DatabaseConfig {
    /// Overrides fields from `HYDRAGEN_DB_*` variables.
    ///
    /// Returns true if any variable was applied. Unparseable numbers are ignored.
    fn apply_env_with(&mut self, lookup: impl Fn(&str) -> Option<String>) -> bool {
        let var = |suffix: &str| lookup(&format!("{DB_ENV_PREFIX}{suffix}"));
        let mut applied = false;

        if let Some(url) = var("URL") {
            self.url = Some(url);
            applied = true;
        }
        if let Some(host) = var("HOST") {
            self.host = host;
            applied = true;
        }
        if let Some(port) = var("PORT").and_then(|p| p.parse().ok()) {
            self.port = port;
            applied = true;
        }
        if let Some(dbname) = var("NAME") {
            self.dbname = dbname;
            applied = true;
        }
        if let Some(user) = var("USER") {
            self.user = user;
            applied = true;
        }
        if let Some(password) = var("PASSWORD") {
            self.password = password;
            applied = true;
        }
        if let Some(size) = var("POOL_SIZE").and_then(|s| s.parse().ok()) {
            self.pool_size = size;
            applied = true;
        }
        applied
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            host: default_db_host(),
            port: default_db_port(),
            dbname: default_db_name(),
            user: default_db_user(),
            password: String::new(),
            pool_size: default_pool_size(),
        }
    }
}

impl std::fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("url", &self.url.as_ref().map(|_| "[REDACTED]"))
            .field("host", &self.host)
            .field("port", &self.port)
            .field("dbname", &self.dbname)
            .field("user", &self.user)
            .field("password", &"[REDACTED]")
            .field("pool_size", &self.pool_size)
            .finish()
    }
}

fn default_listen_addr() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 8080))
}

const fn default_request_timeout_secs() -> u64 {
    15
}

fn default_asset_root() -> PathBuf {
    PathBuf::from(DEFAULT_ASSET_ROOT)
}

fn default_provider_order() -> Vec<ProviderKind> {
    ProviderKind::ALL.to_vec()
}

fn default_chembl_base_url() -> String {
    CHEMBL_IMAGE_BASE.to_string()
}

fn default_cactus_base_url() -> String {
    CACTUS_STRUCTURE_BASE.to_string()
}

const fn default_provider_timeout_secs() -> u64 {
    10
}

fn default_db_host() -> String {
    "localhost".to_string()
}

const fn default_db_port() -> u16 {
    5432
}

fn default_db_name() -> String {
    "hydragen".to_string()
}

fn default_db_user() -> String {
    "postgres".to_string()
}

const fn default_pool_size() -> usize {
    8
}

impl AppConfig {
    /// Merges CLI arguments into the configuration.
    pub fn merge_with_args(&mut self, args: CliArgs) {
        if let Some(log_path) = args.log_path {
            self.log_path = Some(log_path);
        }
        if let Some(log_level) = args.log_level {
            self.log_level = log_level;
        }
        if let Some(listen_addr) = args.listen_addr {
            self.server.listen_addr = listen_addr;
        }
        if let Some(timeout) = args.request_timeout_secs {
            self.server.request_timeout_secs = timeout;
        }
        if let Some(asset_root) = args.asset_root {
            self.cache.asset_root = asset_root;
        }
        if !args.providers.is_empty() {
            self.providers.order = args.providers;
        }
        if let Some(url) = args.database_url {
            self.database.get_or_insert_with(DatabaseConfig::default).url = Some(url);
        }
    }

    /// Applies `HYDRAGEN_DB_*` variables, then CLI arguments, so an explicit
    /// flag always beats the environment.
    pub fn apply_overrides(&mut self, args: CliArgs) {
        self.apply_overrides_with(args, |name| std::env::var(name).ok());
    }

    fn apply_overrides_with(&mut self, args: CliArgs, lookup: impl Fn(&str) -> Option<String>) {
        match self.database.as_mut() {
            Some(database) => {
                database.apply_env_with(lookup);
            }
            None => {
                let mut database = DatabaseConfig::default();
                if database.apply_env_with(lookup) {
                    self.database = Some(database);
                }
            }
        }
        self.merge_with_args(args);
    }
}
