use std::path::Path;
use std::sync::Arc;

use clap::Parser;
use color_eyre::eyre::{Result, WrapErr};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use hydragen::application::{ImageResolver, ProviderChain};
use hydragen::domain::entities::ProviderKind;
use hydragen::domain::ports::{CompoundMetadataPort, CooldownStorePort, ImageProviderPort};
use hydragen::infrastructure::{
    AppConfig, CactusProvider, ChemblProvider, CliArgs, DiskImageCache,
    InMemoryCompoundMetadataStore, InMemoryCooldownStore, PostgresCompoundMetadataStore,
    PostgresCooldownStore, StorageManager, build_client, create_pool,
};

fn init_logging(config: &AppConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level.to_string()));

    if let Some(log_path) = &config.log_path {
        if let Some(parent) = log_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(log_path)?;

        let file_layer = fmt::layer()
            .with_writer(file)
            .with_ansi(false)
            .with_target(true)
            .with_thread_ids(false);

        tracing_subscriber::registry()
            .with(filter)
            .with(file_layer)
            .init();

        info!(path = %log_path.display(), "Logging initialized");
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_writer(std::io::stderr))
            .init();
    }

    Ok(())
}

fn load_config() -> Result<AppConfig> {
    let args = CliArgs::parse();
    let mut config = match args.config.as_deref() {
        Some(path) => {
            let dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
            StorageManager::with_dir(dir).load_config(Some(path))?
        }
        None => StorageManager::new()?.load_config(None)?,
    };
    config.apply_overrides(args);
    Ok(config)
}

async fn build_stores(
    config: &AppConfig,
) -> Result<(Arc<dyn CompoundMetadataPort>, Arc<dyn CooldownStorePort>)> {
    let Some(database) = &config.database else {
        warn!("No database configured, using built-in compounds and in-memory cooldowns");
        let metadata: Arc<dyn CompoundMetadataPort> =
            Arc::new(InMemoryCompoundMetadataStore::with_fallback_compounds());
        let cooldowns: Arc<dyn CooldownStorePort> = Arc::new(InMemoryCooldownStore::new());
        return Ok((metadata, cooldowns));
    };

    let pool = create_pool(database)?;
    let cooldowns = PostgresCooldownStore::new(pool.clone());
    if let Err(e) = cooldowns.ensure_schema().await {
        warn!(error = %e, "Failed to ensure cooldown schema");
    }
    info!(host = %database.host, dbname = %database.dbname, "Using Postgres stores");
    let metadata: Arc<dyn CompoundMetadataPort> = Arc::new(PostgresCompoundMetadataStore::new(pool));
    let cooldowns: Arc<dyn CooldownStorePort> = Arc::new(cooldowns);
    Ok((metadata, cooldowns))
}

fn build_providers(config: &AppConfig) -> Result<ProviderChain> {
    let client = build_client(config.providers.timeout())?;
    let providers = config
        .providers
        .order
        .iter()
        .map(|kind| -> Arc<dyn ImageProviderPort> {
            match kind {
                ProviderKind::Chembl => Arc::new(ChemblProvider::with_base_url(
                    client.clone(),
                    &config.providers.chembl_base_url,
                )),
                ProviderKind::Cactus => Arc::new(CactusProvider::with_base_url(
                    client.clone(),
                    &config.providers.cactus_base_url,
                )),
            }
        })
        .collect();
    ProviderChain::new(providers).wrap_err("invalid provider order")
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    dotenvy::dotenv().ok();

    let config = load_config()?;
    init_logging(&config)?;

    info!(version = hydragen::VERSION, "Starting {}", hydragen::NAME);

    let (metadata, cooldowns) = build_stores(&config).await?;
    let cache = Arc::new(DiskImageCache::new(config.cache.asset_root.clone()));
    let providers = build_providers(&config)?;

    let resolver = ImageResolver::new(metadata, cache, cooldowns, providers)
        .with_timeout(config.server.request_timeout());
    info!(
        providers = ?resolver.provider_order(),
        asset_root = %config.cache.asset_root.display(),
        "Resolver ready"
    );

    hydragen::presentation::serve(Arc::new(resolver), config.server.listen_addr)
        .await
        .wrap_err("HTTP server failed")
}
