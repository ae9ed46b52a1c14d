mod compound_metadata_port;
mod cooldown_store_port;
mod image_cache_port;
mod image_provider_port;

pub use compound_metadata_port::CompoundMetadataPort;
pub use cooldown_store_port::CooldownStorePort;
pub use image_cache_port::{CacheLookup, ImageCachePort};
pub use image_provider_port::ImageProviderPort;
