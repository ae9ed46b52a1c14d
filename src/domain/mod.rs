//! Domain layer with core entities, errors, MIME mapping and port definitions.

/// Entity definitions.
pub mod entities;
/// Error types.
pub mod errors;
/// MIME type and extension mapping.
pub mod mime;
/// Port definitions.
pub mod ports;

pub use entities::{CompoundKey, CompoundMetadata, Image, ProviderKind, ResolvedImage};
pub use errors::{CacheError, CooldownError, KeyError, MetadataError, ProviderError};
pub use ports::{CompoundMetadataPort, CooldownStorePort, ImageCachePort, ImageProviderPort};
