//! Domain error types.

mod cache_error;
mod cooldown_error;
mod key_error;
mod metadata_error;
mod provider_error;

pub use cache_error::{CacheError, CacheResult};
pub use cooldown_error::CooldownError;
pub use key_error::KeyError;
pub use metadata_error::MetadataError;
pub use provider_error::ProviderError;
