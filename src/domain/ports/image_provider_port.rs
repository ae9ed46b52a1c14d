//! Port definition for external image providers.

use async_trait::async_trait;

use crate::domain::entities::{CompoundMetadata, Image, ProviderKind};
use crate::domain::errors::ProviderError;

/// Port for one external image source.
///
/// Implementations are stateless; backoff lives in the cooldown store.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ImageProviderPort: Send + Sync {
    /// Identity of this provider.
    fn kind(&self) -> ProviderKind;

    /// Fetches a non-empty image for the compound.
    async fn fetch_image(&self, compound: &CompoundMetadata) -> Result<Image, ProviderError>;
}
