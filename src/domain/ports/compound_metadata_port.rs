//! Port definition for compound metadata lookup.

use async_trait::async_trait;

use crate::domain::entities::{CompoundKey, CompoundMetadata};
use crate::domain::errors::MetadataError;

/// Read-only access to compound attributes.
#[async_trait]
pub trait CompoundMetadataPort: Send + Sync {
    /// Returns metadata for the key, or [`MetadataError::NotFound`].
    async fn get(&self, key: &CompoundKey) -> Result<CompoundMetadata, MetadataError>;
}
