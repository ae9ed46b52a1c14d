//! Resolved image payloads.

use bytes::Bytes;

use crate::domain::entities::ProviderKind;

/// Image payload with its MIME type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Image {
    /// Raw image bytes.
    pub bytes: Bytes,
    /// MIME type as reported by the provider or derived from the cache file.
    /// May be empty when a provider omitted it.
    pub mime_type: String,
}

impl Image {
    /// Creates a new image.
    #[must_use]
    pub fn new(bytes: impl Into<Bytes>, mime_type: impl Into<String>) -> Self {
        Self {
            bytes: bytes.into(),
            mime_type: mime_type.into(),
        }
    }

    /// Returns the payload size in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Returns true if the payload is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Where a resolved image came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageSource {
    /// Served from the on-disk cache.
    Cache,
    /// Downloaded from the provider during this resolution.
    Network,
}

/// Result of a successful resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedImage {
    /// The image.
    pub image: Image,
    /// Provider the image belongs to.
    pub provider: ProviderKind,
    /// Cache or network.
    pub source: ImageSource,
}
