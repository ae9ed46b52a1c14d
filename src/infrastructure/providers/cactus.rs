//! NCI/CADD Chemical Identifier Resolver ("cactus") adapter.

use async_trait::async_trait;
use reqwest::{Client, Url};
use tracing::{debug, warn};

use super::client::get_body;
use crate::domain::entities::{CompoundMetadata, Image, ProviderKind};
use crate::domain::errors::ProviderError;
use crate::domain::ports::ImageProviderPort;

/// Production structure endpoint.
pub const CACTUS_STRUCTURE_BASE: &str = "https://cactus.nci.nih.gov/chemical/structure";

/// Renders structures from cactus, trying `InChIKey`, then SMILES, then name.
///
/// The first non-empty body wins. The HTTP status is not checked and the
/// `Content-Type` header is used verbatim.
#[derive(Debug, Clone)]
pub struct CactusProvider {
    client: Client,
    base_url: String,
}

impl CactusProvider {
    /// Creates a provider against the production endpoint.
    #[must_use]
    pub fn new(client: Client) -> Self {
        Self::with_base_url(client, CACTUS_STRUCTURE_BASE)
    }

    /// Creates a provider against a custom endpoint.
    #[must_use]
    pub fn with_base_url(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    /// Returns the image URL for one identifier, percent-encoding it as a
    /// single path segment.
    #[must_use]
    pub fn image_url(&self, identifier: &str) -> Option<String> {
        let mut url = Url::parse(&self.base_url).ok()?;
        url.path_segments_mut()
            .ok()?
            .pop_if_empty()
            .push(identifier)
            .push("image");
        Some(url.into())
    }

    /// Candidate URLs in lookup order, skipping empty identifiers.
    #[must_use]
    pub fn candidate_urls(&self, compound: &CompoundMetadata) -> Vec<String> {
        [
            compound.inchi_key.as_str(),
            compound.smiles.as_str(),
            compound.name.as_str(),
        ]
        .into_iter()
        .filter(|id| !id.is_empty())
        .filter_map(|id| self.image_url(id))
        .collect()
    }
}

#[async_trait]
impl ImageProviderPort for CactusProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Cactus
    }

    async fn fetch_image(&self, compound: &CompoundMetadata) -> Result<Image, ProviderError> {
        let urls = self.candidate_urls(compound);
        if urls.is_empty() {
            warn!(base_url = %self.base_url, key = %compound.inchi_key, "No usable cactus identifiers");
        }

        for url in urls {
            let fetched = match get_body(&self.client, &url).await {
                Ok(fetched) => fetched,
                Err(e) => {
                    debug!(url = %url, error = %e, "Cactus request failed, trying next identifier");
                    continue;
                }
            };
            if fetched.body.is_empty() {
                debug!(url = %url, status = %fetched.status, "Cactus returned empty body");
                continue;
            }
            debug!(url = %url, status = %fetched.status, size = fetched.body.len(), "Cactus image fetched");
            return Ok(Image::new(fetched.body, fetched.content_type));
        }

        Err(ProviderError::NotFound)
    }
}
