//! Compound image resolution across cache, cooldowns and providers.
//!
//! For each provider in priority order:
//! 1. A cache hit is returned immediately, without touching cooldowns.
//! 2. A provider on cooldown is skipped without a network call.
//! 3. A failed fetch registers a cooldown failure and falls through.
//! 4. A successful fetch clears the cooldown, is cached and returned.
//!
//! Lower-level faults are logged and turned into one of those decisions; the
//! caller only ever sees an image or `None`.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;
use tracing::{debug, error, info, warn};

use super::provider_chain::ProviderChain;
use crate::domain::entities::{
    CompoundKey, CompoundMetadata, ImageSource, ProviderKind, ResolvedImage,
};
use crate::domain::errors::ProviderError;
use crate::domain::ports::{
    CompoundMetadataPort, CooldownStorePort, ImageCachePort, ImageProviderPort,
};

/// Deadline applied by [`ImageResolver::image`].
pub const DEFAULT_RESOLVE_TIMEOUT: Duration = Duration::from_secs(15);

/// Outcome of trying one provider.
enum Step {
    Resolved(ResolvedImage),
    Next,
    DeadlineExceeded,
}

/// Resolves display images for compounds.
pub struct ImageResolver {
    metadata: Arc<dyn CompoundMetadataPort>,
    cache: Arc<dyn ImageCachePort>,
    cooldowns: Arc<dyn CooldownStorePort>,
    providers: ProviderChain,
    default_timeout: Duration,
}

impl ImageResolver {
    /// Creates a resolver.
    #[must_use]
    pub fn new(
        metadata: Arc<dyn CompoundMetadataPort>,
        cache: Arc<dyn ImageCachePort>,
        cooldowns: Arc<dyn CooldownStorePort>,
        providers: ProviderChain,
    ) -> Self {
        Self {
            metadata,
            cache,
            cooldowns,
            providers,
            default_timeout: DEFAULT_RESOLVE_TIMEOUT,
        }
    }

    /// Overrides the deadline used by [`Self::image`].
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.default_timeout = timeout;
        self
    }

    /// Returns the provider priority order.
    #[must_use]
    pub fn provider_order(&self) -> Vec<ProviderKind> {
        self.providers.order()
    }

    /// Resolves an image using the default deadline.
    pub async fn image(&self, key: &str) -> Option<ResolvedImage> {
        self.image_with_deadline(key, Instant::now() + self.default_timeout)
            .await
    }

    /// Resolves an image, giving up once `deadline` passes.
    ///
    /// A provider call still running at the deadline is abandoned and counted
    /// as a timeout failure; later providers are not tried.
    pub async fn image_with_deadline(&self, key: &str, deadline: Instant) -> Option<ResolvedImage> {
        let key = CompoundKey::new(key);
        if key.is_empty() {
            debug!("Empty compound key");
            return None;
        }

        let compound = match self.metadata.get(&key).await {
            Ok(compound) => compound,
            Err(e) if e.is_not_found() => {
                info!(key = %key, "Unknown compound");
                return None;
            }
            Err(e) => {
                error!(key = %key, error = %e, "Failed to retrieve compound metadata");
                return None;
            }
        };

        for provider in self.providers.iter() {
            match self.try_provider(provider.as_ref(), &compound, deadline).await {
                Step::Resolved(resolved) => return Some(resolved),
                Step::Next => {}
                Step::DeadlineExceeded => {
                    warn!(key = %key, "Deadline exceeded before an image was resolved");
                    return None;
                }
            }
        }

        info!(key = %key, providers = ?self.providers.order(), "No provider produced an image");
        None
    }

    async fn try_provider(
        &self,
        provider: &dyn ImageProviderPort,
        compound: &CompoundMetadata,
        deadline: Instant,
    ) -> Step {
        let kind = provider.kind();
        let key = &compound.inchi_key;

        let lookup = self.cache.fetch(kind, key).await;
        if let Some(image) = lookup.image {
            if let Some(warning) = lookup.diagnostic {
                warn!(provider = %kind, key = %key, warning = %warning, "Image cache anomaly");
            }
            debug!(provider = %kind, key = %key, "Serving image from cache");
            return Step::Resolved(ResolvedImage {
                image,
                provider: kind,
                source: ImageSource::Cache,
            });
        }
        match lookup.diagnostic {
            Some(reason) if reason.is_cold_miss() => {
                debug!(provider = %kind, key = %key, reason = %reason, "Image cache miss");
            }
            Some(reason) => {
                info!(provider = %kind, key = %key, error = %reason, "Failed to fetch image from cache");
            }
            None => {}
        }

        match self.cooldowns.on_cooldown(kind, key).await {
            Ok(true) => {
                info!(provider = %kind, key = %key, "Provider on cooldown, skipping");
                return Step::Next;
            }
            Ok(false) => {}
            Err(e) => {
                error!(
                    provider = %kind,
                    key = %key,
                    error = %e,
                    "Cooldown check failed, treating provider as available"
                );
            }
        }

        if Instant::now() >= deadline {
            return Step::DeadlineExceeded;
        }

        let result = match tokio::time::timeout_at(deadline, provider.fetch_image(compound)).await {
            Ok(result) => result,
            Err(_) => {
                self.register_failure(kind, key, &ProviderError::Timeout).await;
                return Step::DeadlineExceeded;
            }
        };

        let image = match result {
            Ok(image) if image.is_empty() => {
                self.register_failure(kind, key, &ProviderError::EmptyBody).await;
                return Step::Next;
            }
            Ok(image) => image,
            Err(e) => {
                self.register_failure(kind, key, &e).await;
                return Step::Next;
            }
        };

        if let Err(e) = self.cooldowns.clear(kind, key).await {
            error!(provider = %kind, key = %key, error = %e, "Failed to remove cooldown on success");
        }
        if let Err(e) = self.cache.save(kind, key, &image).await {
            error!(provider = %kind, key = %key, error = %e, "Failed to save image to cache");
        }

        info!(
            provider = %kind,
            key = %key,
            mime_type = %image.mime_type,
            size = image.len(),
            "Resolved image from provider"
        );
        Step::Resolved(ResolvedImage {
            image,
            provider: kind,
            source: ImageSource::Network,
        })
    }

    async fn register_failure(&self, kind: ProviderKind, key: &CompoundKey, cause: &ProviderError) {
        info!(provider = %kind, key = %key, error = %cause, "Error fetching image from provider");
        if let Err(e) = self.cooldowns.register_failure(kind, key).await {
            error!(provider = %kind, key = %key, error = %e, "Failed to add cooldown after fetch error");
        }
    }
}

impl std::fmt::Debug for ImageResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageResolver")
            .field("providers", &self.providers)
            .field("default_timeout", &self.default_timeout)
            .finish_non_exhaustive()
    }
}
