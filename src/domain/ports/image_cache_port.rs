//! Port definition for the per-provider image cache.

use std::path::PathBuf;

use async_trait::async_trait;

use crate::domain::entities::{CompoundKey, Image, ProviderKind};
use crate::domain::errors::{CacheError, CacheResult};

/// Outcome of a cache read.
///
/// `image` alone decides hit or miss. `diagnostic` explains a miss, or
/// carries a warning alongside a hit, and is for logging only.
#[derive(Debug, Clone, Default)]
pub struct CacheLookup {
    /// Cached image, if any.
    pub image: Option<Image>,
    /// Non-fatal problem observed during the read.
    pub diagnostic: Option<CacheError>,
}

impl CacheLookup {
    /// Creates a clean hit.
    #[must_use]
    pub const fn hit(image: Image) -> Self {
        Self {
            image: Some(image),
            diagnostic: None,
        }
    }

    /// Creates a miss with an optional explanation.
    #[must_use]
    pub const fn miss(diagnostic: Option<CacheError>) -> Self {
        Self {
            image: None,
            diagnostic,
        }
    }

    /// Attaches a diagnostic.
    #[must_use]
    pub fn with_diagnostic(mut self, diagnostic: CacheError) -> Self {
        self.diagnostic = Some(diagnostic);
        self
    }

    /// Returns true on a hit.
    #[must_use]
    pub const fn found(&self) -> bool {
        self.image.is_some()
    }
}

/// Port for the persisted image cache keyed by (provider, compound key).
#[async_trait]
pub trait ImageCachePort: Send + Sync {
    /// Looks up the cached image. Never fails; problems surface as diagnostics.
    async fn fetch(&self, provider: ProviderKind, key: &CompoundKey) -> CacheLookup;

    /// Stores an image, replacing any previous content of the canonical file.
    /// Returns the written path.
    async fn save(
        &self,
        provider: ProviderKind,
        key: &CompoundKey,
        image: &Image,
    ) -> CacheResult<PathBuf>;
}

/// Test doubles for [`ImageCachePort`].
#[cfg(test)]
pub mod mock {
    use super::*;
    use parking_lot::Mutex;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// In-memory cache that records calls.
    #[derive(Default)]
    pub struct MockImageCache {
        entries: Mutex<HashMap<(ProviderKind, CompoundKey), Image>>,
        fail_saves: bool,
        fetches: AtomicUsize,
        saves: AtomicUsize,
    }

    impl MockImageCache {
        /// Creates an empty cache.
        pub fn new() -> Self {
            Self::default()
        }

        /// Creates a cache whose saves always fail.
        pub fn failing_saves() -> Self {
            Self {
                fail_saves: true,
                ..Self::default()
            }
        }

        /// Seeds an entry.
        pub fn insert(&self, provider: ProviderKind, key: &str, image: Image) {
            self.entries
                .lock()
                .insert((provider, CompoundKey::new(key)), image);
        }

        /// Returns a stored entry.
        pub fn get(&self, provider: ProviderKind, key: &str) -> Option<Image> {
            self.entries
                .lock()
                .get(&(provider, CompoundKey::new(key)))
                .cloned()
        }

        /// Number of `fetch` calls.
        pub fn fetch_count(&self) -> usize {
            self.fetches.load(Ordering::SeqCst)
        }

        /// Number of `save` calls, failed ones included.
        pub fn save_count(&self) -> usize {
            self.saves.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ImageCachePort for MockImageCache {
        async fn fetch(&self, provider: ProviderKind, key: &CompoundKey) -> CacheLookup {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            match self.entries.lock().get(&(provider, key.clone())) {
                Some(image) => CacheLookup::hit(image.clone()),
                None => CacheLookup::miss(None),
            }
        }

        async fn save(
            &self,
            provider: ProviderKind,
            key: &CompoundKey,
            image: &Image,
        ) -> CacheResult<PathBuf> {
            self.saves.fetch_add(1, Ordering::SeqCst);
            if self.fail_saves {
                return Err(CacheError::Io {
                    path: PathBuf::from("mock"),
                    message: "disk full".to_string(),
                });
            }
            self.entries
                .lock()
                .insert((provider, key.clone()), image.clone());
            Ok(PathBuf::from(format!("mock/{provider}/{key}")))
        }
    }
}
