//! Disk-based image cache sharded by compound key prefix.
//!
//! Layout: `{root}/inchikey/{key[0..2]}/{key[2..4]}/{key}/{provider}/image{ext}`.
//! The layout is shared with earlier deployments and must not change.

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use async_trait::async_trait;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, error, trace, warn};

use crate::domain::entities::{CompoundKey, Image, ProviderKind};
use crate::domain::errors::{CacheError, CacheResult};
use crate::domain::mime::{extension_to_mime, mime_to_extension};
use crate::domain::ports::{CacheLookup, ImageCachePort};

/// Default cache root, relative to the working directory.
pub const DEFAULT_ASSET_ROOT: &str = "assets";

const KEY_NAMESPACE: &str = "inchikey";
const FILE_STEM: &str = "image";

/// Image cache storing one file per (provider, compound key).
#[derive(Debug, Clone)]
pub struct DiskImageCache {
    asset_root: PathBuf,
}

impl DiskImageCache {
    /// Creates a cache rooted at `asset_root`. No I/O happens until first use.
    #[must_use]
    pub fn new(asset_root: impl Into<PathBuf>) -> Self {
        Self {
            asset_root: asset_root.into(),
        }
    }

    /// Returns the cache root.
    #[must_use]
    pub fn asset_root(&self) -> &Path {
        &self.asset_root
    }

    /// Returns the directory holding the entry for (provider, key).
    ///
    /// # Errors
    /// Returns [`CacheError::InvalidKey`] if the key cannot be sharded.
    pub fn entry_dir(&self, provider: ProviderKind, key: &CompoundKey) -> CacheResult<PathBuf> {
        let (first, second) = key.shard_prefixes()?;
        Ok(self
            .asset_root
            .join(KEY_NAMESPACE)
            .join(first)
            .join(second)
            .join(key.as_str())
            .join(provider.as_str()))
    }

    /// Lists regular files in `dir` with their modification times.
    ///
    /// Returns the number of directory entries seen alongside the files that
    /// could be stat'ed.
    async fn list_candidates(dir: &Path) -> Result<(usize, Vec<(PathBuf, SystemTime)>), CacheError> {
        let mut entries = match fs::read_dir(dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(CacheError::Missing {
                    dir: dir.to_path_buf(),
                });
            }
            Err(e) => return Err(CacheError::io(dir, &e)),
        };

        let mut listed = 0usize;
        let mut files = Vec::new();
        loop {
            match entries.next_entry().await {
                Ok(Some(entry)) => {
                    listed += 1;
                    let path = entry.path();
                    match entry.metadata().await {
                        Ok(meta) if meta.is_file() => {
                            let modified = meta.modified().unwrap_or(SystemTime::UNIX_EPOCH);
                            files.push((path, modified));
                        }
                        Ok(_) => trace!(path = %path.display(), "Skipping non-file cache entry"),
                        Err(e) => {
                            debug!(path = %path.display(), error = %e, "Failed to stat cache entry");
                        }
                    }
                }
                Ok(None) => break,
                Err(e) => {
                    warn!(dir = %dir.display(), error = %e, "Failed to list cache directory");
                    break;
                }
            }
        }
        Ok((listed, files))
    }
}

#[async_trait]
impl ImageCachePort for DiskImageCache {
    async fn fetch(&self, provider: ProviderKind, key: &CompoundKey) -> CacheLookup {
        let dir = match self.entry_dir(provider, key) {
            Ok(dir) => dir,
            Err(e) => {
                error!(provider = %provider, key = %key, error = %e, "Unable to compute image cache directory");
                return CacheLookup::miss(Some(e));
            }
        };

        let (listed, files) = match Self::list_candidates(&dir).await {
            Ok(found) => found,
            Err(e) => {
                trace!(provider = %provider, key = %key, reason = %e, "Disk cache miss");
                return CacheLookup::miss(Some(e));
            }
        };

        if listed == 0 {
            trace!(dir = %dir.display(), "Image cache directory is empty");
            return CacheLookup::miss(Some(CacheError::Empty { dir }));
        }

        let Some((selected, _)) = files
            .iter()
            .max_by(|a, b| a.1.cmp(&b.1).then_with(|| a.0.cmp(&b.0)))
            .cloned()
        else {
            error!(dir = %dir.display(), listed, "No readable files in image cache directory");
            return CacheLookup::miss(Some(CacheError::Unreadable { dir }));
        };

        let bytes = match fs::read(&selected).await {
            Ok(bytes) if !bytes.is_empty() => bytes,
            Ok(_) => {
                warn!(path = %selected.display(), "Cached image file is empty");
                return CacheLookup::miss(Some(CacheError::Unreadable { dir }));
            }
            Err(e) => {
                error!(path = %selected.display(), error = %e, "Could not read selected cache file");
                return CacheLookup::miss(Some(CacheError::io(&selected, &e)));
            }
        };

        let mime_type = extension_to_mime(&selected.to_string_lossy());
        debug!(
            provider = %provider,
            key = %key,
            path = %selected.display(),
            size = bytes.len(),
            "Disk cache hit"
        );
        let lookup = CacheLookup::hit(Image::new(bytes, mime_type));

        if files.len() > 1 {
            let names: Vec<String> = files
                .iter()
                .map(|(path, _)| path.display().to_string())
                .collect();
            warn!(
                dir = %dir.display(),
                files = ?names,
                selected = %selected.display(),
                "Multiple files in image cache directory; using most recently modified"
            );
            return lookup.with_diagnostic(CacheError::Duplicates {
                dir,
                count: files.len(),
                selected,
            });
        }

        lookup
    }

    async fn save(
        &self,
        provider: ProviderKind,
        key: &CompoundKey,
        image: &Image,
    ) -> CacheResult<PathBuf> {
        let dir = self.entry_dir(provider, key)?;

        fs::create_dir_all(&dir)
            .await
            .map_err(|e| CacheError::io(&dir, &e))?;

        let path = dir.join(format!("{FILE_STEM}{}", mime_to_extension(&image.mime_type)));

        let mut file = fs::File::create(&path)
            .await
            .map_err(|e| CacheError::io(&path, &e))?;
        file.write_all(&image.bytes)
            .await
            .map_err(|e| CacheError::io(&path, &e))?;
        file.flush().await.map_err(|e| CacheError::io(&path, &e))?;

        debug!(
            provider = %provider,
            key = %key,
            path = %path.display(),
            size = image.len(),
            "Stored image in disk cache"
        );

        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tempfile::TempDir;

    const KEY: &str = "ABCDEF1234567890-UHFFFAOYSA-N";

    fn create_test_cache() -> (DiskImageCache, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let cache = DiskImageCache::new(temp_dir.path());
        (cache, temp_dir)
    }

    fn svg() -> Image {
        Image::new(&b"<svg xmlns=\"http://www.w3.org/2000/svg\"/>"[..], "image/svg+xml")
    }

    fn set_mtime(path: &Path, time: SystemTime) {
        std::fs::File::options()
            .write(true)
            .open(path)
            .unwrap()
            .set_modified(time)
            .unwrap();
    }

    #[test]
    fn test_entry_dir_layout() {
        let cache = DiskImageCache::new("assets");
        let dir = cache
            .entry_dir(ProviderKind::Chembl, &CompoundKey::new(KEY))
            .unwrap();
        assert_eq!(
            dir,
            PathBuf::from("assets/inchikey/AB/CD/ABCDEF1234567890-UHFFFAOYSA-N/chembl")
        );
    }

    #[tokio::test]
    async fn test_save_writes_canonical_file() {
        let (cache, temp) = create_test_cache();
        let key = CompoundKey::new(KEY);

        let path = cache.save(ProviderKind::Chembl, &key, &svg()).await.unwrap();

        let expected = temp
            .path()
            .join("inchikey/AB/CD/ABCDEF1234567890-UHFFFAOYSA-N/chembl/image.svg");
        assert_eq!(path, expected);
        assert_eq!(std::fs::read(&expected).unwrap(), svg().bytes.to_vec());
    }

    #[tokio::test]
    async fn test_save_and_fetch_round_trip() {
        let (cache, _temp) = create_test_cache();
        let key = CompoundKey::new(KEY);
        let image = Image::new(vec![0x89, b'P', b'N', b'G'], "image/png");

        cache.save(ProviderKind::Cactus, &key, &image).await.unwrap();
        let lookup = cache.fetch(ProviderKind::Cactus, &key).await;

        assert!(lookup.found());
        assert!(lookup.diagnostic.is_none());
        assert_eq!(lookup.image.unwrap(), image);
    }

    #[tokio::test]
    async fn test_providers_are_isolated() {
        let (cache, _temp) = create_test_cache();
        let key = CompoundKey::new(KEY);

        cache.save(ProviderKind::Cactus, &key, &svg()).await.unwrap();

        assert!(!cache.fetch(ProviderKind::Chembl, &key).await.found());
    }

    #[tokio::test]
    async fn test_missing_directory_is_cold_miss() {
        let (cache, _temp) = create_test_cache();
        let lookup = cache
            .fetch(ProviderKind::Chembl, &CompoundKey::new(KEY))
            .await;

        assert!(!lookup.found());
        assert!(matches!(lookup.diagnostic, Some(CacheError::Missing { .. })));
    }

    #[tokio::test]
    async fn test_empty_directory_is_miss() {
        let (cache, _temp) = create_test_cache();
        let key = CompoundKey::new(KEY);
        let dir = cache.entry_dir(ProviderKind::Chembl, &key).unwrap();
        std::fs::create_dir_all(&dir).unwrap();

        let lookup = cache.fetch(ProviderKind::Chembl, &key).await;

        assert!(!lookup.found());
        assert!(matches!(lookup.diagnostic, Some(CacheError::Empty { .. })));
    }

    #[tokio::test]
    async fn test_directory_with_only_subdirectories_is_unreadable() {
        let (cache, _temp) = create_test_cache();
        let key = CompoundKey::new(KEY);
        let dir = cache.entry_dir(ProviderKind::Chembl, &key).unwrap();
        std::fs::create_dir_all(dir.join("nested")).unwrap();

        let lookup = cache.fetch(ProviderKind::Chembl, &key).await;

        assert!(!lookup.found());
        assert!(matches!(lookup.diagnostic, Some(CacheError::Unreadable { .. })));
    }

    #[tokio::test]
    async fn test_empty_file_is_miss() {
        let (cache, _temp) = create_test_cache();
        let key = CompoundKey::new(KEY);
        let dir = cache.entry_dir(ProviderKind::Chembl, &key).unwrap();
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("image.svg"), b"").unwrap();

        assert!(!cache.fetch(ProviderKind::Chembl, &key).await.found());
    }

    #[tokio::test]
    async fn test_duplicates_pick_newest_with_warning() {
        let (cache, _temp) = create_test_cache();
        let key = CompoundKey::new(KEY);
        let dir = cache.entry_dir(ProviderKind::Chembl, &key).unwrap();
        std::fs::create_dir_all(&dir).unwrap();

        let old = dir.join("image.png");
        let new = dir.join("image.svg");
        std::fs::write(&old, b"old png").unwrap();
        std::fs::write(&new, b"<svg/>").unwrap();
        let now = SystemTime::now();
        set_mtime(&old, now - Duration::from_secs(3600));
        set_mtime(&new, now);

        let lookup = cache.fetch(ProviderKind::Chembl, &key).await;

        let image = lookup.image.clone().unwrap();
        assert_eq!(&image.bytes[..], b"<svg/>");
        assert_eq!(image.mime_type, "image/svg+xml");
        match lookup.diagnostic {
            Some(CacheError::Duplicates {
                count, selected, ..
            }) => {
                assert_eq!(count, 2);
                assert_eq!(selected, new);
            }
            other => panic!("expected duplicate warning, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_save_overwrites_same_extension() {
        let (cache, _temp) = create_test_cache();
        let key = CompoundKey::new(KEY);

        cache
            .save(ProviderKind::Chembl, &key, &Image::new(&b"first"[..], "image/svg+xml"))
            .await
            .unwrap();
        cache
            .save(ProviderKind::Chembl, &key, &Image::new(&b"second"[..], "image/svg+xml"))
            .await
            .unwrap();

        let lookup = cache.fetch(ProviderKind::Chembl, &key).await;
        assert!(lookup.diagnostic.is_none());
        assert_eq!(&lookup.image.unwrap().bytes[..], b"second");
    }

    #[tokio::test]
    async fn test_unknown_mime_is_stored_as_bin() {
        let (cache, _temp) = create_test_cache();
        let key = CompoundKey::new(KEY);

        let path = cache
            .save(ProviderKind::Cactus, &key, &Image::new(&b"GIF89a"[..], ""))
            .await
            .unwrap();
        assert!(path.ends_with("cactus/image.bin"));

        let image = cache.fetch(ProviderKind::Cactus, &key).await.image.unwrap();
        assert_eq!(image.mime_type, "application/octet-stream");
    }

    #[tokio::test]
    async fn test_short_key_fails_before_io() {
        let (cache, temp) = create_test_cache();
        let key = CompoundKey::new("AB1");

        let lookup = cache.fetch(ProviderKind::Chembl, &key).await;
        assert!(!lookup.found());
        assert!(matches!(lookup.diagnostic, Some(CacheError::InvalidKey(_))));

        let err = cache.save(ProviderKind::Chembl, &key, &svg()).await.unwrap_err();
        assert!(matches!(err, CacheError::InvalidKey(_)));
        assert!(!temp.path().join("inchikey").exists());
    }
}
