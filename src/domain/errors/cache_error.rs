//! Image cache diagnostics.

use std::path::PathBuf;

use thiserror::Error;

use super::KeyError;

/// Result type for cache operations.
pub type CacheResult<T> = std::result::Result<T, CacheError>;

/// Problems encountered while reading or writing the image cache.
///
/// On the read path these are diagnostics only: the resolver treats every
/// one of them as a miss.
#[derive(Debug, Clone, Error)]
#[allow(missing_docs)]
pub enum CacheError {
    #[error("cache path unavailable: {0}")]
    InvalidKey(#[from] KeyError),

    #[error("cache directory {} not found", dir.display())]
    Missing { dir: PathBuf },

    #[error("no files found in cache directory {}", dir.display())]
    Empty { dir: PathBuf },

    #[error("no readable files in cache directory {}", dir.display())]
    Unreadable { dir: PathBuf },

    #[error("{count} files in cache directory {}, using {}", dir.display(), selected.display())]
    Duplicates {
        dir: PathBuf,
        count: usize,
        selected: PathBuf,
    },

    #[error("io error at {}: {message}", path.display())]
    Io { path: PathBuf, message: String },
}

impl CacheError {
    /// Creates an I/O error for a path.
    #[must_use]
    pub fn io(path: impl Into<PathBuf>, err: &std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            message: err.to_string(),
        }
    }

    /// Returns true for the ordinary "nothing cached yet" case.
    #[must_use]
    pub const fn is_cold_miss(&self) -> bool {
        matches!(self, Self::Missing { .. } | Self::Empty { .. })
    }
}
