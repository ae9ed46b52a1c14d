//! Compound key addressing errors.

use thiserror::Error;

/// A compound key cannot be mapped onto a cache path.
///
/// Raised before any disk or network access.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[allow(missing_docs)]
pub enum KeyError {
    #[error("compound key {key:?} too short: got length {len}, want at least {min}")]
    TooShort { key: String, len: usize, min: usize },

    #[error("compound key {key:?} contains path characters")]
    IllegalCharacters { key: String },

    #[error("compound key {key:?} cannot be split into shard prefixes")]
    NotAddressable { key: String },
}
