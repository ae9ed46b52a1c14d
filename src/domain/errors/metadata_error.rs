//! Compound metadata lookup errors.

use thiserror::Error;

/// Metadata lookup failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[allow(missing_docs)]
pub enum MetadataError {
    #[error("compound not found: {0}")]
    NotFound(String),

    #[error("failed to acquire database connection: {0}")]
    Pool(String),

    #[error("metadata query failed: {0}")]
    Database(String),
}

impl MetadataError {
    /// Returns true if the compound is simply unknown.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}
