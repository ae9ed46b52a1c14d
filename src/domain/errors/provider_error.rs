//! Provider fetch errors.

use thiserror::Error;

/// Failures of a single provider fetch.
///
/// All variants are absorbed by the resolver: they register a cooldown
/// failure and advance to the next provider.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[allow(missing_docs)]
pub enum ProviderError {
    #[error("no image available")]
    NotFound,

    #[error("network error: {0}")]
    Network(String),

    #[error("unexpected HTTP status {0}")]
    Status(u16),

    #[error("provider returned an empty body")]
    EmptyBody,

    #[error("provider request timed out")]
    Timeout,
}
