//! Cooldown store errors.

use thiserror::Error;

/// Cooldown persistence failures.
#[derive(Debug, Clone, Error)]
#[allow(missing_docs)]
pub enum CooldownError {
    #[error("failed to acquire database connection: {0}")]
    Pool(String),

    #[error("cooldown query failed: {0}")]
    Database(String),
}
