//! Port definition for provider backoff state.

use async_trait::async_trait;

use crate::domain::entities::{CompoundKey, CooldownRecord, ProviderKind};
use crate::domain::errors::CooldownError;

/// Port for persisted per-(provider, key) cooldowns.
///
/// `register_failure` must be a single atomic read-modify-write so that two
/// racing failures both count.
#[async_trait]
pub trait CooldownStorePort: Send + Sync {
    /// Returns true iff a record exists and now is before its retry instant.
    async fn on_cooldown(
        &self,
        provider: ProviderKind,
        key: &CompoundKey,
    ) -> Result<bool, CooldownError>;

    /// Creates or extends the cooldown after a failed fetch.
    async fn register_failure(
        &self,
        provider: ProviderKind,
        key: &CompoundKey,
    ) -> Result<(), CooldownError>;

    /// Deletes the record after a successful fetch. No-op if absent.
    async fn clear(&self, provider: ProviderKind, key: &CompoundKey)
    -> Result<(), CooldownError>;

    /// Returns the stored record, expired or not.
    async fn record(
        &self,
        provider: ProviderKind,
        key: &CompoundKey,
    ) -> Result<Option<CooldownRecord>, CooldownError>;
}
