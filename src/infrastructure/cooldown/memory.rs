//! Process-local cooldown store.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use tracing::debug;

use crate::domain::entities::{CompoundKey, CooldownRecord, ProviderKind};
use crate::domain::errors::CooldownError;
use crate::domain::ports::CooldownStorePort;

/// Source of the current time.
pub type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// Cooldown store kept in memory, used when no database is configured.
///
/// Each operation holds the lock for its whole read-modify-write, so racing
/// failures on the same pair are serialized.
pub struct InMemoryCooldownStore {
    records: Mutex<HashMap<(ProviderKind, CompoundKey), CooldownRecord>>,
    clock: Clock,
}

impl InMemoryCooldownStore {
    /// Creates an empty store using the system clock.
    #[must_use]
    pub fn new() -> Self {
        Self::with_clock(Arc::new(Utc::now))
    }

    /// Creates an empty store with a custom clock.
    #[must_use]
    pub fn with_clock(clock: Clock) -> Self {
        Self {
            records: Mutex::new(HashMap::new()),
            clock,
        }
    }

    /// Returns the number of stored records, expired ones included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    /// Returns true if no records are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for InMemoryCooldownStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for InMemoryCooldownStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryCooldownStore")
            .field("records", &self.len())
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl CooldownStorePort for InMemoryCooldownStore {
    async fn on_cooldown(
        &self,
        provider: ProviderKind,
        key: &CompoundKey,
    ) -> Result<bool, CooldownError> {
        let now = (self.clock)();
        Ok(self
            .records
            .lock()
            .get(&(provider, key.clone()))
            .is_some_and(|record| record.is_active(now)))
    }

    async fn register_failure(
        &self,
        provider: ProviderKind,
        key: &CompoundKey,
    ) -> Result<(), CooldownError> {
        let now = (self.clock)();
        let mut records = self.records.lock();
        let slot = (provider, key.clone());
        let next = CooldownRecord::after_failure(records.get(&slot), now);
        records.insert(slot, next);
        drop(records);

        debug!(
            provider = %provider,
            key = %key,
            hours = next.current_cooldown_hours,
            until = %next.earliest_next_request,
            "Registered provider failure"
        );
        Ok(())
    }

    async fn clear(
        &self,
        provider: ProviderKind,
        key: &CompoundKey,
    ) -> Result<(), CooldownError> {
        self.records.lock().remove(&(provider, key.clone()));
        Ok(())
    }

    async fn record(
        &self,
        provider: ProviderKind,
        key: &CompoundKey,
    ) -> Result<Option<CooldownRecord>, CooldownError> {
        Ok(self.records.lock().get(&(provider, key.clone())).copied())
    }
}
