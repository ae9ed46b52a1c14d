//! PostgreSQL-backed cooldown store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use deadpool_postgres::{Object, Pool};
use tracing::{debug, error};

use crate::domain::entities::{
    CompoundKey, CooldownRecord, INITIAL_COOLDOWN_HOURS, MAX_COOLDOWN_HOURS, ProviderKind,
};
use crate::domain::errors::CooldownError;
use crate::domain::ports::CooldownStorePort;

const CREATE_TABLE_SQL: &str = "
    CREATE TABLE IF NOT EXISTS third_party_cooldown (
        origin TEXT NOT NULL,
        unique_key TEXT NOT NULL,
        last_requested TIMESTAMPTZ NOT NULL,
        current_cooldown_duration_hours INTEGER NOT NULL,
        earliest_next_request TIMESTAMPTZ NOT NULL,
        PRIMARY KEY (origin, unique_key)
    )
";

const ON_COOLDOWN_SQL: &str = "
    SELECT earliest_next_request > NOW()
    FROM third_party_cooldown
    WHERE origin = $1 AND unique_key = $2
";

// One statement so concurrent failures on the same row serialize on the row
// lock. Both SET expressions read the pre-update row.
const REGISTER_FAILURE_SQL: &str = "
    INSERT INTO third_party_cooldown (
        origin, unique_key, last_requested,
        current_cooldown_duration_hours, earliest_next_request
    )
    VALUES ($1, $2, NOW(), $3, NOW() + make_interval(hours => $3))
    ON CONFLICT (origin, unique_key)
    DO UPDATE SET
        last_requested = NOW(),
        current_cooldown_duration_hours = CASE
            WHEN third_party_cooldown.earliest_next_request > NOW()
                THEN LEAST($4, GREATEST($3, third_party_cooldown.current_cooldown_duration_hours * 2))
            ELSE $3
        END,
        earliest_next_request = NOW() + make_interval(hours => CASE
            WHEN third_party_cooldown.earliest_next_request > NOW()
                THEN LEAST($4, GREATEST($3, third_party_cooldown.current_cooldown_duration_hours * 2))
            ELSE $3
        END)
    RETURNING current_cooldown_duration_hours
";

const CLEAR_SQL: &str = "
    DELETE FROM third_party_cooldown
    WHERE origin = $1 AND unique_key = $2
";

const RECORD_SQL: &str = "
    SELECT last_requested, current_cooldown_duration_hours, earliest_next_request
    FROM third_party_cooldown
    WHERE origin = $1 AND unique_key = $2
";

/// Cooldown store on the `third_party_cooldown` table.
#[derive(Clone)]
pub struct PostgresCooldownStore {
    pool: Pool,
}

impl PostgresCooldownStore {
    /// Creates a store on an existing pool.
    #[must_use]
    pub const fn new(pool: Pool) -> Self {
        Self { pool }
    }

    /// Creates the cooldown table if it does not exist.
    ///
    /// # Errors
    /// Returns error if a connection cannot be acquired or the DDL fails.
    pub async fn ensure_schema(&self) -> Result<(), CooldownError> {
        let conn = self.conn().await?;
        conn.batch_execute(CREATE_TABLE_SQL)
            .await
            .map_err(|e| CooldownError::Database(e.to_string()))?;
        Ok(())
    }

    async fn conn(&self) -> Result<Object, CooldownError> {
        self.pool.get().await.map_err(|e| {
            error!(error = %e, "Failed to acquire cooldown store connection");
            CooldownError::Pool(e.to_string())
        })
    }
}

impl std::fmt::Debug for PostgresCooldownStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PostgresCooldownStore")
            .field("pool", &self.pool.status())
            .finish()
    }
}

#[async_trait]
impl CooldownStorePort for PostgresCooldownStore {
    async fn on_cooldown(
        &self,
        provider: ProviderKind,
        key: &CompoundKey,
    ) -> Result<bool, CooldownError> {
        let conn = self.conn().await?;
        let row = conn
            .query_opt(ON_COOLDOWN_SQL, &[&provider.as_str(), &key.as_str()])
            .await
            .map_err(|e| {
                error!(provider = %provider, key = %key, error = %e, "Cooldown lookup failed");
                CooldownError::Database(e.to_string())
            })?;
        Ok(row.is_some_and(|row| row.get::<_, bool>(0)))
    }

    async fn register_failure(
        &self,
        provider: ProviderKind,
        key: &CompoundKey,
    ) -> Result<(), CooldownError> {
        let conn = self.conn().await?;
        let row = conn
            .query_one(
                REGISTER_FAILURE_SQL,
                &[
                    &provider.as_str(),
                    &key.as_str(),
                    &INITIAL_COOLDOWN_HOURS,
                    &MAX_COOLDOWN_HOURS,
                ],
            )
            .await
            .map_err(|e| {
                error!(provider = %provider, key = %key, error = %e, "Failed to register provider failure");
                CooldownError::Database(e.to_string())
            })?;
        let hours: i32 = row.get(0);
        debug!(provider = %provider, key = %key, hours, "Registered provider failure");
        Ok(())
    }

    async fn clear(
        &self,
        provider: ProviderKind,
        key: &CompoundKey,
    ) -> Result<(), CooldownError> {
        let conn = self.conn().await?;
        conn.execute(CLEAR_SQL, &[&provider.as_str(), &key.as_str()])
            .await
            .map_err(|e| {
                error!(provider = %provider, key = %key, error = %e, "Failed to clear provider cooldown");
                CooldownError::Database(e.to_string())
            })?;
        Ok(())
    }

    async fn record(
        &self,
        provider: ProviderKind,
        key: &CompoundKey,
    ) -> Result<Option<CooldownRecord>, CooldownError> {
        let conn = self.conn().await?;
        let row = conn
            .query_opt(RECORD_SQL, &[&provider.as_str(), &key.as_str()])
            .await
            .map_err(|e| CooldownError::Database(e.to_string()))?;
        Ok(row.map(|row| CooldownRecord {
            last_requested: row.get::<_, DateTime<Utc>>(0),
            current_cooldown_hours: row.get(1),
            earliest_next_request: row.get::<_, DateTime<Utc>>(2),
        }))
    }
}

#[cfg(test)]
mod tests {
    //! Run with `HYDRAGEN_TEST_DATABASE_URL=postgres://... cargo test -- --ignored`.

    use super::*;
    use crate::infrastructure::config::DatabaseConfig;
    use crate::infrastructure::database::create_pool;

    async fn test_store() -> PostgresCooldownStore {
        let url = std::env::var("HYDRAGEN_TEST_DATABASE_URL")
            .expect("HYDRAGEN_TEST_DATABASE_URL must be set");
        let config = DatabaseConfig {
            url: Some(url),
            ..DatabaseConfig::default()
        };
        let store = PostgresCooldownStore::new(create_pool(&config).unwrap());
        store.ensure_schema().await.unwrap();
        store
    }

    fn unique_key(tag: &str) -> CompoundKey {
        CompoundKey::new(format!("TEST{tag}-{}", std::process::id()))
    }

    #[tokio::test]
    #[ignore = "requires a running PostgreSQL instance"]
    async fn test_backoff_doubles_and_clears() {
        let store = test_store().await;
        let key = unique_key("DOUBLE");
        store.clear(ProviderKind::Chembl, &key).await.unwrap();

        for expected in [1, 2, 4] {
            store.register_failure(ProviderKind::Chembl, &key).await.unwrap();
            let record = store.record(ProviderKind::Chembl, &key).await.unwrap().unwrap();
            assert_eq!(record.current_cooldown_hours, expected);
            assert_eq!(
                record.earliest_next_request - record.last_requested,
                chrono::Duration::hours(i64::from(expected))
            );
        }
        assert!(store.on_cooldown(ProviderKind::Chembl, &key).await.unwrap());
        assert!(!store.on_cooldown(ProviderKind::Cactus, &key).await.unwrap());

        store.clear(ProviderKind::Chembl, &key).await.unwrap();
        assert!(store.record(ProviderKind::Chembl, &key).await.unwrap().is_none());
    }

    #[tokio::test]
    #[ignore = "requires a running PostgreSQL instance"]
    async fn test_backoff_is_capped() {
        let store = test_store().await;
        let key = unique_key("CAP");
        store.clear(ProviderKind::Cactus, &key).await.unwrap();

        for _ in 0..12 {
            store.register_failure(ProviderKind::Cactus, &key).await.unwrap();
        }
        let record = store.record(ProviderKind::Cactus, &key).await.unwrap().unwrap();
        assert_eq!(record.current_cooldown_hours, MAX_COOLDOWN_HOURS);

        store.clear(ProviderKind::Cactus, &key).await.unwrap();
    }

    #[tokio::test]
    #[ignore = "requires a running PostgreSQL instance"]
    async fn test_failure_after_expiry_restarts_at_one_hour() {
        let store = test_store().await;
        let key = unique_key("EXPIRED");
        store.clear(ProviderKind::Chembl, &key).await.unwrap();

        store.register_failure(ProviderKind::Chembl, &key).await.unwrap();
        store.register_failure(ProviderKind::Chembl, &key).await.unwrap();
        let conn = store.pool.get().await.unwrap();
        conn.execute(
            "UPDATE third_party_cooldown
             SET earliest_next_request = NOW() - interval '1 hour'
             WHERE origin = $1 AND unique_key = $2",
            &[&ProviderKind::Chembl.as_str(), &key.as_str()],
        )
        .await
        .unwrap();
        assert!(!store.on_cooldown(ProviderKind::Chembl, &key).await.unwrap());

        store.register_failure(ProviderKind::Chembl, &key).await.unwrap();
        let record = store.record(ProviderKind::Chembl, &key).await.unwrap().unwrap();
        assert_eq!(record.current_cooldown_hours, INITIAL_COOLDOWN_HOURS);

        store.clear(ProviderKind::Chembl, &key).await.unwrap();
    }

    #[tokio::test]
    #[ignore = "requires a running PostgreSQL instance"]
    async fn test_concurrent_failures_each_double() {
        const FAILURES: u32 = 5;

        let store = std::sync::Arc::new(test_store().await);
        let key = unique_key("RACE");
        store.clear(ProviderKind::Cactus, &key).await.unwrap();

        let handles: Vec<_> = (0..FAILURES)
            .map(|_| {
                let store = store.clone();
                let key = key.clone();
                tokio::spawn(async move {
                    store.register_failure(ProviderKind::Cactus, &key).await
                })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let record = store.record(ProviderKind::Cactus, &key).await.unwrap().unwrap();
        assert_eq!(
            record.current_cooldown_hours,
            (1 << (FAILURES - 1)).min(MAX_COOLDOWN_HOURS)
        );

        store.clear(ProviderKind::Cactus, &key).await.unwrap();
    }
}
