//! PostgreSQL-backed compound metadata lookup.

use async_trait::async_trait;
use deadpool_postgres::Pool;
use tracing::error;

use crate::domain::entities::{CompoundKey, CompoundMetadata};
use crate::domain::errors::MetadataError;
use crate::domain::ports::CompoundMetadataPort;

const DETAIL_SQL: &str = "
    SELECT
        c.inchikey,
        c.name,
        c.inchi,
        c.smiles,
        c.formula,
        MIN(ms.molecular_weight)::FLOAT8 AS molecular_weight,
        COUNT(ms.id) > 0 AS has_mass_spectrum
    FROM compounds c
    LEFT JOIN mass_spectra ms ON ms.inchikey = c.inchikey
    WHERE c.inchikey = $1
    GROUP BY c.inchikey, c.name, c.inchi, c.smiles, c.formula
";

/// Metadata lookup on the `compounds` table.
#[derive(Clone)]
pub struct PostgresCompoundMetadataStore {
    pool: Pool,
}

impl PostgresCompoundMetadataStore {
    /// Creates a store on an existing pool.
    #[must_use]
    pub const fn new(pool: Pool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CompoundMetadataPort for PostgresCompoundMetadataStore {
    async fn get(&self, key: &CompoundKey) -> Result<CompoundMetadata, MetadataError> {
        let conn = self
            .pool
            .get()
            .await
            .map_err(|e| MetadataError::Pool(e.to_string()))?;

        let row = conn
            .query_opt(DETAIL_SQL, &[&key.as_str()])
            .await
            .map_err(|e| {
                error!(key = %key, error = %e, "Compound metadata query failed");
                MetadataError::Database(e.to_string())
            })?
            .ok_or_else(|| MetadataError::NotFound(key.to_string()))?;

        let text = |idx: usize| row.get::<_, Option<String>>(idx).unwrap_or_default();
        Ok(CompoundMetadata {
            inchi_key: CompoundKey::new(text(0)),
            name: text(1),
            inchi: text(2),
            smiles: text(3),
            formula: text(4),
            molecular_weight: row.get(5),
            has_mass_spectrum: row.get(6),
        })
    }
}
