//! In-memory compound metadata store.

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::RwLock;

use crate::domain::entities::{CompoundKey, CompoundMetadata};
use crate::domain::errors::MetadataError;
use crate::domain::ports::CompoundMetadataPort;

/// Metadata held in a map. Used without a database and in tests.
#[derive(Debug, Default)]
pub struct InMemoryCompoundMetadataStore {
    compounds: RwLock<HashMap<CompoundKey, CompoundMetadata>>,
}

impl InMemoryCompoundMetadataStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store seeded with the built-in compounds served when no
    /// database is configured.
    #[must_use]
    pub fn with_fallback_compounds() -> Self {
        fallback_compounds().into_iter().collect()
    }

    /// Inserts or replaces a compound.
    pub fn insert(&self, compound: CompoundMetadata) {
        self.compounds
            .write()
            .insert(compound.inchi_key.clone(), compound);
    }

    /// Returns the number of compounds.
    #[must_use]
    pub fn len(&self) -> usize {
        self.compounds.read().len()
    }

    /// Returns true if the store is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn fallback_compounds() -> Vec<CompoundMetadata> {
    vec![
        CompoundMetadata {
            inchi: "InChI=1S/CH4O/c1-2/h2H,1H3".to_string(),
            molecular_weight: Some(32.0419),
            has_mass_spectrum: true,
            ..CompoundMetadata::new("XLYOFNOQVPJJNP-UHFFFAOYSA-N")
                .with_name("Methanol")
                .with_smiles("CO")
                .with_formula("CH4O")
        },
        CompoundMetadata {
            inchi: "InChI=1S/CH4/h1H4".to_string(),
            molecular_weight: Some(16.0425),
            has_mass_spectrum: true,
            ..CompoundMetadata::new("VNWKTOKETHGBQD-UHFFFAOYSA-N")
                .with_name("Methane")
                .with_smiles("C")
                .with_formula("CH4")
        },
    ]
}

impl FromIterator<CompoundMetadata> for InMemoryCompoundMetadataStore {
    fn from_iter<I: IntoIterator<Item = CompoundMetadata>>(iter: I) -> Self {
        let compounds = iter
            .into_iter()
            .map(|c| (c.inchi_key.clone(), c))
            .collect();
        Self {
            compounds: RwLock::new(compounds),
        }
    }
}

#[async_trait]
impl CompoundMetadataPort for InMemoryCompoundMetadataStore {
    async fn get(&self, key: &CompoundKey) -> Result<CompoundMetadata, MetadataError> {
        self.compounds
            .read()
            .get(key)
            .cloned()
            .ok_or_else(|| MetadataError::NotFound(key.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_get_known_and_unknown() {
        let store: InMemoryCompoundMetadataStore =
            [CompoundMetadata::new("ABCD-EFGH").with_name("water")]
                .into_iter()
                .collect();

        let found = store.get(&CompoundKey::new("ABCD-EFGH")).await.unwrap();
        assert_eq!(found.name, "water");

        let missing = store.get(&CompoundKey::new("ZZZZ")).await.unwrap_err();
        assert!(missing.is_not_found());
    }

    #[tokio::test]
    async fn test_fallback_compounds() {
        let store = InMemoryCompoundMetadataStore::with_fallback_compounds();

        let methanol = store
            .get(&CompoundKey::new("XLYOFNOQVPJJNP-UHFFFAOYSA-N"))
            .await
            .unwrap();
        let methane = store
            .get(&CompoundKey::new("VNWKTOKETHGBQD-UHFFFAOYSA-N"))
            .await
            .unwrap();

        assert_eq!(store.len(), 2);
        assert_eq!(methanol.name, "Methanol");
        assert_eq!(methanol.smiles, "CO");
        assert_eq!(methanol.molecular_weight, Some(32.0419));
        assert!(methanol.has_mass_spectrum);
        assert_eq!(methane.formula, "CH4");
    }

    #[test]
    fn test_insert_replaces_by_key() {
        let store = InMemoryCompoundMetadataStore::new();
        store.insert(CompoundMetadata::new("ABCD").with_name("old"));
        store.insert(CompoundMetadata::new(" ABCD ").with_name("new"));

        let found = tokio_test::block_on(store.get(&CompoundKey::new("ABCD")));

        assert_eq!(store.len(), 1);
        assert_eq!(tokio_test::assert_ok!(found).name, "new");
    }
}
