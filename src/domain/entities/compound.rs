//! Compound identity and metadata.

use serde::{Deserialize, Serialize};

use crate::domain::errors::KeyError;

/// Minimum key length needed to build the two-level shard path.
pub const MIN_ADDRESSABLE_KEY_LEN: usize = 4;

/// Unique structural identifier of a compound (an `InChIKey`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CompoundKey(String);

impl CompoundKey {
    /// Creates a key, trimming surrounding whitespace.
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        let key = key.into();
        let trimmed = key.trim();
        if trimmed.len() == key.len() {
            Self(key)
        } else {
            Self(trimmed.to_string())
        }
    }

    /// Returns the inner string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true if the key is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the two shard prefixes (`key[0..2]`, `key[2..4]`).
    ///
    /// # Errors
    /// Returns [`KeyError`] if the key is too short, cannot be split on those
    /// byte offsets, or contains characters that would escape the cache root.
    pub fn shard_prefixes(&self) -> Result<(&str, &str), KeyError> {
        let key = self.0.as_str();
        if key.len() < MIN_ADDRESSABLE_KEY_LEN {
            return Err(KeyError::TooShort {
                key: key.to_string(),
                len: key.len(),
                min: MIN_ADDRESSABLE_KEY_LEN,
            });
        }
        if key.contains(['/', '\\']) || key.contains("..") {
            return Err(KeyError::IllegalCharacters {
                key: key.to_string(),
            });
        }
        match (key.get(0..2), key.get(2..4)) {
            (Some(first), Some(second)) => Ok((first, second)),
            _ => Err(KeyError::NotAddressable {
                key: key.to_string(),
            }),
        }
    }
}

impl std::fmt::Display for CompoundKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CompoundKey {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for CompoundKey {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl AsRef<str> for CompoundKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Compound attributes owned by the metadata store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompoundMetadata {
    /// Structural key.
    pub inchi_key: CompoundKey,
    /// Common name.
    #[serde(default)]
    pub name: String,
    /// Full `InChI` string.
    #[serde(default)]
    pub inchi: String,
    /// SMILES notation.
    #[serde(default)]
    pub smiles: String,
    /// Molecular formula.
    #[serde(default)]
    pub formula: String,
    /// Lowest molecular weight among attached spectra.
    #[serde(default)]
    pub molecular_weight: Option<f64>,
    /// Whether at least one mass spectrum references this compound.
    #[serde(default)]
    pub has_mass_spectrum: bool,
}

impl CompoundMetadata {
    /// Creates metadata with only the key set.
    #[must_use]
    pub fn new(inchi_key: impl Into<CompoundKey>) -> Self {
        Self {
            inchi_key: inchi_key.into(),
            name: String::new(),
            inchi: String::new(),
            smiles: String::new(),
            formula: String::new(),
            molecular_weight: None,
            has_mass_spectrum: false,
        }
    }

    /// Sets the common name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the SMILES notation.
    #[must_use]
    pub fn with_smiles(mut self, smiles: impl Into<String>) -> Self {
        self.smiles = smiles.into();
        self
    }

    /// Sets the molecular formula.
    #[must_use]
    pub fn with_formula(mut self, formula: impl Into<String>) -> Self {
        self.formula = formula.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test]
    fn test_key_is_trimmed() {
        let key = CompoundKey::new("  ABCDEF-UHFFFAOYSA-N \n");
        assert_eq!(key.as_str(), "ABCDEF-UHFFFAOYSA-N");
    }

    #[test]
    fn test_shard_prefixes() {
        let key = CompoundKey::new("ABCDEF1234567890-UHFFFAOYSA-N");
        assert_eq!(key.shard_prefixes().unwrap(), ("AB", "CD"));
    }

    #[test_case("" ; "empty")]
    #[test_case("A" ; "one_char")]
    #[test_case("AB1" ; "three_chars")]
    fn test_short_keys_are_rejected(raw: &str) {
        let key = CompoundKey::new(raw);
        assert!(matches!(
            key.shard_prefixes(),
            Err(KeyError::TooShort { min: 4, .. })
        ));
    }

    #[test_case("AB/CDEF" ; "slash")]
    #[test_case("AB\\CDEF" ; "backslash")]
    #[test_case("ABCD..EF" ; "parent_dir")]
    fn test_path_characters_are_rejected(raw: &str) {
        let key = CompoundKey::new(raw);
        assert!(matches!(
            key.shard_prefixes(),
            Err(KeyError::IllegalCharacters { .. })
        ));
    }

    #[test]
    fn test_multibyte_split_is_not_addressable() {
        let key = CompoundKey::new("Aé-ABCD");
        assert!(matches!(
            key.shard_prefixes(),
            Err(KeyError::NotAddressable { .. })
        ));
    }

    #[test]
    fn test_metadata_serializes_camel_case() {
        let meta = CompoundMetadata::new("ABCD").with_name("benzene");
        let json = serde_json::to_value(&meta).unwrap();
        assert_eq!(json["inchiKey"], "ABCD");
        assert_eq!(json["name"], "benzene");
        assert_eq!(json["hasMassSpectrum"], false);
    }
}
