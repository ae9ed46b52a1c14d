//! Provider identities.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Identity tag of an external image provider.
///
/// The tag doubles as the cache directory name and the cooldown `origin`
/// column, so renaming a variant's tag orphans persisted state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// `ChEMBL` image API (curated, SVG).
    Chembl,
    /// NCI/CADD Chemical Identifier Resolver.
    Cactus,
}

impl ProviderKind {
    /// All known providers in default priority order.
    pub const ALL: [Self; 2] = [Self::Chembl, Self::Cactus];

    /// Returns the persisted tag.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Chembl => "chembl",
            Self::Cactus => "cactus",
        }
    }
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown provider tag.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown provider: {0}")]
pub struct UnknownProvider(pub String);

impl FromStr for ProviderKind {
    type Err = UnknownProvider;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "chembl" => Ok(Self::Chembl),
            "cactus" => Ok(Self::Cactus),
            other => Err(UnknownProvider(other.to_string())),
        }
    }
}
