//! Immutable, ordered provider registry.

use std::sync::Arc;

use thiserror::Error;

use crate::domain::entities::ProviderKind;
use crate::domain::ports::ImageProviderPort;

/// Invalid provider chain composition.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderChainError {
    /// No providers were given.
    #[error("provider chain is empty")]
    Empty,
    /// The same provider appears twice.
    #[error("provider {0} registered more than once")]
    Duplicate(ProviderKind),
}

/// Providers in priority order, fixed at composition time.
#[derive(Clone)]
pub struct ProviderChain {
    providers: Arc<[Arc<dyn ImageProviderPort>]>,
}

impl ProviderChain {
    /// Builds a chain; the first provider is tried first.
    ///
    /// # Errors
    /// Returns error if the list is empty or a provider kind repeats.
    pub fn new(providers: Vec<Arc<dyn ImageProviderPort>>) -> Result<Self, ProviderChainError> {
        if providers.is_empty() {
            return Err(ProviderChainError::Empty);
        }
        let mut seen = Vec::with_capacity(providers.len());
        for provider in &providers {
            let kind = provider.kind();
            if seen.contains(&kind) {
                return Err(ProviderChainError::Duplicate(kind));
            }
            seen.push(kind);
        }
        Ok(Self {
            providers: providers.into(),
        })
    }

    /// Returns the provider order.
    #[must_use]
    pub fn order(&self) -> Vec<ProviderKind> {
        self.providers.iter().map(|p| p.kind()).collect()
    }

    /// Iterates providers in priority order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn ImageProviderPort>> {
        self.providers.iter()
    }

    /// Returns the number of providers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.providers.len()
    }

    /// Always false for a constructed chain.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

impl std::fmt::Debug for ProviderChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderChain")
            .field("order", &self.order())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::mocks::MockImageProviderPort;

    fn provider(kind: ProviderKind) -> Arc<dyn ImageProviderPort> {
        let mut mock = MockImageProviderPort::new();
        mock.expect_kind().return_const(kind);
        Arc::new(mock)
    }

    #[test]
    fn test_order_is_preserved() {
        let chain = ProviderChain::new(vec![
            provider(ProviderKind::Cactus),
            provider(ProviderKind::Chembl),
        ])
        .unwrap();
        assert_eq!(chain.order(), vec![ProviderKind::Cactus, ProviderKind::Chembl]);
        assert_eq!(chain.len(), 2);
    }

    #[test]
    fn test_empty_chain_is_rejected() {
        assert_eq!(
            ProviderChain::new(Vec::new()).unwrap_err(),
            ProviderChainError::Empty
        );
    }

    #[test]
    fn test_duplicate_is_rejected() {
        let err = ProviderChain::new(vec![
            provider(ProviderKind::Chembl),
            provider(ProviderKind::Chembl),
        ])
        .unwrap_err();
        assert_eq!(err, ProviderChainError::Duplicate(ProviderKind::Chembl));
    }
}
