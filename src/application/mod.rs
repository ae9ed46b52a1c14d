//! Application layer orchestrating the domain ports.

/// Resolution services.
pub mod services;

pub use services::{DEFAULT_RESOLVE_TIMEOUT, ImageResolver, ProviderChain, ProviderChainError};
