//! Application services.

pub mod image_resolver;
pub mod provider_chain;

pub use image_resolver::{DEFAULT_RESOLVE_TIMEOUT, ImageResolver};
pub use provider_chain::{ProviderChain, ProviderChainError};
