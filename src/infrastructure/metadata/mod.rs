//! Compound metadata adapters.

pub mod memory;
pub mod postgres;

pub use memory::InMemoryCompoundMetadataStore;
pub use postgres::PostgresCompoundMetadataStore;
