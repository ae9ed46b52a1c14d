//! Cooldown store adapters.

pub mod memory;
pub mod postgres;

pub use memory::{Clock, InMemoryCooldownStore};
pub use postgres::PostgresCooldownStore;
