//! Domain entities.

mod compound;
mod cooldown;
mod image;
mod provider;

pub use compound::{CompoundKey, CompoundMetadata, MIN_ADDRESSABLE_KEY_LEN};
pub use cooldown::{CooldownRecord, INITIAL_COOLDOWN_HOURS, MAX_COOLDOWN_HOURS};
pub use image::{Image, ImageSource, ResolvedImage};
pub use provider::{ProviderKind, UnknownProvider};
