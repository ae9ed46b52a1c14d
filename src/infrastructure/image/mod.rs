//! Image persistence.

pub mod disk_cache;

pub use disk_cache::{DEFAULT_ASSET_ROOT, DiskImageCache};
