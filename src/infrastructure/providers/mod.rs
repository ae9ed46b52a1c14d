//! External image provider adapters.

pub mod cactus;
pub mod chembl;
pub mod client;

pub use cactus::{CACTUS_STRUCTURE_BASE, CactusProvider};
pub use chembl::{CHEMBL_IMAGE_BASE, ChemblProvider};
pub use client::{ClientBuildError, DEFAULT_REQUEST_TIMEOUT, build_client};
