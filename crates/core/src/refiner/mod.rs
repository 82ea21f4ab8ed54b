//! Refiners (C7): pipeline steps that enrich a `Video`'s feature bag
//! in-place before scoring. A failing refiner is logged and skipped; see
//! `Refiner::refine`'s contract.

mod filesystem;
mod metadata;
mod online_db;
mod traits;

pub use filesystem::FilesystemRefiner;
pub use metadata::MetadataRefiner;
pub use online_db::{OmdbConfig, OmdbRefiner};
pub use traits::{Refiner, RefinerError, RefinerOptions};
