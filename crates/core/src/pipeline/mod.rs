//! Top-level orchestration (C9): wires the provider pool and refiner chain
//! into the 5-step `download_best_subtitles` flow.

mod runner;
mod types;

pub use runner::Pipeline;
pub use types::{PipelineError, PipelineOptions, SaveOptions};
