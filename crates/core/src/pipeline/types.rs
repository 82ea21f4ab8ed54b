//! Pipeline configuration and error types (C9).

use std::collections::HashSet;

use thiserror::Error;

use crate::language::Language;
use crate::pool::PoolError;
use crate::video::GuessingError;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Pool(#[from] PoolError),

    #[error(transparent)]
    Guessing(#[from] GuessingError),

    #[error("failed to persist subtitle: {0}")]
    Save(#[from] std::io::Error),
}

/// Everything `download_best_subtitles` needs beyond the video list and
/// language set, mirroring the option table in §6.
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    pub min_score: u8,
    pub hearing_impaired: Option<bool>,
    pub foreign_only: Option<bool>,
    pub only_one: bool,
    /// Reject a video outright if it is older than this, per `check_video`.
    pub max_age: Option<chrono::Duration>,
    /// Reject a video whose `subtitle_languages` already contains the
    /// undefined language, per `check_video`.
    pub reject_undefined: bool,
    /// Bypass `check_video`'s "languages already present" short-circuit.
    pub force: bool,
    pub ignore_subtitles: HashSet<String>,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            min_score: 0,
            hearing_impaired: None,
            foreign_only: None,
            only_one: false,
            max_age: None,
            reject_undefined: false,
            force: false,
            ignore_subtitles: HashSet::new(),
        }
    }
}

/// Where and how `save_subtitles` writes a video's downloaded subtitles.
#[derive(Debug, Clone, Default)]
pub struct SaveOptions {
    pub single: bool,
    pub directory: Option<std::path::PathBuf>,
    /// Re-encode content to this charset before writing; `None` writes the
    /// raw (already line-ending-normalised) bytes as-is.
    pub encoding: Option<String>,
}

pub(crate) fn languages_satisfied(present: &HashSet<Language>, wanted: &HashSet<Language>) -> bool {
    wanted.iter().all(|l| present.contains(l))
}
