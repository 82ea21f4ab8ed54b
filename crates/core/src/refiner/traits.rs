//! Refiner adapter interface (C7).

use async_trait::async_trait;
use thiserror::Error;

use crate::video::Video;

#[derive(Debug, Error)]
pub enum RefinerError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("refiner http request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("refiner not configured: {0}")]
    NotConfigured(String),

    #[error("refiner parse error: {0}")]
    Parse(String),
}

/// What a caller asks a refiner to do; refiners are free to ignore any
/// option they don't understand (e.g. an online-DB refiner ignores
/// `video_path`).
#[derive(Debug, Clone, Default)]
pub struct RefinerOptions {
    /// The file on disk, when the refiner needs to stat or read it.
    pub video_path: Option<std::path::PathBuf>,
    /// API key / token for online-DB refiners, if not baked into the
    /// refiner at construction time.
    pub api_key: Option<String>,
    /// Online-DB refiners normally skip a video that already carries their
    /// id; `force` tells them to look it up and overwrite it anyway.
    pub force: bool,
}

/// A pipeline step that enriches a `Video`'s feature bag in place.
///
/// Per the pipeline's contract, a failing refiner is logged and skipped:
/// this trait's errors are diagnostic, never fatal to the overall
/// `download_best_subtitles` call.
#[async_trait]
pub trait Refiner: Send + Sync {
    fn name(&self) -> &str;

    async fn refine(&self, video: &mut Video, opts: &RefinerOptions) -> Result<(), RefinerError>;
}
