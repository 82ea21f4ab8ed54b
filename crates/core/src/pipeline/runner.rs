//! Top-level orchestration (C9): pre-check, refine, list, select-and-
//! download, persist. Grounded on `subliminal/api.py`'s free functions,
//! re-expressed as methods on a struct that owns its collaborators instead
//! of module-level globals plus a context manager.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::language::Language;
use crate::pool::ProviderPool;
use crate::refiner::{Refiner, RefinerOptions};
use crate::subtitle::{get_subtitle_path, Subtitle};
use crate::video::Video;

use super::types::{languages_satisfied, PipelineError, PipelineOptions, SaveOptions};

/// Owns one provider pool and the refiner chain for its lifetime. Not
/// `Clone`; construct one per `download_best_subtitles` call (or share it
/// behind an `Arc` across calls that can tolerate sequential access).
pub struct Pipeline {
    pool: ProviderPool,
    refiners: Vec<Box<dyn Refiner>>,
}

impl Pipeline {
    pub fn new(pool: ProviderPool, refiners: Vec<Box<dyn Refiner>>) -> Self {
        Self { pool, refiners }
    }

    pub async fn initialize(&self) {
        self.pool.initialize_all().await;
    }

    pub async fn terminate(&self) {
        self.pool.terminate_all().await;
    }

    /// Step 1: should this video even be considered? Per `api.check_video`:
    /// reject if every wanted language is already present, if the video is
    /// older than `max_age`, or if `reject_undefined` is set and the video
    /// already carries the undefined language. `force` bypasses only the
    /// first of these.
    pub fn check_video(
        video: &Video,
        languages: &HashSet<Language>,
        options: &PipelineOptions,
        now: DateTime<Utc>,
    ) -> bool {
        let present = &video.header().subtitle_languages;

        if !options.force && languages_satisfied(present, languages) {
            debug!(video = video.name(), "skipping: requested languages already present");
            return false;
        }

        if let Some(max_age) = options.max_age {
            if let Some(age) = video.age(now) {
                if age > max_age {
                    debug!(video = video.name(), "skipping: video older than max_age");
                    return false;
                }
            }
        }

        if options.reject_undefined && present.contains(&Language::undefined()) {
            debug!(video = video.name(), "skipping: undefined language already present");
            return false;
        }

        true
    }

    /// Step 2: run every refiner over `video` in sequence. A refiner that
    /// fails is logged and skipped; it never aborts the chain.
    pub async fn refine(&self, video: &mut Video, opts: &RefinerOptions) {
        for refiner in &self.refiners {
            if let Err(err) = refiner.refine(video, opts).await {
                warn!(refiner = refiner.name(), error = %err, "refiner failed, skipping");
            }
        }
    }

    /// Step 3: list candidates via the pool.
    pub async fn list_subtitles(&self, video: &Video, languages: &HashSet<Language>) -> Vec<Subtitle> {
        self.pool.list_subtitles(video, languages).await
    }

    /// Steps 1-4 for one video: check, refine, list, select-and-download.
    /// Returns an empty vec for a video that `check_video` rejects.
    pub async fn download_best_subtitles_for(
        &self,
        video: &mut Video,
        languages: &HashSet<Language>,
        options: &PipelineOptions,
        refiner_opts: &RefinerOptions,
        now: DateTime<Utc>,
    ) -> Vec<Subtitle> {
        if !Self::check_video(video, languages, options, now) {
            return Vec::new();
        }

        let refiner_opts = RefinerOptions {
            force: options.force,
            ..refiner_opts.clone()
        };
        self.refine(video, &refiner_opts).await;

        let candidates = self.list_subtitles(video, languages).await;
        let downloaded = self
            .pool
            .download_best_subtitles(
                candidates,
                video,
                languages,
                options.min_score,
                options.hearing_impaired,
                options.foreign_only,
                options.only_one,
                &options.ignore_subtitles,
            )
            .await;

        info!(video = video.name(), count = downloaded.len(), "downloaded subtitles");
        downloaded
    }

    /// The full multi-video orchestration: steps 1-4 for each video in
    /// turn (refinement is inherently sequential per video; the pool
    /// itself bounds per-video provider fan-out).
    pub async fn download_best_subtitles(
        &self,
        videos: &mut [Video],
        languages: &HashSet<Language>,
        options: &PipelineOptions,
        refiner_opts: &RefinerOptions,
        now: DateTime<Utc>,
    ) -> Vec<(Video, Vec<Subtitle>)> {
        let mut results = Vec::with_capacity(videos.len());
        for video in videos.iter_mut() {
            let downloaded = self
                .download_best_subtitles_for(video, languages, options, refiner_opts, now)
                .await;
            results.push((video.clone(), downloaded));
        }
        results
    }

    /// Step 5: persist `subtitles` to disk, one file per language (per
    /// `api.save_subtitles`): first occurrence of each language wins, the
    /// path comes from `get_subtitle_path`, and `single` stops after the
    /// first file written. Returns the subtitles actually written.
    pub async fn save_subtitles(
        video: &Video,
        subtitles: &[Subtitle],
        save_options: &SaveOptions,
    ) -> Result<Vec<Subtitle>, PipelineError> {
        let mut written = Vec::new();
        let mut seen_languages = HashSet::new();

        for subtitle in subtitles {
            if !seen_languages.insert(subtitle.language.clone()) {
                continue;
            }

            let Some(content) = &subtitle.content else {
                warn!(subtitle = subtitle.subtitle_id, "skipping save: no content");
                continue;
            };

            if let Some(encoding) = &save_options.encoding {
                if !encoding.eq_ignore_ascii_case("utf-8") {
                    warn!(encoding, "unsupported target encoding, writing raw bytes");
                }
            }

            let language = if save_options.single { None } else { Some(&subtitle.language) };
            let mut path = get_subtitle_path(video.name(), language);
            if let Some(dir) = &save_options.directory {
                path = join_under(dir, &path);
            }

            tokio::fs::write(&path, content).await?;
            written.push(subtitle.clone());

            if save_options.single {
                break;
            }
        }

        Ok(written)
    }
}

fn join_under(directory: &Path, relative: &Path) -> PathBuf {
    let file_name = relative.file_name().unwrap_or(relative.as_os_str());
    directory.join(file_name)
}
