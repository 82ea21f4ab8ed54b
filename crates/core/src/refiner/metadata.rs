//! Metadata refiner: a tolerant, best-effort container-metadata reader.
//!
//! This is a reduced stand-in for a real MKV/MP4 demuxer. Full container
//! parsing is exactly the kind of individual-wire-format complexity kept
//! out of core; this refiner only derives what's trivially available from
//! the file extension and leaves codec/resolution/duration alone unless
//! the filename guess already populated them.

use std::path::Path;

use async_trait::async_trait;

use crate::video::Video;

use super::traits::{Refiner, RefinerError, RefinerOptions};

pub struct MetadataRefiner;

impl MetadataRefiner {
    pub fn new() -> Self {
        Self
    }

    fn container_from_extension(path: &Path) -> Option<&'static str> {
        match path.extension()?.to_str()?.to_ascii_lowercase().as_str() {
            "mkv" => Some("matroska"),
            "mp4" | "m4v" => Some("mp4"),
            "avi" => Some("avi"),
            "webm" => Some("webm"),
            _ => None,
        }
    }
}

impl Default for MetadataRefiner {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Refiner for MetadataRefiner {
    fn name(&self) -> &str {
        "metadata"
    }

    async fn refine(&self, video: &mut Video, opts: &RefinerOptions) -> Result<(), RefinerError> {
        let path = opts
            .video_path
            .as_ref()
            .ok_or_else(|| RefinerError::NotConfigured("no video_path given".to_string()))?;

        // Best-effort only: an unrecognised extension is not an error, it
        // just means this refiner has nothing to contribute.
        let Some(container) = Self::container_from_extension(path) else {
            return Ok(());
        };

        let header = video.header_mut();
        header.hashes.entry("container".to_string()).or_insert_with(|| container.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::video::{Movie, VideoHeader};
    use std::path::PathBuf;

    fn movie(name: &str) -> Video {
        Video::Movie(Movie {
            header: VideoHeader::new(name),
            title: "Test".to_string(),
            year: None,
            alternative_titles: vec![],
        })
    }

    #[tokio::test]
    async fn recognised_extension_sets_container() {
        let refiner = MetadataRefiner::new();
        let mut video = movie("movie.mkv");
        let opts = RefinerOptions {
            video_path: Some(PathBuf::from("movie.mkv")),
            api_key: None,
        };
        refiner.refine(&mut video, &opts).await.unwrap();
        assert_eq!(video.header().hashes.get("container").map(String::as_str), Some("matroska"));
    }

    #[tokio::test]
    async fn unrecognised_extension_is_not_an_error() {
        let refiner = MetadataRefiner::new();
        let mut video = movie("movie.xyz");
        let opts = RefinerOptions {
            video_path: Some(PathBuf::from("movie.xyz")),
            api_key: None,
        };
        assert!(refiner.refine(&mut video, &opts).await.is_ok());
        assert!(!video.header().hashes.contains_key("container"));
    }
}
