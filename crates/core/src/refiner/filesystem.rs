//! Filesystem refiner: stat age/size and the two content-hash algorithms
//! (§6), grounded on `original_source`'s `subliminal/refiners/hash.py` and
//! on `hash::opensubtitles`/`hash::napiprojekt`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::hash;
use crate::video::Video;

use super::traits::{Refiner, RefinerError, RefinerOptions};

pub struct FilesystemRefiner;

impl FilesystemRefiner {
    pub fn new() -> Self {
        Self
    }
}

impl Default for FilesystemRefiner {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Refiner for FilesystemRefiner {
    fn name(&self) -> &str {
        "filesystem"
    }

    async fn refine(&self, video: &mut Video, opts: &RefinerOptions) -> Result<(), RefinerError> {
        let path = opts
            .video_path
            .as_ref()
            .ok_or_else(|| RefinerError::NotConfigured("no video_path given".to_string()))?;

        let metadata = tokio::fs::metadata(path).await?;
        let header = video.header_mut();
        header.size = Some(metadata.len());
        if let Ok(modified) = metadata.modified() {
            header.modified = Some(DateTime::<Utc>::from(modified));
        }

        if let Some(opensubtitles_hash) = hash::opensubtitles(path)? {
            header.hashes.insert("opensubtitles".to_string(), opensubtitles_hash);
        }
        let napiprojekt_hash = hash::napiprojekt(path)?;
        header.hashes.insert("napiprojekt".to_string(), napiprojekt_hash);

        Ok(())
    }
}

impl From<hash::HashError> for RefinerError {
    fn from(err: hash::HashError) -> Self {
        match err {
            hash::HashError::Io { source, .. } => RefinerError::Io(source),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::video::{Movie, VideoHeader};
    use std::io::Write;

    fn movie() -> Video {
        Video::Movie(Movie {
            header: VideoHeader::new("test.mkv"),
            title: "Test".to_string(),
            year: None,
            alternative_titles: vec![],
        })
    }

    #[tokio::test]
    async fn populates_size_and_hashes() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(&vec![0u8; 200_000]).unwrap();

        let refiner = FilesystemRefiner::new();
        let mut video = movie();
        let opts = RefinerOptions {
            video_path: Some(file.path().to_path_buf()),
            api_key: None,
        };

        refiner.refine(&mut video, &opts).await.unwrap();

        let header = video.header();
        assert_eq!(header.size, Some(200_000));
        assert!(header.hashes.contains_key("opensubtitles"));
        assert!(header.hashes.contains_key("napiprojekt"));
        assert!(header.modified.is_some());
    }

    #[tokio::test]
    async fn missing_path_is_not_configured() {
        let refiner = FilesystemRefiner::new();
        let mut video = movie();
        let err = refiner.refine(&mut video, &RefinerOptions::default()).await;
        assert!(matches!(err, Err(RefinerError::NotConfigured(_))));
    }
}
