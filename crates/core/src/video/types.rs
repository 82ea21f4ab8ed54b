//! The `Video` sum type (C2): a common header shared by `Movie` and
//! `Episode`.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::language::Language;

/// Fields shared by every video, regardless of kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoHeader {
    pub name: String,
    pub source: Option<String>,
    pub release_group: Option<String>,
    pub resolution: Option<String>,
    pub video_codec: Option<String>,
    pub audio_codec: Option<String>,
    #[serde(default)]
    pub hashes: HashMap<String, String>,
    pub size: Option<u64>,
    #[serde(default)]
    pub subtitle_languages: HashSet<Language>,
    pub frame_rate: Option<f64>,
    pub duration: Option<f64>,
    pub imdb_id: Option<String>,
    pub tmdb_id: Option<i64>,
    pub tvdb_id: Option<i64>,
    /// Filesystem modification time, filled in by the filesystem refiner;
    /// drives the `age` pre-check in the pipeline.
    pub modified: Option<chrono::DateTime<chrono::Utc>>,
}

impl VideoHeader {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            source: None,
            release_group: None,
            resolution: None,
            video_codec: None,
            audio_codec: None,
            hashes: HashMap::new(),
            size: None,
            subtitle_languages: HashSet::new(),
            frame_rate: None,
            duration: None,
            imdb_id: None,
            tmdb_id: None,
            tvdb_id: None,
            modified: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Episode {
    pub header: VideoHeader,
    pub series: String,
    pub season: u32,
    pub episode: u32,
    pub title: Option<String>,
    pub year: Option<i32>,
    pub country: Option<String>,
    pub original_series: bool,
    #[serde(default)]
    pub alternative_series: Vec<String>,
    pub series_imdb_id: Option<String>,
    pub series_tmdb_id: Option<i64>,
    pub series_tvdb_id: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Movie {
    pub header: VideoHeader,
    pub title: String,
    pub year: Option<i32>,
    #[serde(default)]
    pub alternative_titles: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VideoKind {
    Movie,
    Episode,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum Video {
    Movie(Movie),
    Episode(Episode),
}

/// Identity is `name`; feature-bag fields are irrelevant to equality.
impl PartialEq for Video {
    fn eq(&self, other: &Self) -> bool {
        std::mem::discriminant(self) == std::mem::discriminant(other) && self.name() == other.name()
    }
}

impl Video {
    pub fn name(&self) -> &str {
        &self.header().name
    }

    pub fn kind(&self) -> VideoKind {
        match self {
            Video::Movie(_) => VideoKind::Movie,
            Video::Episode(_) => VideoKind::Episode,
        }
    }

    pub fn header(&self) -> &VideoHeader {
        match self {
            Video::Movie(m) => &m.header,
            Video::Episode(e) => &e.header,
        }
    }

    pub fn header_mut(&mut self) -> &mut VideoHeader {
        match self {
            Video::Movie(m) => &mut m.header,
            Video::Episode(e) => &mut e.header,
        }
    }

    /// Age relative to `now`, if the filesystem refiner has populated
    /// `modified`. `None` means "unknown", which the pipeline's age check
    /// treats as passing (never rejects on missing data).
    pub fn age(&self, now: chrono::DateTime<chrono::Utc>) -> Option<chrono::Duration> {
        self.header().modified.map(|modified| now - modified)
    }
}
