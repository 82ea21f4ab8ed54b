//! A minimal filename-guessing engine.
//!
//! There is no external "guessit"-equivalent collaborator available to a
//! Rust crate, so the core owns a small regex-lite-based guesser that
//! produces the same feature-dict shape §6 describes as the guess engine's
//! output. It is intentionally conservative: it extracts the handful of
//! tags release names reliably carry and leaves everything else `None`
//! for refiners to fill in later.

use regex_lite::Regex;
use serde::{Deserialize, Serialize};

use super::error::GuessingError;
use super::types::{Episode, Movie, Video, VideoHeader};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GuessDict {
    pub kind: Option<GuessKind>,
    pub title: Option<String>,
    pub year: Option<i32>,
    pub series: Option<String>,
    pub season: Option<u32>,
    pub episode: Option<u32>,
    pub episode_title: Option<String>,
    pub release_group: Option<String>,
    pub resolution: Option<String>,
    pub source: Option<String>,
    pub video_codec: Option<String>,
    pub audio_codec: Option<String>,
    pub streaming_service: Option<String>,
    pub edition: Option<String>,
    pub country: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GuessKind {
    Episode,
    Movie,
}

const RESOLUTIONS: &[(&[&str], &str)] = &[
    (&["2160p", "4k", "uhd"], "2160p"),
    (&["1080p", "1080i"], "1080p"),
    (&["720p"], "720p"),
    (&["576p"], "576p"),
    (&["480p"], "480p"),
];

const SOURCES: &[(&[&str], &str)] = &[
    (&["bluray", "blu-ray", "bdrip", "brrip", "bd"], "Blu-ray"),
    (&["web-dl", "webdl"], "WEB-DL"),
    (&["webrip", "web"], "Web"),
    (&["hdtv"], "HDTV"),
    (&["pdtv", "sdtv"], "TV"),
    (&["dvdrip", "dvd"], "DVD"),
    (&["hdcam", "cam", "ts", "telesync"], "Cam"),
];

const VIDEO_CODECS: &[(&[&str], &str)] = &[
    (&["x265", "h265", "h.265", "hevc"], "h265"),
    (&["x264", "h264", "h.264", "avc"], "h264"),
    (&["xvid"], "xvid"),
    (&["av1"], "av1"),
];

const AUDIO_CODECS: &[(&[&str], &str)] = &[
    (&["aac"], "aac"),
    (&["ac3", "dd5.1", "dd5", "dolby"], "ac3"),
    (&["dts", "dts-hd"], "dts"),
    (&["flac"], "flac"),
];

const STREAMING_SERVICES: &[(&[&str], &str)] = &[
    (&["nf", "netflix"], "Netflix"),
    (&["amzn", "amazon"], "Amazon"),
    (&["hulu"], "Hulu"),
    (&["dsnp", "disney"], "Disney+"),
    (&["atvp", "appletv"], "Apple TV+"),
];

const EDITIONS: &[(&[&str], &str)] = &[
    (&["extended"], "Extended"),
    (&["directors cut", "director's cut", "dc"], "Director's Cut"),
    (&["unrated"], "Unrated"),
    (&["remastered"], "Remastered"),
    (&["theatrical"], "Theatrical"),
];

fn find_alias(haystack: &str, groups: &[(&[&str], &str)]) -> Option<String> {
    let lower = haystack.to_ascii_lowercase();
    for (aliases, canonical) in groups {
        for alias in *aliases {
            if lower.contains(alias) {
                return Some(canonical.to_string());
            }
        }
    }
    None
}

/// Extract the feature dict the filename encodes.
pub fn guess_from_name(name: &str) -> GuessDict {
    let stem = strip_extension(name);
    let mut dict = GuessDict::default();

    dict.resolution = find_alias(&stem, RESOLUTIONS);
    dict.source = find_alias(&stem, SOURCES);
    dict.video_codec = find_alias(&stem, VIDEO_CODECS);
    dict.audio_codec = find_alias(&stem, AUDIO_CODECS);
    dict.streaming_service = find_alias(&stem, STREAMING_SERVICES);
    dict.edition = find_alias(&stem, EDITIONS);
    dict.release_group = extract_release_group(&stem);

    if let Some((season, episode, before, after)) = extract_episode_marker(&stem) {
        dict.kind = Some(GuessKind::Episode);
        dict.season = Some(season);
        dict.episode = Some(episode);
        dict.series = clean_title(&before);
        dict.episode_title = clean_title(&after);
        dict.year = extract_year(&before).or_else(|| extract_year(&stem));
        return dict;
    }

    if let Some((year, before)) = extract_year_with_prefix(&stem) {
        dict.kind = Some(GuessKind::Movie);
        dict.year = Some(year);
        dict.title = clean_title(&before);
        return dict;
    }

    // No strong anchor (season/episode or year): still report a title
    // guess so callers can decide, but leave `kind` unset.
    dict.title = clean_title(&stem);
    dict
}

fn strip_extension(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name);
    match base.rfind('.') {
        Some(idx) if idx > 0 => base[..idx].to_string(),
        _ => base.to_string(),
    }
}

fn extract_episode_marker(stem: &str) -> Option<(u32, u32, String, String)> {
    let se_re = Regex::new(r"(?i)s(\d{1,2})[\s\.]?e(\d{1,3})(?:e\d{1,3})*").unwrap();
    if let Some(caps) = se_re.captures(stem) {
        let whole = caps.get(0).unwrap();
        let season: u32 = caps.get(1).unwrap().as_str().parse().ok()?;
        let mut episodes = vec![caps.get(2).unwrap().as_str().parse::<u32>().ok()?];
        // lowest of any additional trailing ExxEyy markers
        let extra_re = Regex::new(r"(?i)e(\d{1,3})").unwrap();
        for m in extra_re.find_iter(&stem[whole.start()..whole.end()]) {
            if let Ok(n) = m.as_str()[1..].parse::<u32>() {
                episodes.push(n);
            }
        }
        let episode = *episodes.iter().min().unwrap();
        let before = stem[..whole.start()].to_string();
        let after = stem[whole.end()..].to_string();
        return Some((season, episode, before, after));
    }

    let x_re = Regex::new(r"(\d{1,2})x(\d{2,3})").unwrap();
    if let Some(caps) = x_re.captures(stem) {
        let whole = caps.get(0).unwrap();
        let season: u32 = caps.get(1).unwrap().as_str().parse().ok()?;
        let episode: u32 = caps.get(2).unwrap().as_str().parse().ok()?;
        let before = stem[..whole.start()].to_string();
        let after = stem[whole.end()..].to_string();
        return Some((season, episode, before, after));
    }

    None
}

fn extract_year(text: &str) -> Option<i32> {
    let re = Regex::new(r"(?:19|20)\d{2}").unwrap();
    for m in re.find_iter(text) {
        // Exclude resolution-like "2160p" by checking the following byte.
        let after = text[m.end()..].chars().next();
        if matches!(after, Some('p') | Some('i')) {
            continue;
        }
        if let Ok(year) = m.as_str().parse() {
            return Some(year);
        }
    }
    None
}

fn extract_year_with_prefix(stem: &str) -> Option<(i32, String)> {
    let re = Regex::new(r"(?:19|20)\d{2}").unwrap();
    for m in re.find_iter(stem) {
        let after = stem[m.end()..].chars().next();
        if matches!(after, Some('p') | Some('i')) {
            continue;
        }
        if let Ok(year) = m.as_str().parse() {
            return Some((year, stem[..m.start()].to_string()));
        }
    }
    None
}

fn extract_release_group(stem: &str) -> Option<String> {
    let re = Regex::new(r"-([A-Za-z0-9]+)$").unwrap();
    re.captures(stem)
        .map(|c| c.get(1).unwrap().as_str().to_string())
}

fn clean_title(raw: &str) -> Option<String> {
    let cleaned = raw
        .chars()
        .map(|c| if c == '.' || c == '_' { ' ' } else { c })
        .collect::<String>();
    let cleaned = cleaned.trim().trim_matches('-').trim();
    if cleaned.is_empty() {
        None
    } else {
        Some(cleaned.to_string())
    }
}

/// Parse a filename into a [`Video`] per §4.2's construction rules.
pub fn video_from_name(name: &str) -> Result<Video, GuessingError> {
    let guess = guess_from_name(name);
    video_from_guess(name, &guess)
}

fn video_from_guess(name: &str, guess: &GuessDict) -> Result<Video, GuessingError> {
    match guess.kind {
        Some(GuessKind::Episode) => {
            let series = guess
                .series
                .clone()
                .ok_or_else(|| GuessingError::IncompleteEpisode(name.to_string()))?;
            let season = guess
                .season
                .ok_or_else(|| GuessingError::IncompleteEpisode(name.to_string()))?;
            if guess.episode.is_none() && guess.episode_title.is_none() {
                return Err(GuessingError::IncompleteEpisode(name.to_string()));
            }
            let mut header = VideoHeader::new(name);
            header.source = guess.source.clone();
            header.release_group = guess.release_group.clone();
            header.resolution = guess.resolution.clone();
            header.video_codec = guess.video_codec.clone();
            header.audio_codec = guess.audio_codec.clone();
            Ok(Video::Episode(Episode {
                header,
                series,
                season,
                episode: guess.episode.unwrap_or(0),
                title: guess.episode_title.clone(),
                year: guess.year,
                country: guess.country.clone(),
                original_series: guess.year.is_none(),
                alternative_series: Vec::new(),
                series_imdb_id: None,
                series_tmdb_id: None,
                series_tvdb_id: None,
            }))
        }
        Some(GuessKind::Movie) => {
            let title = guess
                .title
                .clone()
                .ok_or_else(|| GuessingError::IncompleteMovie(name.to_string()))?;
            let mut header = VideoHeader::new(name);
            header.source = guess.source.clone();
            header.release_group = guess.release_group.clone();
            header.resolution = guess.resolution.clone();
            header.video_codec = guess.video_codec.clone();
            header.audio_codec = guess.audio_codec.clone();
            Ok(Video::Movie(Movie {
                header,
                title,
                year: guess.year,
                alternative_titles: Vec::new(),
            }))
        }
        None => Err(GuessingError::Unrecognized(name.to_string())),
    }
}
