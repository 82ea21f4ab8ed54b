//! Matcher (C4): a pure function from `(video, guess-dict)` to a set of
//! matched attribute names.

use std::collections::HashSet;

use crate::video::{GuessDict, Video};

/// Release-group equivalence groups. Within a group, any two names are
/// considered the same release for matching purposes. Resolved from
/// community knowledge of common group renames/forks; subliminal's
/// retrieved snapshot does not ship a canonical table of its own.
const RELEASE_GROUP_EQUIVALENCE: &[&[&str]] = &[
    &["lol", "dimension"],
    &["asap", "fleet"],
    &["killers", "rovers"],
];

/// Case-fold, strip punctuation, collapse whitespace.
pub fn normalize(s: &str) -> String {
    let folded: String = s
        .chars()
        .map(|c| {
            if c.is_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                ' '
            }
        })
        .collect();
    folded.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn release_groups_equivalent(a: &str, b: &str) -> bool {
    let (a, b) = (normalize(a), normalize(b));
    if a == b {
        return true;
    }
    RELEASE_GROUP_EQUIVALENCE
        .iter()
        .any(|group| group.contains(&a.as_str()) && group.contains(&b.as_str()))
}

fn matches_str(video: Option<&str>, guess: Option<&str>, partial: bool, equivalent: impl Fn(&str, &str) -> bool) -> bool {
    let Some(guess) = guess else { return false };
    match video {
        Some(video) => equivalent(video, guess),
        None => partial,
    }
}

fn matches_eq_str(video: Option<&str>, guess: Option<&str>, partial: bool) -> bool {
    matches_str(video, guess, partial, |a, b| normalize(a) == normalize(b))
}

fn matches_num<T: PartialEq>(video: Option<T>, guess: Option<T>, partial: bool) -> bool {
    let Some(guess) = guess else { return false };
    match video {
        Some(video) => video == guess,
        None => partial,
    }
}

/// Compare `video`'s feature bag against a `guess` and return the set of
/// attribute names that match.
pub fn guess_matches(video: &Video, guess: &GuessDict, partial: bool) -> HashSet<String> {
    let mut matched = HashSet::new();
    let header = video.header();

    if matches_eq_str(header.source.as_deref(), guess.source.as_deref(), partial) {
        matched.insert("source".to_string());
    }
    if matches_eq_str(header.resolution.as_deref(), guess.resolution.as_deref(), partial) {
        matched.insert("resolution".to_string());
    }
    if matches_eq_str(header.video_codec.as_deref(), guess.video_codec.as_deref(), partial) {
        matched.insert("video_codec".to_string());
    }
    if matches_eq_str(header.audio_codec.as_deref(), guess.audio_codec.as_deref(), partial) {
        matched.insert("audio_codec".to_string());
    }
    if matches_str(
        header.release_group.as_deref(),
        guess.release_group.as_deref(),
        partial,
        release_groups_equivalent,
    ) {
        matched.insert("release_group".to_string());
    }

    match video {
        Video::Movie(movie) => {
            if matches_eq_str(Some(movie.title.as_str()), guess.title.as_deref(), partial) {
                matched.insert("title".to_string());
            }
            if matches_num(movie.year, guess.year, partial) {
                matched.insert("year".to_string());
            }
        }
        Video::Episode(episode) => {
            if matches_eq_str(Some(episode.series.as_str()), guess.series.as_deref(), partial) {
                matched.insert("series".to_string());
            }
            if matches_num(Some(episode.season), guess.season, partial) {
                matched.insert("season".to_string());
            }
            if matches_num(Some(episode.episode), guess.episode, partial) {
                matched.insert("episode".to_string());
            }
            let episode_title_matches = matches_eq_str(
                episode.title.as_deref(),
                guess.episode_title.as_deref(),
                partial,
            );
            if episode_title_matches {
                matched.insert("title".to_string());
            }
            if matches_num(episode.year, guess.year, partial) {
                matched.insert("year".to_string());
            }
            if matches_eq_str(episode.country.as_deref(), guess.country.as_deref(), partial) {
                matched.insert("country".to_string());
            }
        }
    }

    matched
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::video::{Episode, Movie, VideoHeader};

    fn movie() -> Video {
        Video::Movie(Movie {
            header: VideoHeader {
                release_group: Some("DIMENSION".to_string()),
                resolution: Some("720p".to_string()),
                ..VideoHeader::new("Man of Steel 2013.mkv")
            },
            title: "Man of Steel".to_string(),
            year: Some(2013),
            alternative_titles: vec![],
        })
    }

    fn episode() -> Video {
        Video::Episode(Episode {
            header: VideoHeader::new("tbbt.mkv"),
            series: "The Big Bang Theory".to_string(),
            season: 7,
            episode: 5,
            title: Some("The Workplace Proximity".to_string()),
            year: None,
            country: None,
            original_series: true,
            alternative_series: vec![],
            series_imdb_id: None,
            series_tmdb_id: None,
            series_tvdb_id: None,
        })
    }

    #[test]
    fn empty_guess_matches_nothing() {
        let guess = GuessDict::default();
        assert!(guess_matches(&movie(), &guess, false).is_empty());
        assert!(guess_matches(&episode(), &guess, false).is_empty());
    }

    #[test]
    fn movie_title_and_year_match() {
        let guess = GuessDict {
            title: Some("Man of Steel".to_string()),
            year: Some(2013),
            ..GuessDict::default()
        };
        let matches = guess_matches(&movie(), &guess, false);
        assert!(matches.contains("title"));
        assert!(matches.contains("year"));
    }

    #[test]
    fn release_group_equivalence_table_applies() {
        let guess = GuessDict {
            release_group: Some("LOL".to_string()),
            ..GuessDict::default()
        };
        let matches = guess_matches(&movie(), &guess, false);
        assert!(matches.contains("release_group"));
    }

    #[test]
    fn mismatched_release_group_does_not_match() {
        let guess = GuessDict {
            release_group: Some("SPARKS".to_string()),
            ..GuessDict::default()
        };
        let matches = guess_matches(&movie(), &guess, false);
        assert!(!matches.contains("release_group"));
    }

    #[test]
    fn partial_true_lets_missing_video_field_match() {
        // video has no audio_codec; guess asserts one.
        let guess = GuessDict {
            audio_codec: Some("aac".to_string()),
            ..GuessDict::default()
        };
        let matches = guess_matches(&movie(), &guess, true);
        assert!(matches.contains("audio_codec"));
    }

    #[test]
    fn partial_false_never_matches_missing_video_field() {
        let guess = GuessDict {
            audio_codec: Some("aac".to_string()),
            ..GuessDict::default()
        };
        let matches = guess_matches(&movie(), &guess, false);
        assert!(!matches.contains("audio_codec"));
    }

    #[test]
    fn episode_series_season_episode_match() {
        let guess = GuessDict {
            series: Some("The Big Bang Theory".to_string()),
            season: Some(7),
            episode: Some(5),
            episode_title: Some("The Workplace Proximity".to_string()),
            ..GuessDict::default()
        };
        let matches = guess_matches(&episode(), &guess, false);
        assert!(matches.contains("series"));
        assert!(matches.contains("season"));
        assert!(matches.contains("episode"));
        assert!(matches.contains("title"));
    }

    #[test]
    fn round_trip_self_consistency() {
        // guess_matches(video, feature_dict_of(video)) must include the
        // identifying attribute for the kind.
        let guess = GuessDict {
            title: Some("Man of Steel".to_string()),
            year: Some(2013),
            ..GuessDict::default()
        };
        assert!(guess_matches(&movie(), &guess, false).contains("title"));
    }
}
