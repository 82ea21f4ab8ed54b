//! Scorer (C5): reduces a match-set to an integer under a per-kind weight
//! table, with hash/ID subsumption rules.

use std::collections::HashSet;

use crate::video::VideoKind;

fn movie_weight(attr: &str) -> i64 {
    match attr {
        "hash" => 46,
        "title" => 13,
        "year" => 7,
        "country" => 1,
        "imdb_id" => 31,
        "tmdb_id" => 20,
        "resolution" => 2,
        "source" => 2,
        "video_codec" => 2,
        "audio_codec" => 1,
        "release_group" => 6,
        "edition" => 2,
        "hearing_impaired" => 1,
        _ => 0,
    }
}

fn episode_weight(attr: &str) -> i64 {
    match attr {
        "hash" => 46,
        "series" => 23,
        "year" => 2,
        "country" => 1,
        "season" => 6,
        "episode" => 6,
        "title" => 12,
        "release_group" => 6,
        "source" => 2,
        "resolution" => 2,
        "video_codec" => 2,
        "audio_codec" => 1,
        "streaming_service" => 1,
        "imdb_id" => 35,
        "series_imdb_id" => 30,
        "tvdb_id" => 23,
        "series_tvdb_id" => 20,
        "tmdb_id" => 18,
        "series_tmdb_id" => 15,
        "hearing_impaired" => 1,
        _ => 0,
    }
}

fn weight(kind: VideoKind, attr: &str) -> i64 {
    match kind {
        VideoKind::Movie => movie_weight(attr),
        VideoKind::Episode => episode_weight(attr),
    }
}

const MOVIE_ATTRS: &[&str] = &[
    "hash", "title", "year", "country", "imdb_id", "tmdb_id", "resolution", "source",
    "video_codec", "audio_codec", "release_group", "edition", "hearing_impaired",
];

const EPISODE_ATTRS: &[&str] = &[
    "hash", "series", "year", "country", "season", "episode", "title", "release_group",
    "source", "resolution", "video_codec", "audio_codec", "streaming_service", "imdb_id",
    "series_imdb_id", "tvdb_id", "series_tvdb_id", "tmdb_id", "series_tmdb_id",
    "hearing_impaired",
];

/// The maximum achievable score for a video kind (sum of all its weights).
pub fn max_score(kind: VideoKind) -> i64 {
    match kind {
        VideoKind::Movie => MOVIE_ATTRS.iter().map(|a| weight(kind, a)).sum(),
        VideoKind::Episode => EPISODE_ATTRS.iter().map(|a| weight(kind, a)).sum(),
    }
}

/// Interpret a caller's 0-100 `min_score` as a percentage of the kind's
/// `hash` weight.
pub fn min_score_scaled(min_score: u8, kind: VideoKind) -> i64 {
    (min_score as i64 * weight(kind, "hash")) / 100
}

fn apply_subsumption(match_set: &HashSet<String>, kind: VideoKind) -> HashSet<String> {
    let mut set = match_set.clone();

    if set.contains("hash") {
        set.retain(|a| a == "hash" || a == "hearing_impaired" || a == "foreign_only");
        return set;
    }

    let has = |attr: &str| match_set.contains(attr);

    match kind {
        VideoKind::Movie => {
            if has("imdb_id") || has("tmdb_id") {
                for attr in ["title", "year", "country"] {
                    set.remove(attr);
                }
            }
        }
        VideoKind::Episode => {
            for (series_id, item_id) in [
                ("series_imdb_id", "imdb_id"),
                ("series_tvdb_id", "tvdb_id"),
                ("series_tmdb_id", "tmdb_id"),
            ] {
                if has(series_id) {
                    for attr in ["series", "year", "country"] {
                        set.remove(attr);
                    }
                }
                if has(item_id) {
                    for attr in ["series", "year", "country", "season", "episode", "title"] {
                        set.remove(attr);
                    }
                }
            }
        }
    }

    set
}

/// Reduce a match-set to an integer score for `kind`, per §4.3's
/// subsumption rules.
pub fn compute_score(match_set: &HashSet<String>, kind: VideoKind) -> i64 {
    let reduced = apply_subsumption(match_set, kind);
    let score: i64 = reduced.iter().map(|attr| weight(kind, attr)).sum();
    debug_assert!(score <= max_score(kind), "score exceeds max_score for {kind:?}");
    score
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(attrs: &[&str]) -> HashSet<String> {
        attrs.iter().map(|a| a.to_string()).collect()
    }

    #[test]
    fn hash_match_subsumes_positional_attrs() {
        let matches = set(&["hash", "title", "year", "resolution"]);
        assert_eq!(compute_score(&matches, VideoKind::Movie), 46);
    }

    #[test]
    fn hash_match_keeps_hearing_impaired_and_foreign_only() {
        let matches = set(&["hash", "hearing_impaired", "foreign_only"]);
        assert_eq!(compute_score(&matches, VideoKind::Movie), 47);
    }

    #[test]
    fn movie_imdb_id_subsumes_title_year_country() {
        let matches = set(&["imdb_id", "title", "year", "country", "resolution"]);
        assert_eq!(compute_score(&matches, VideoKind::Movie), 31 + 2);
    }

    #[test]
    fn episode_series_imdb_id_subsumes_series_year_country() {
        let matches = set(&["series_imdb_id", "series", "year", "country"]);
        assert_eq!(compute_score(&matches, VideoKind::Episode), 30);
    }

    #[test]
    fn episode_imdb_id_subsumes_more_than_series_imdb_id() {
        let matches = set(&["imdb_id", "series", "year", "country", "season", "episode", "title"]);
        assert_eq!(compute_score(&matches, VideoKind::Episode), 35);
    }

    #[test]
    fn unknown_attributes_score_zero() {
        let matches = set(&["not_a_real_attribute"]);
        assert_eq!(compute_score(&matches, VideoKind::Movie), 0);
    }

    #[test]
    fn score_never_exceeds_max_for_kind() {
        let everything_movie: HashSet<String> = MOVIE_ATTRS.iter().map(|a| a.to_string()).collect();
        assert_eq!(compute_score(&everything_movie, VideoKind::Movie), max_score(VideoKind::Movie));

        let everything_episode: HashSet<String> =
            EPISODE_ATTRS.iter().map(|a| a.to_string()).collect();
        assert!(compute_score(&everything_episode, VideoKind::Episode) <= max_score(VideoKind::Episode));
    }

    #[test]
    fn min_score_scaled_matches_spec_example() {
        // min_score=50, episode hash weight=46 -> threshold 23.
        assert_eq!(min_score_scaled(50, VideoKind::Episode), 23);
    }

    #[test]
    fn min_score_100_is_full_hash_weight() {
        assert_eq!(min_score_scaled(100, VideoKind::Movie), 46);
        assert_eq!(min_score_scaled(100, VideoKind::Episode), 46);
    }
}
