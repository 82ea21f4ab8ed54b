//! Scoring and greedy selection for `download_best_subtitles` (§4.5 step
//! 1-3). Pure and synchronous; the pool wraps this with the actual
//! download calls.

use crate::scorer::compute_score;
use crate::subtitle::Subtitle;
use crate::video::Video;

pub struct ScoredCandidate {
    pub subtitle: Subtitle,
    pub score: i64,
    pub hearing_impaired_match: bool,
    pub foreign_only_match: bool,
    pub provider_order: usize,
}

/// `provider_order` is the provider's position in the pool's declaration
/// order; the caller resolves it once per subtitle before scoring.
pub fn score_candidates(
    candidates: Vec<Subtitle>,
    video: &Video,
    hearing_impaired: Option<bool>,
    foreign_only: Option<bool>,
    provider_order: impl Fn(&str) -> usize,
) -> Vec<ScoredCandidate> {
    let kind = video.kind();
    candidates
        .into_iter()
        .map(|subtitle| {
            let matches = subtitle.get_matches(video, hearing_impaired, foreign_only);
            let score = compute_score(&matches, kind);
            let hearing_impaired_match = matches.contains("hearing_impaired");
            let foreign_only_match = matches.contains("foreign_only");
            let order = provider_order(&subtitle.provider_name);
            ScoredCandidate {
                subtitle,
                score,
                hearing_impaired_match,
                foreign_only_match,
                provider_order: order,
            }
        })
        .collect()
}

/// Descending by `(score, hearing_impaired_match, foreign_only_match)`;
/// ties broken by ascending declaration order (the earliest-declared
/// provider wins), which is what "provider_declaration_order breaks ties
/// deterministically" cashes out to once declaration order is read as a
/// priority rather than a literal sort key.
pub fn sort_candidates(mut candidates: Vec<ScoredCandidate>) -> Vec<ScoredCandidate> {
    candidates.sort_by(|a, b| {
        b.score
            .cmp(&a.score)
            .then(b.hearing_impaired_match.cmp(&a.hearing_impaired_match))
            .then(b.foreign_only_match.cmp(&a.foreign_only_match))
            .then(a.provider_order.cmp(&b.provider_order))
    });
    candidates
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::language::Language;
    use crate::video::{Movie, VideoHeader};

    fn movie() -> Video {
        Video::Movie(Movie {
            header: VideoHeader::new("Man of Steel 2013.mkv"),
            title: "Man of Steel".to_string(),
            year: Some(2013),
            alternative_titles: vec![],
        })
    }

    fn subtitle(provider: &str, id: &str, lang: &str) -> Subtitle {
        Subtitle::new(provider, id, Language::new(lang))
    }

    #[test]
    fn higher_score_sorts_first() {
        let mut low = subtitle("a", "1", "eng");
        low.guess.title = Some("Wrong Title".to_string());
        let mut high = subtitle("a", "2", "eng");
        high.provider_hash_match = true;

        let scored = score_candidates(vec![low, high], &movie(), None, None, |_| 0);
        let sorted = sort_candidates(scored);
        assert_eq!(sorted[0].subtitle.subtitle_id, "2");
    }

    #[test]
    fn tie_break_prefers_earlier_declared_provider() {
        let a = subtitle("late", "1", "eng");
        let b = subtitle("early", "2", "eng");
        let scored = score_candidates(vec![a, b], &movie(), None, None, |name| match name {
            "early" => 0,
            "late" => 1,
            _ => 99,
        });
        let sorted = sort_candidates(scored);
        assert_eq!(sorted[0].subtitle.provider_name, "early");
    }

    #[test]
    fn hash_match_outranks_everything_else() {
        let mut guessed = subtitle("a", "1", "eng");
        guessed.guess.title = Some("Man of Steel".to_string());
        guessed.guess.year = Some(2013);
        let mut hashed = subtitle("a", "2", "eng");
        hashed.provider_hash_match = true;

        let scored = score_candidates(vec![guessed, hashed], &movie(), None, None, |_| 0);
        let sorted = sort_candidates(scored);
        assert_eq!(sorted[0].subtitle.subtitle_id, "2");
    }

    /// The sorted order is a function of (score, hearing_impaired_match,
    /// foreign_only_match, provider_order) alone, never of input position:
    /// every permutation of the same candidates must sort identically.
    #[test]
    fn sort_order_is_independent_of_input_permutation() {
        let order = |name: &str| match name {
            "first" => 0,
            "second" => 1,
            "third" => 2,
            _ => 99,
        };

        let mut hashed = subtitle("first", "1", "eng");
        hashed.provider_hash_match = true;
        let mut title_only = subtitle("second", "2", "eng");
        title_only.guess.title = Some("Man of Steel".to_string());
        let bare = subtitle("third", "3", "eng");

        let candidates = vec![hashed, title_only, bare];
        let expected: Vec<String> = {
            let scored = score_candidates(candidates.clone(), &movie(), None, None, order);
            sort_candidates(scored).into_iter().map(|c| c.subtitle.subtitle_id).collect()
        };

        let permutations = [
            vec![0, 1, 2],
            vec![2, 1, 0],
            vec![1, 2, 0],
            vec![2, 0, 1],
        ];
        for indices in permutations {
            let shuffled: Vec<Subtitle> = indices.iter().map(|&i| candidates[i].clone()).collect();
            let scored = score_candidates(shuffled, &movie(), None, None, order);
            let actual: Vec<String> = sort_candidates(scored).into_iter().map(|c| c.subtitle.subtitle_id).collect();
            assert_eq!(actual, expected);
        }
    }
}
