//! Deduplication of subtitle candidates gathered across providers (§6).
//!
//! Grounded on `searcher::dedup::deduplicate_results`'s shape (merge-by-key
//! over a `HashMap`, fall back to a synthetic key when no strong identity
//! is available) but keyed on content rather than an info_hash.

use std::collections::HashMap;

use sha2::{Digest, Sha256};

use crate::subtitle::Subtitle;

fn content_hash(content: &[u8]) -> String {
    let digest = Sha256::digest(content);
    format!("{digest:x}")
}

/// `(provider_name, subtitle_id)`, the fallback identity per §3.
fn fallback_key(subtitle: &Subtitle) -> String {
    format!("{}:{}", subtitle.provider_name, subtitle.subtitle_id)
}

/// Dedupe by content hash when `content` has already been fetched (as
/// napiprojekt eagerly does), else fall back to `(provider_name,
/// subtitle_id)`. First occurrence of a key wins.
pub fn dedupe_subtitles(subtitles: Vec<Subtitle>) -> Vec<Subtitle> {
    let mut seen: HashMap<String, ()> = HashMap::new();
    let mut out = Vec::with_capacity(subtitles.len());

    for subtitle in subtitles {
        let key = match &subtitle.content {
            Some(content) => content_hash(content),
            None => fallback_key(&subtitle),
        };

        if seen.insert(key, ()).is_none() {
            out.push(subtitle);
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::language::Language;

    fn subtitle(provider: &str, id: &str, content: Option<&[u8]>) -> Subtitle {
        let mut sub = Subtitle::new(provider, id, Language::new("eng"));
        if let Some(content) = content {
            sub.set_content(content.to_vec());
        }
        sub
    }

    #[test]
    fn distinct_subtitle_ids_are_kept_when_no_content() {
        let subs = vec![subtitle("opensubtitles", "1", None), subtitle("opensubtitles", "2", None)];
        assert_eq!(dedupe_subtitles(subs).len(), 2);
    }

    #[test]
    fn same_provider_and_id_is_deduped() {
        let subs = vec![subtitle("opensubtitles", "1", None), subtitle("opensubtitles", "1", None)];
        assert_eq!(dedupe_subtitles(subs).len(), 1);
    }

    #[test]
    fn same_content_across_providers_is_deduped() {
        let subs = vec![
            subtitle("opensubtitles", "1", Some(b"1\n00:00:01,000 --> 00:00:02,000\nhi\n")),
            subtitle("napiprojekt", "abc", Some(b"1\n00:00:01,000 --> 00:00:02,000\nhi\n")),
        ];
        assert_eq!(dedupe_subtitles(subs).len(), 1);
    }

    #[test]
    fn different_content_is_kept_separate() {
        let subs = vec![
            subtitle("opensubtitles", "1", Some(b"1\n00:00:01,000 --> 00:00:02,000\nhi\n")),
            subtitle("opensubtitles", "2", Some(b"1\n00:00:01,000 --> 00:00:02,000\nbye\n")),
        ];
        assert_eq!(dedupe_subtitles(subs).len(), 2);
    }
}
