//! Subtitle record (C3): a provider-tagged candidate with `compute_matches`.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::language::Language;
use crate::matcher::guess_matches;
use crate::video::{GuessDict, Video};

use super::format::is_valid_subrip;

#[derive(Debug, Error)]
pub enum SubtitleError {
    #[error("no content to validate")]
    NoContent,
}

/// A candidate subtitle from one provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subtitle {
    pub provider_name: String,
    pub subtitle_id: String,
    pub language: Language,
    pub hearing_impaired: bool,
    pub foreign_only: bool,
    pub page_link: Option<String>,
    pub download_link: Option<String>,
    pub encoding: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<Vec<u8>>,
    pub fps: Option<f64>,
    /// Feature guess parsed from the provider's release-name metadata,
    /// used by `compute_matches` the same way a video filename guess is.
    #[serde(default)]
    pub guess: GuessDict,
    /// Set when the provider itself asserts a hash match (its own index
    /// matched one of `video.hashes`), independent of the guess dict.
    #[serde(default)]
    pub provider_hash_match: bool,
    /// Attribute names (`imdb_id`, `tmdb_id`, `series_imdb_id`, ...) the
    /// provider itself asserts a match on, because it searched using that
    /// id as a criterion rather than guessing it from a release name.
    #[serde(default)]
    pub provider_id_matches: HashSet<String>,
}

impl Subtitle {
    pub fn new(provider_name: impl Into<String>, subtitle_id: impl Into<String>, language: Language) -> Self {
        Self {
            provider_name: provider_name.into(),
            subtitle_id: subtitle_id.into(),
            language,
            hearing_impaired: false,
            foreign_only: false,
            page_link: None,
            download_link: None,
            encoding: None,
            content: None,
            fps: None,
            guess: GuessDict::default(),
            provider_hash_match: false,
            provider_id_matches: HashSet::new(),
        }
    }

    /// Identity per §3: `(provider_name, subtitle_id)`.
    pub fn identity(&self) -> (&str, &str) {
        (&self.provider_name, &self.subtitle_id)
    }

    /// `guess_matches` against `video`, unioned with provider-asserted hash
    /// matches and boolean-preference matches.
    pub fn get_matches(
        &self,
        video: &Video,
        hearing_impaired: Option<bool>,
        foreign_only: Option<bool>,
    ) -> HashSet<String> {
        let mut matched = guess_matches(video, &self.guess, false);

        if self.provider_hash_match {
            matched.insert("hash".to_string());
        }
        matched.extend(self.provider_id_matches.iter().cloned());
        if let Some(pref) = hearing_impaired {
            if pref == self.hearing_impaired {
                matched.insert("hearing_impaired".to_string());
            }
        }
        if let Some(pref) = foreign_only {
            if pref == self.foreign_only {
                matched.insert("foreign_only".to_string());
            }
        }

        matched
    }

    /// `content` is absent until `download_subtitle` has succeeded.
    pub fn is_valid(&self) -> Result<bool, SubtitleError> {
        let content = self.content.as_ref().ok_or(SubtitleError::NoContent)?;
        Ok(is_valid_subrip(content))
    }

    pub fn set_content(&mut self, content: Vec<u8>) {
        self.content = Some(super::format::fix_line_ending(&content));
    }
}
