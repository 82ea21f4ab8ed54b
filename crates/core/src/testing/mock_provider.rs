//! Mock provider for testing (C6), in the teacher's `testing::mock_*`
//! builder style.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;

use crate::language::Language;
use crate::provider::{video_kind_set, Capabilities, Provider, ProviderError, ProviderState};
use crate::subtitle::Subtitle;
use crate::video::{GuessDict, Video, VideoKind};

/// Controllable `Provider` double: configure which languages it answers
/// for, whether it should fail, and what subtitle(s) it returns.
pub struct MockProvider {
    name: String,
    capabilities: Capabilities,
    state: ProviderState,
    fail: Option<ProviderError>,
    fail_once: Option<ProviderError>,
    subtitles_to_return: Vec<Subtitle>,
    /// Subtitle ids whose `download_subtitle` yields content that fails
    /// `is_valid()`, to exercise the "fallback on invalid download" path.
    invalid_ids: HashSet<String>,
    next_id: HashMap<String, u32>,
}

impl MockProvider {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            capabilities: Capabilities {
                languages: HashSet::new(),
                video_kinds: video_kind_set(&[VideoKind::Movie, VideoKind::Episode]),
                required_hash: None,
            },
            state: ProviderState::New,
            fail: None,
            fail_once: None,
            subtitles_to_return: Vec::new(),
            invalid_ids: HashSet::new(),
            next_id: HashMap::new(),
        }
    }

    fn fresh_id(&mut self, language: &Language) -> String {
        let counter = self.next_id.entry(language.alpha3.clone()).or_insert(0);
        *counter += 1;
        format!("mock-{}-{}", language.alpha3, counter)
    }

    /// Register `language` as supported and queue one (valid-content)
    /// subtitle for it.
    pub fn with_subtitle(mut self, language: Language) -> Self {
        self.capabilities.languages.insert(language.clone());
        let id = self.fresh_id(&language);
        let mut subtitle = Subtitle::new(self.name.clone(), id, language);
        subtitle.set_content(b"1\n00:00:01,000 --> 00:00:02,000\nhi\n".to_vec());
        self.subtitles_to_return.push(subtitle);
        self
    }

    /// Queue a subtitle that asserts a provider-side hash match, so it
    /// scores via hash subsumption rather than guess matching.
    pub fn with_hash_matched_subtitle(mut self, language: Language) -> Self {
        self.capabilities.languages.insert(language.clone());
        let id = self.fresh_id(&language);
        let mut subtitle = Subtitle::new(self.name.clone(), id, language);
        subtitle.provider_hash_match = true;
        subtitle.set_content(b"1\n00:00:01,000 --> 00:00:02,000\nhi\n".to_vec());
        self.subtitles_to_return.push(subtitle);
        self
    }

    /// Queue a subtitle carrying a specific release-metadata guess, to
    /// exercise matcher/scorer behaviour beyond the flat "matches nothing"
    /// default of `with_subtitle`.
    pub fn with_subtitle_guess(mut self, language: Language, guess: GuessDict) -> Self {
        self.capabilities.languages.insert(language.clone());
        let id = self.fresh_id(&language);
        let mut subtitle = Subtitle::new(self.name.clone(), id, language);
        subtitle.guess = guess;
        subtitle.set_content(b"1\n00:00:01,000 --> 00:00:02,000\nhi\n".to_vec());
        self.subtitles_to_return.push(subtitle);
        self
    }

    /// Queue a subtitle whose downloaded content fails `is_valid()`.
    pub fn with_invalid_subtitle(mut self, language: Language) -> Self {
        self.with_invalid_subtitle_guess(language, GuessDict::default())
    }

    /// Same as `with_invalid_subtitle`, but with a caller-supplied guess so
    /// the candidate can be made to outscore its siblings before its
    /// download is found to be invalid.
    pub fn with_invalid_subtitle_guess(mut self, language: Language, guess: GuessDict) -> Self {
        self.capabilities.languages.insert(language.clone());
        let id = self.fresh_id(&language);
        let mut subtitle = Subtitle::new(self.name.clone(), id.clone(), language);
        subtitle.guess = guess;
        self.invalid_ids.insert(id);
        self.subtitles_to_return.push(subtitle);
        self
    }

    pub fn with_required_hash(mut self, name: impl Into<String>) -> Self {
        self.capabilities.required_hash = Some(name.into());
        self
    }

    /// Every call after `initialize()` returns an error.
    pub fn failing(mut self) -> Self {
        self.fail = Some(ProviderError::Other("mock provider configured to fail".to_string()));
        self
    }

    /// Every call after `initialize()` returns `err` specifically, instead
    /// of the generic `Other` kind `failing()` uses.
    pub fn failing_with(mut self, err: ProviderError) -> Self {
        self.fail = Some(err);
        self
    }

    /// The next `list_subtitles`/`download_subtitle` call fails with `err`;
    /// every call after that succeeds, to exercise a provider that recovers
    /// after a single retry or re-initialize.
    pub fn failing_once_with(mut self, err: ProviderError) -> Self {
        self.fail_once = Some(err);
        self
    }

    fn maybe_fail(&mut self) -> Option<ProviderError> {
        if let Some(err) = self.fail_once.take() {
            return Some(err);
        }
        self.fail.clone()
    }
}

#[async_trait]
impl Provider for MockProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }

    async fn initialize(&mut self) -> Result<(), ProviderError> {
        self.state = ProviderState::Ready;
        Ok(())
    }

    async fn terminate(&mut self) -> Result<(), ProviderError> {
        self.state = ProviderState::Closed;
        Ok(())
    }

    async fn list_subtitles(
        &mut self,
        _video: &Video,
        languages: &HashSet<Language>,
    ) -> Result<Vec<Subtitle>, ProviderError> {
        if let Some(err) = self.maybe_fail() {
            return Err(err);
        }
        Ok(self
            .subtitles_to_return
            .iter()
            .filter(|sub| languages.contains(&sub.language))
            .cloned()
            .collect())
    }

    async fn download_subtitle(&mut self, subtitle: &mut Subtitle) -> Result<(), ProviderError> {
        if let Some(err) = self.maybe_fail() {
            return Err(err);
        }
        if self.invalid_ids.contains(&subtitle.subtitle_id) {
            subtitle.set_content(b"not a subrip file".to_vec());
        } else {
            subtitle.set_content(b"1\n00:00:01,000 --> 00:00:02,000\nhi\n".to_vec());
        }
        Ok(())
    }
}
