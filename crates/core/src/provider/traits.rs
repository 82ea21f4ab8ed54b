//! The Provider adapter interface (C6).

use std::collections::HashSet;

use async_trait::async_trait;

use crate::language::Language;
use crate::subtitle::Subtitle;
use crate::video::{Video, VideoKind};

use super::types::{Capabilities, ProviderError};

/// Session lifecycle: `NEW -[initialize]-> READY -[list/download]-> READY
/// -[terminate]-> CLOSED`. Implementors own whatever session state
/// (HTTP client, auth token) `initialize` creates.
#[async_trait]
pub trait Provider: Send + Sync {
    fn name(&self) -> &str;

    fn capabilities(&self) -> &Capabilities;

    /// `video_kind` matches and, if declared, `required_hash` is present.
    fn check(&self, video: &Video) -> bool {
        let caps = self.capabilities();
        let kind_ok = caps.video_kinds.contains(&video.kind());
        let hash_ok = caps
            .required_hash
            .as_ref()
            .map(|name| video.header().hashes.contains_key(name))
            .unwrap_or(true);
        kind_ok && hash_ok
    }

    fn check_languages(&self, languages: &HashSet<Language>) -> HashSet<Language> {
        self.capabilities().check_languages(languages)
    }

    /// Authenticate (if credentials were given) and ready the session.
    /// Anonymous providers still transition to `READY`.
    async fn initialize(&mut self) -> Result<(), ProviderError>;

    /// Idempotent: calling on an already-closed provider is a no-op.
    async fn terminate(&mut self) -> Result<(), ProviderError>;

    async fn list_subtitles(
        &mut self,
        video: &Video,
        languages: &HashSet<Language>,
    ) -> Result<Vec<Subtitle>, ProviderError>;

    /// Mutates `subtitle.content` on success.
    async fn download_subtitle(&mut self, subtitle: &mut Subtitle) -> Result<(), ProviderError>;
}

pub fn video_kind_set(kinds: &[VideoKind]) -> HashSet<VideoKind> {
    kinds.iter().copied().collect()
}
